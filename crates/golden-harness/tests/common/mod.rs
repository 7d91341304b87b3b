// crates/golden-harness/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures, step functions, and case builders.
// Purpose: Provide a small counter service for harness integration tests.
// Dependencies: golden-harness, async-trait, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! The counter fixture accumulates `add` operations across the steps of a
//! case. Step inputs are JSON operations; results are running totals. A
//! [`Lifecycle`] counter records setup and teardown calls.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use golden_harness::CaseInfo;
use golden_harness::FixtureError;
use golden_harness::HarnessConfig;
use golden_harness::HarnessConfigBuilder;
use golden_harness::StepContext;
use golden_harness::StepError;
use golden_harness::StepFile;
use golden_harness::StepFunction;
use golden_harness::set_up_fn;
use golden_harness::tear_down_fn;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Counter Service
// ============================================================================

/// Fixture accumulating step values.
#[derive(Debug, Default)]
pub struct Counter {
    /// Running total.
    pub total: i64,
}

/// Step operation decoded from an input file.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Adds `value` to the total.
    Add {
        /// Amount to add.
        value: i64,
    },
    /// Fails with `message`.
    Fail {
        /// Error text.
        message: String,
    },
    /// Panics inside the step function.
    Panic,
    /// Sleeps before returning the total.
    Sleep {
        /// Sleep duration in milliseconds.
        ms: u64,
    },
    /// Waits until the step is cancelled.
    WaitCancel,
}

/// Step result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Total {
    /// Running total after the step.
    pub total: i64,
}

/// Step function driving the counter.
pub struct CounterStep;

#[async_trait]
impl StepFunction<Counter, Total> for CounterStep {
    async fn call(
        &self,
        ctx: &StepContext,
        fixture: &mut Counter,
        step: &StepFile,
    ) -> Result<Total, StepError> {
        let op: Op = serde_json::from_slice(&step.data).map_err(StepError::new)?;
        match op {
            Op::Add {
                value,
            } => {
                fixture.total += value;
            }
            Op::Fail {
                message,
            } => return Err(StepError::new(message)),
            Op::Panic => panic!("step exploded"),
            Op::Sleep {
                ms,
            } => tokio::time::sleep(Duration::from_millis(ms)).await,
            Op::WaitCancel => {
                ctx.cancelled().await;
                return Err(StepError::Cancelled);
            }
        }
        Ok(Total {
            total: fixture.total,
        })
    }
}

// ============================================================================
// SECTION: Lifecycle Tracking
// ============================================================================

/// Counts fixture callbacks.
#[derive(Debug, Default)]
pub struct Lifecycle {
    /// Setup calls.
    pub set_ups: AtomicUsize,
    /// Teardown calls.
    pub tear_downs: AtomicUsize,
}

impl Lifecycle {
    /// Returns the number of setup calls.
    pub fn set_ups(&self) -> usize {
        self.set_ups.load(Ordering::SeqCst)
    }

    /// Returns the number of teardown calls.
    pub fn tear_downs(&self) -> usize {
        self.tear_downs.load(Ordering::SeqCst)
    }
}

/// Options for [`tracked_builder`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Tracking {
    /// Case name whose setup fails.
    pub fail_set_up_for: Option<&'static str>,
    /// Whether teardown reports an error.
    pub fail_tear_down: bool,
}

/// Builds a counter harness config with tracked setup and teardown.
pub fn tracked_builder(
    lifecycle: &Arc<Lifecycle>,
    tracking: Tracking,
) -> HarnessConfigBuilder<Counter, Total> {
    let on_set_up = Arc::clone(lifecycle);
    let on_tear_down = Arc::clone(lifecycle);
    let set_up = set_up_fn(move |case: CaseInfo| {
        let lifecycle = Arc::clone(&on_set_up);
        async move {
            lifecycle.set_ups.fetch_add(1, Ordering::SeqCst);
            if tracking.fail_set_up_for == Some(case.name.as_str()) {
                return Err(FixtureError::new("backend unavailable"));
            }
            Ok(Counter::default())
        }
    });
    let tear_down = tear_down_fn(move |_case: CaseInfo, _fixture: Counter| {
        let lifecycle = Arc::clone(&on_tear_down);
        async move {
            lifecycle.tear_downs.fetch_add(1, Ordering::SeqCst);
            if tracking.fail_tear_down {
                return Err(FixtureError::new("cleanup failed"));
            }
            Ok(())
        }
    });
    HarnessConfig::builder_with_set_up(set_up, CounterStep)
        .tear_down(tear_down)
        .input_ext("json")
        .success_ext("json")
}

// ============================================================================
// SECTION: Case Builders
// ============================================================================

/// Writes a case directory with the given files and returns its path.
pub fn write_case(root: &Path, name: &str, files: &[(&str, String)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create case dir");
    for (file, contents) in files {
        fs::write(dir.join(file), contents).expect("write case file");
    }
    dir
}

/// Returns an `add` step input.
pub fn add(value: i64) -> String {
    format!(r#"{{"op": "add", "value": {value}}}"#)
}

/// Returns a `fail` step input.
pub fn fail(message: &str) -> String {
    format!(r#"{{"op": "fail", "message": "{message}"}}"#)
}

/// Returns the structured golden for a total.
pub fn total_golden(total: i64) -> String {
    format!("{{\n  \"total\": {total}\n}}\n")
}
