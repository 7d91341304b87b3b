// crates/golden-harness/src/report.rs
// ============================================================================
// Module: Run Reports
// Description: Per-case and per-run outcome records.
// Purpose: Collect failures with their case, step, and golden path context.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`CaseReport`] records the phases a case went through, every failure it
//! produced, the goldens rewritten in update mode, and any teardown error.
//! A [`RunReport`] aggregates cases and converts into a single
//! [`HarnessFailure`] for test assertions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::path::PathBuf;

use thiserror::Error;

use crate::classify::Expectation;
use crate::config::RunMode;
use crate::error::CodecError;
use crate::error::FixtureError;
use crate::error::SequenceError;

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Lifecycle phase reached by a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePhase {
    /// Directory found under the root.
    Discovered,
    /// Step files passed sequence validation.
    Validated,
    /// Fixture produced.
    FixtureReady,
    /// Step with this ordinal started.
    Executing(u32),
    /// Every step produced a result.
    Succeeded,
    /// The step with this ordinal raised the terminal error.
    Failed(u32),
    /// Teardown attempted.
    TornDown,
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// One reason a case failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseFailure {
    /// Step directory validation failed; no step ran.
    #[error("invalid step directory: {0}")]
    Sequence(SequenceError),
    /// Fixture setup failed; no step ran and teardown was skipped.
    #[error("fixture setup failed: {0}")]
    SetUp(FixtureError),
    /// A failure-marked case completed every step.
    #[error("expected error, got none (last step {last_ordinal})")]
    ExpectedError {
        /// Last step executed.
        last_ordinal: u32,
    },
    /// A success-marked case stopped on a step error.
    #[error("{}", unexpected_error_message(.ordinal, .error, .error_handling_enabled))]
    UnexpectedError {
        /// Ordinal of the failing step.
        ordinal: u32,
        /// Step error text.
        error: String,
        /// Whether error goldens are configured for this harness.
        error_handling_enabled: bool,
    },
    /// The actual output differs from the golden.
    #[error("step {ordinal}: {diff}")]
    Mismatch {
        /// Step ordinal.
        ordinal: u32,
        /// Golden path.
        path: PathBuf,
        /// Rendered difference.
        diff: String,
    },
    /// The golden does not exist in verify mode.
    #[error(
        "step {ordinal}: golden file {} does not exist; rerun with GOLDEN_UPDATE=1 to create it",
        .path.display()
    )]
    MissingGolden {
        /// Step ordinal.
        ordinal: u32,
        /// Golden path.
        path: PathBuf,
    },
    /// Formatting, loading, or projecting a value failed.
    #[error("step {ordinal}: golden file {}: {error}", .path.display())]
    Codec {
        /// Step ordinal.
        ordinal: u32,
        /// Golden path.
        path: PathBuf,
        /// Codec error.
        error: CodecError,
    },
    /// Reading or writing a golden failed.
    #[error("step {ordinal}: golden file {}: {message}", .path.display())]
    GoldenIo {
        /// Step ordinal.
        ordinal: u32,
        /// Golden path.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
}

/// Renders the unexpected-error message for both error handling modes.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "Called with thiserror field bindings.")]
fn unexpected_error_message(ordinal: &u32, error: &str, error_handling_enabled: &bool) -> String {
    if *error_handling_enabled {
        format!("step {ordinal}: unexpected error in a case not marked as failing: {error}")
    } else {
        format!("step {ordinal}: error handling is disabled, so any step error is fatal: {error}")
    }
}

impl CaseFailure {
    /// Returns the step ordinal the failure concerns, if any.
    #[must_use]
    pub const fn ordinal(&self) -> Option<u32> {
        match self {
            Self::Sequence(_) | Self::SetUp(_) => None,
            Self::ExpectedError {
                last_ordinal,
            } => Some(*last_ordinal),
            Self::UnexpectedError {
                ordinal, ..
            }
            | Self::Mismatch {
                ordinal, ..
            }
            | Self::MissingGolden {
                ordinal, ..
            }
            | Self::Codec {
                ordinal, ..
            }
            | Self::GoldenIo {
                ordinal, ..
            } => Some(*ordinal),
        }
    }
}

// ============================================================================
// SECTION: Case Reports
// ============================================================================

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    /// Case directory name.
    pub name: String,
    /// Expectation, once the case was classified.
    pub expectation: Option<Expectation>,
    /// Phases reached, in order.
    pub phases: Vec<CasePhase>,
    /// Failures; empty when the case passed.
    pub failures: Vec<CaseFailure>,
    /// Goldens written in update mode.
    pub rewritten: Vec<PathBuf>,
    /// Teardown error; reported but never fails the case.
    pub teardown_error: Option<FixtureError>,
}

impl CaseReport {
    /// Creates a report for a freshly discovered case.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectation: None,
            phases: vec![CasePhase::Discovered],
            failures: Vec::new(),
            rewritten: Vec::new(),
            teardown_error: None,
        }
    }

    /// Returns true when the case produced no failure.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the last phase reached.
    #[must_use]
    pub fn final_phase(&self) -> CasePhase {
        self.phases.last().copied().unwrap_or(CasePhase::Discovered)
    }
}

// ============================================================================
// SECTION: Run Reports
// ============================================================================

/// Outcome of a whole harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Run mode used.
    pub mode: RunMode,
    /// Case reports in execution order.
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    /// Returns true when every case passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    /// Looks up a case report by name.
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|case| case.name == name)
    }

    /// Returns every golden rewritten during the run.
    #[must_use]
    pub fn rewritten(&self) -> Vec<PathBuf> {
        self.cases.iter().flat_map(|case| case.rewritten.iter().cloned()).collect()
    }

    /// Returns every teardown error with the name of its case.
    #[must_use]
    pub fn teardown_errors(&self) -> Vec<(&str, &FixtureError)> {
        self.cases
            .iter()
            .filter_map(|case| case.teardown_error.as_ref().map(|err| (case.name.as_str(), err)))
            .collect()
    }

    /// Converts the report into an error when any case failed.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessFailure`] listing every failing case.
    pub fn into_result(self) -> Result<Self, HarnessFailure> {
        if self.passed() {
            return Ok(self);
        }
        Err(HarnessFailure::from_cases(&self.cases))
    }
}

/// Aggregated failure of a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{summary}")]
pub struct HarnessFailure {
    /// Rendered failure listing.
    summary: String,
    /// Names of the failing cases.
    failed_cases: Vec<String>,
}

impl HarnessFailure {
    /// Builds the failure listing from case reports.
    fn from_cases(cases: &[CaseReport]) -> Self {
        let failing: Vec<&CaseReport> = cases.iter().filter(|case| !case.passed()).collect();
        let mut summary = format!("{} of {} golden cases failed", failing.len(), cases.len());
        for case in &failing {
            for failure in &case.failures {
                let _ = write!(summary, "\ncase {}: {failure}", case.name);
            }
        }
        for case in cases {
            if let Some(err) = &case.teardown_error {
                let _ = write!(
                    summary,
                    "\ncase {}: teardown failed (not a case failure): {err}",
                    case.name
                );
            }
        }
        Self {
            summary,
            failed_cases: failing.iter().map(|case| case.name.clone()).collect(),
        }
    }

    /// Returns the names of the failing cases.
    #[must_use]
    pub fn failed_cases(&self) -> &[String] {
        &self.failed_cases
    }
}
