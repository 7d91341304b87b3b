// crates/golden-harness/tests/cancellation.rs
// ============================================================================
// Module: Step Cancellation Tests
// Description: Timeouts, root cancellation, and panicking steps.
// Purpose: Ensure abnormal step endings become step errors and never skip
//          fixture teardown.
// Dependencies: golden-harness, tempfile, tokio
// ============================================================================

//! ## Overview
//! Each abnormal ending is observed through the case report: the failing
//! ordinal, the error text, and the teardown count.

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

mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use golden_harness::CaseFailure;
use golden_harness::CasePhase;
use golden_harness::Harness;

use crate::common::Lifecycle;
use crate::common::Tracking;
use crate::common::add;
use crate::common::total_golden;
use crate::common::tracked_builder;
use crate::common::write_case;

/// Returns the single unexpected-error failure of a case.
fn unexpected_error(failures: &[CaseFailure]) -> (u32, &str) {
    match failures {
        [CaseFailure::UnexpectedError {
            ordinal,
            error,
            ..
        }] => (*ordinal, error.as_str()),
        other => panic!("expected a single unexpected error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_step_times_out_and_fixture_is_torn_down() -> Result<(), Box<dyn Error>> {
    let root = tempfile::tempdir()?;
    write_case(root.path(), "slow", &[
        ("1.in.json", add(1)),
        ("2.in.json", r#"{"op": "sleep", "ms": 5000}"#.to_string()),
        ("1.out.json", total_golden(1)),
    ]);
    let lifecycle = Arc::new(Lifecycle::default());
    let harness = Harness::new(
        tracked_builder(&lifecycle, Tracking::default())
            .step_timeout(Duration::from_millis(50))
            .build(),
    )?;

    let report = harness.run(root.path()).await?;
    let case = report.case("slow").expect("case report");
    assert_eq!(unexpected_error(&case.failures), (2, "step timed out after 50 ms"));
    assert!(case.phases.contains(&CasePhase::Failed(2)));
    assert_eq!(case.teardown_error, None);
    assert_eq!(lifecycle.tear_downs(), 1);
    Ok(())
}

#[tokio::test]
async fn root_cancellation_stops_in_flight_and_later_cases() -> Result<(), Box<dyn Error>> {
    let root = tempfile::tempdir()?;
    write_case(root.path(), "a_waiting", &[("1.in.json", r#"{"op": "wait_cancel"}"#.to_string())]);
    write_case(root.path(), "b_after", &[
        ("1.in.json", add(1)),
        ("1.out.json", total_golden(1)),
    ]);
    let lifecycle = Arc::new(Lifecycle::default());
    let harness = Harness::new(tracked_builder(&lifecycle, Tracking::default()).build())?;

    let token = harness.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let report = harness.run(root.path()).await?;
    let waiting = report.case("a_waiting").expect("waiting report");
    assert_eq!(unexpected_error(&waiting.failures), (1, "step cancelled"));
    let after = report.case("b_after").expect("after report");
    assert_eq!(unexpected_error(&after.failures), (1, "step cancelled"));
    assert_eq!(lifecycle.set_ups(), 2);
    assert_eq!(lifecycle.tear_downs(), 2);
    Ok(())
}

#[tokio::test]
async fn panicking_step_becomes_step_error() -> Result<(), Box<dyn Error>> {
    let root = tempfile::tempdir()?;
    write_case(root.path(), "explodes", &[
        ("1.in.json", add(3)),
        ("2.in.json", r#"{"op": "panic"}"#.to_string()),
    ]);
    let lifecycle = Arc::new(Lifecycle::default());
    let harness = Harness::new(tracked_builder(&lifecycle, Tracking::default()).build())?;

    let report = harness.run(root.path()).await?;
    let case = report.case("explodes").expect("case report");
    assert_eq!(unexpected_error(&case.failures), (2, "step panicked: step exploded"));
    assert_eq!(case.final_phase(), CasePhase::TornDown);
    assert_eq!(lifecycle.tear_downs(), 1);
    Ok(())
}
