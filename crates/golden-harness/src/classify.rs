// crates/golden-harness/src/classify.rs
// ============================================================================
// Module: Outcome Classification
// Description: Success/failure expectation and comparison routing.
// Purpose: Decide which golden an execution outcome is checked against.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A case is failure-expected only when error handling is configured and its
//! directory name carries the failure prefix. [`route`] turns an
//! [`ExecutionOutcome`] into the comparison the runner must perform, or into
//! a failure when the outcome contradicts the expectation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::StepError;
use crate::executor::ExecutionOutcome;
use crate::executor::StepFailure;
use crate::report::CaseFailure;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Expected outcome of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Every step must produce a result.
    Success,
    /// The sequence must end in an error.
    Failure,
}

impl Expectation {
    /// Classifies a case by name. `failure_prefix` is `None` when error
    /// handling is not configured.
    #[must_use]
    pub fn classify(case_name: &str, failure_prefix: Option<&str>) -> Self {
        match failure_prefix {
            Some(prefix) if case_name.starts_with(prefix) => Self::Failure,
            _ => Self::Success,
        }
    }
}

/// Comparison the runner performs for a case.
#[derive(Debug)]
pub enum Route<T> {
    /// Compare every result against its own success golden.
    CompareResults(Vec<(u32, T)>),
    /// Compare the formatted terminal error against the error golden named
    /// for `ordinal`.
    CompareError {
        /// Ordinal of the step that raised the error.
        ordinal: u32,
        /// Terminal error.
        error: StepError,
    },
    /// The outcome contradicts the expectation; nothing is compared.
    Fail(CaseFailure),
}

// ============================================================================
// SECTION: Routing
// ============================================================================

/// Routes an execution outcome according to the case expectation.
#[must_use]
pub fn route<T>(
    expectation: Expectation,
    outcome: ExecutionOutcome<T>,
    error_handling_enabled: bool,
) -> Route<T> {
    match (expectation, outcome.failure) {
        (Expectation::Failure, Some(StepFailure {
            ordinal,
            error,
        })) => Route::CompareError {
            ordinal,
            error,
        },
        (Expectation::Failure, None) => Route::Fail(CaseFailure::ExpectedError {
            last_ordinal: outcome.results.last().map_or(0, |(ordinal, _)| *ordinal),
        }),
        (Expectation::Success, Some(StepFailure {
            ordinal,
            error,
        })) => Route::Fail(CaseFailure::UnexpectedError {
            ordinal,
            error: error.to_string(),
            error_handling_enabled,
        }),
        (Expectation::Success, None) => Route::CompareResults(outcome.results),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
