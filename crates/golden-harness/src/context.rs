// crates/golden-harness/src/context.rs
// ============================================================================
// Module: Step Context
// Description: Per-step execution context handed to step functions.
// Purpose: Carry case identity and cancellation into each step call.
// Dependencies: tokio, tokio-util
// ============================================================================

//! ## Overview
//! Each step runs with its own [`StepContext`]. The context owns a child of
//! the harness cancellation token, so cancelling the harness or hitting the
//! step deadline cancels exactly the step in flight.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Execution context for one step call.
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Name of the case being executed.
    case_name: String,
    /// Ordinal of the step being executed.
    ordinal: u32,
    /// Child cancellation token for this step.
    token: CancellationToken,
    /// Deadline derived from the configured step timeout.
    deadline: Option<Instant>,
}

impl StepContext {
    /// Creates a context. Step functions under unit test can build one
    /// directly.
    #[must_use]
    pub fn new(
        case_name: impl Into<String>,
        ordinal: u32,
        token: CancellationToken,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            ordinal,
            token,
            deadline,
        }
    }

    /// Returns the case name.
    #[must_use]
    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// Returns the step ordinal.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Returns the step cancellation token.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns true once the step has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the step is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Returns the step deadline, if a timeout is configured.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
