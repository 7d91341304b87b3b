// crates/golden-harness/src/executor.rs
// ============================================================================
// Module: Step Executor
// Description: Sequential step execution with cancellation and panic capture.
// Purpose: Feed each step file to the step function until the first error.
// Dependencies: async-trait, tokio, tokio-util
// ============================================================================

//! ## Overview
//! Steps run strictly in ordinal order. Each call runs on its own task so a
//! panic is caught at the task boundary and reported as that step's error.
//! The fixture sits behind an async mutex for the duration of the sequence
//! and is handed back for teardown once the last task has finished.
//!
//! The executor performs no comparison; it returns the ordered results and
//! the terminal failure, if any.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::context::StepContext;
use crate::error::StepError;
use crate::events::HarnessEvent;
use crate::events::HarnessEventSink;
use crate::layout::StepFile;

// ============================================================================
// SECTION: Step Function
// ============================================================================

/// Caller-supplied function applied to every step of a case.
///
/// `F` is the fixture type and `T` the result type; both are fixed when the
/// harness is configured.
#[async_trait]
pub trait StepFunction<F, T>: Send + Sync {
    /// Executes one step against the fixture.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] to terminate the sequence at this step.
    async fn call(
        &self,
        ctx: &StepContext,
        fixture: &mut F,
        step: &StepFile,
    ) -> Result<T, StepError>;
}

/// Adapter for synchronous step closures.
pub struct SyncStep<C> {
    /// Wrapped closure.
    callback: C,
}

impl<C> SyncStep<C> {
    /// Wraps a synchronous closure.
    pub const fn new(callback: C) -> Self {
        Self {
            callback,
        }
    }
}

#[async_trait]
impl<F, T, C> StepFunction<F, T> for SyncStep<C>
where
    F: Send,
    T: Send,
    C: Fn(&StepContext, &mut F, &StepFile) -> Result<T, StepError> + Send + Sync,
{
    async fn call(
        &self,
        ctx: &StepContext,
        fixture: &mut F,
        step: &StepFile,
    ) -> Result<T, StepError> {
        (self.callback)(ctx, fixture, step)
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Terminal error of a sequence with the ordinal that raised it.
#[derive(Debug)]
pub struct StepFailure {
    /// Ordinal of the failing step.
    pub ordinal: u32,
    /// Error raised by the step.
    pub error: StepError,
}

/// Result of executing a case's steps.
///
/// # Invariants
/// - `results` holds consecutive ordinals starting at 1.
/// - When `failure` is set its ordinal follows the last result.
#[derive(Debug)]
pub struct ExecutionOutcome<T> {
    /// Successful results in ordinal order.
    pub results: Vec<(u32, T)>,
    /// Terminal failure, if the sequence stopped early.
    pub failure: Option<StepFailure>,
}

impl<T> ExecutionOutcome<T> {
    /// Returns the ordinal of the last step that ran.
    #[must_use]
    pub fn last_ordinal(&self) -> Option<u32> {
        self.failure
            .as_ref()
            .map(|failure| failure.ordinal)
            .or_else(|| self.results.last().map(|(ordinal, _)| *ordinal))
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Inputs shared by every step of one case.
pub(crate) struct ExecutionPlan<'a, F, T> {
    /// Case name for contexts and events.
    pub(crate) case_name: &'a str,
    /// Step function.
    pub(crate) step_fn: Arc<dyn StepFunction<F, T>>,
    /// Parent token; each step receives a child.
    pub(crate) parent: &'a CancellationToken,
    /// Optional per-step timeout.
    pub(crate) timeout: Option<Duration>,
    /// Event sink.
    pub(crate) events: &'a dyn HarnessEventSink,
}

/// Runs `steps` in order and returns the outcome plus the fixture, which is
/// `None` only when it could not be recovered after a panic.
pub(crate) async fn execute<F, T>(
    plan: ExecutionPlan<'_, F, T>,
    fixture: F,
    steps: Vec<StepFile>,
) -> (ExecutionOutcome<T>, Option<F>)
where
    F: Send + 'static,
    T: Send + 'static,
{
    let shared = Arc::new(Mutex::new(fixture));
    let mut outcome = ExecutionOutcome {
        results: Vec::with_capacity(steps.len()),
        failure: None,
    };

    for step in steps {
        let ordinal = step.ordinal;
        plan.events.record(
            &HarnessEvent::new("step_started", plan.case_name)
                .with_step(ordinal)
                .with_path(&step.path),
        );
        match run_step(&plan, Arc::clone(&shared), step).await {
            Ok(value) => {
                plan.events
                    .record(&HarnessEvent::new("step_succeeded", plan.case_name).with_step(ordinal));
                outcome.results.push((ordinal, value));
            }
            Err(error) => {
                plan.events.record(
                    &HarnessEvent::new("step_failed", plan.case_name)
                        .with_step(ordinal)
                        .with_detail(error.to_string()),
                );
                outcome.failure = Some(StepFailure {
                    ordinal,
                    error,
                });
                break;
            }
        }
    }

    let fixture = Arc::try_unwrap(shared).ok().map(Mutex::into_inner);
    (outcome, fixture)
}

/// Runs one step on its own task, racing cancellation and the deadline.
async fn run_step<F, T>(
    plan: &ExecutionPlan<'_, F, T>,
    fixture: Arc<Mutex<F>>,
    step: StepFile,
) -> Result<T, StepError>
where
    F: Send + 'static,
    T: Send + 'static,
{
    let token = plan.parent.child_token();
    let deadline = plan.timeout.map(|timeout| Instant::now() + timeout);
    let ctx = StepContext::new(plan.case_name, step.ordinal, token.clone(), deadline);
    let step_fn = Arc::clone(&plan.step_fn);
    let mut handle = tokio::spawn(async move {
        let mut guard = fixture.lock().await;
        step_fn.call(&ctx, &mut *guard, &step).await
    });

    let expired = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        joined = &mut handle => match joined {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(StepError::Panicked(panic_message(err.into_panic()))),
            Err(_) => Err(StepError::Cancelled),
        },
        () = token.cancelled() => {
            handle.abort();
            let _ = handle.await;
            Err(StepError::Cancelled)
        }
        () = expired => {
            token.cancel();
            handle.abort();
            let _ = handle.await;
            Err(StepError::TimedOut(plan.timeout.unwrap_or_default()))
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}
