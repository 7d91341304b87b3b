// crates/golden-harness/src/fixture.rs
// ============================================================================
// Module: Fixture Lifecycle
// Description: Setup and teardown callbacks for per-case fixtures.
// Purpose: Create one fixture per case and destroy it exactly once.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A fixture is built once per case, either by a setup callback or from
//! `F::default()`, and handed to teardown by value when the case ends.
//! Setup failure skips both the steps and teardown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::FixtureError;
use crate::layout::TestCase;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Boxed future returned by fixture callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Case identity passed to fixture callbacks.
pub type CaseInfo = TestCase;

/// Shared async setup callback.
pub type SetUpFn<F> =
    Arc<dyn Fn(CaseInfo) -> BoxFuture<'static, Result<F, FixtureError>> + Send + Sync>;

/// Shared async teardown callback. Receives the fixture by value.
pub type TearDownFn<F> =
    Arc<dyn Fn(CaseInfo, F) -> BoxFuture<'static, Result<(), FixtureError>> + Send + Sync>;

/// How the fixture of a case is produced.
pub enum FixtureSource<F> {
    /// `F::default()` with no setup step.
    Default(fn() -> F),
    /// Caller-supplied setup callback.
    SetUp(SetUpFn<F>),
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

/// Wraps an async closure as a [`SetUpFn`].
pub fn set_up_fn<F, C, Fut>(callback: C) -> SetUpFn<F>
where
    C: Fn(CaseInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<F, FixtureError>> + Send + 'static,
{
    Arc::new(move |case| -> BoxFuture<'static, Result<F, FixtureError>> {
        Box::pin(callback(case))
    })
}

/// Wraps an async closure as a [`TearDownFn`].
pub fn tear_down_fn<F, C, Fut>(callback: C) -> TearDownFn<F>
where
    C: Fn(CaseInfo, F) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), FixtureError>> + Send + 'static,
{
    Arc::new(move |case, fixture| -> BoxFuture<'static, Result<(), FixtureError>> {
        Box::pin(callback(case, fixture))
    })
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Fixture lifecycle for one harness configuration.
pub(crate) struct FixtureLifecycle<F> {
    /// Fixture source.
    source: FixtureSource<F>,
    /// Optional teardown callback.
    tear_down: Option<TearDownFn<F>>,
}

impl<F> FixtureLifecycle<F> {
    /// Creates a lifecycle from its callbacks.
    pub(crate) const fn new(source: FixtureSource<F>, tear_down: Option<TearDownFn<F>>) -> Self {
        Self {
            source,
            tear_down,
        }
    }

    /// Produces the fixture for `case`.
    pub(crate) async fn acquire(&self, case: &TestCase) -> Result<F, FixtureError> {
        match &self.source {
            FixtureSource::Default(make) => Ok(make()),
            FixtureSource::SetUp(set_up) => set_up(case.clone()).await,
        }
    }

    /// Destroys the fixture of `case`. Without a teardown callback the
    /// fixture is dropped.
    pub(crate) async fn release(&self, case: &TestCase, fixture: F) -> Result<(), FixtureError> {
        match &self.tear_down {
            Some(tear_down) => tear_down(case.clone(), fixture).await,
            None => Ok(()),
        }
    }
}
