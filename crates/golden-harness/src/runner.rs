// crates/golden-harness/src/runner.rs
// ============================================================================
// Module: Harness Runner
// Description: Case-by-case orchestration of load, execute, and verify.
// Purpose: Drive every case through its lifecycle and collect reports.
// Dependencies: tokio-util
// ============================================================================

//! ## Overview
//! [`Harness`] owns a validated configuration and a root cancellation token.
//! Cases run sequentially. Each case walks
//! `Discovered -> Validated -> FixtureReady -> Executing -> Succeeded|Failed
//! -> TornDown`; sequence and setup failures end the walk early, and setup
//! failure skips teardown.
//!
//! Security posture: golden and case paths come from the test root only; the
//! harness never follows paths found inside step files.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::classify::Expectation;
use crate::classify::Route;
use crate::classify::route;
use crate::codec::GoldenCodec;
use crate::compare::CompareOptions;
use crate::compare::compare;
use crate::compare::compare_bytes;
use crate::config::ErrorFormatter;
use crate::config::HarnessConfig;
use crate::config::RunMode;
use crate::config::ValidatedNaming;
use crate::error::ConfigError;
use crate::error::FixtureError;
use crate::error::HarnessError;
use crate::error::StepError;
use crate::events::HarnessEvent;
use crate::events::HarnessEventSink;
use crate::executor::ExecutionPlan;
use crate::executor::StepFunction;
use crate::executor::execute;
use crate::fixture::FixtureLifecycle;
use crate::layout::GoldenKind;
use crate::layout::TestCase;
use crate::layout::discover_cases;
use crate::layout::load_step_files;
use crate::report::CaseFailure;
use crate::report::CasePhase;
use crate::report::CaseReport;
use crate::report::RunReport;
use crate::rewrite::GoldenWriter;
use crate::rewrite::Resolution;

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Golden-sequence harness for fixture type `F` and result type `T`.
pub struct Harness<F, T> {
    /// Step function.
    step: Arc<dyn StepFunction<F, T>>,
    /// Fixture setup and teardown.
    lifecycle: FixtureLifecycle<F>,
    /// Golden codec.
    codec: Arc<dyn GoldenCodec<T>>,
    /// Comparison options.
    compare: CompareOptions<T>,
    /// Error golden formatter; set iff error handling is configured.
    error_formatter: Option<ErrorFormatter>,
    /// Validated file naming.
    naming: ValidatedNaming,
    /// Mismatch resolution for the run mode.
    writer: GoldenWriter,
    /// Per-step timeout.
    step_timeout: Option<Duration>,
    /// Event sink.
    events: Arc<dyn HarnessEventSink>,
    /// Root cancellation token.
    root_token: CancellationToken,
}

impl<F, T> Harness<F, T>
where
    F: Send + 'static,
    T: Send + 'static,
{
    /// Validates `config` and builds a harness.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid. No file is
    /// touched in that case.
    pub fn new(config: HarnessConfig<F, T>) -> Result<Self, ConfigError> {
        let naming = config.naming()?;
        Ok(Self {
            step: config.step,
            lifecycle: FixtureLifecycle::new(config.fixture, config.tear_down),
            codec: config.codec,
            compare: config.compare,
            error_formatter: config.error_formatter,
            naming,
            writer: GoldenWriter::new(config.mode),
            step_timeout: config.step_timeout,
            events: config.events,
            root_token: CancellationToken::new(),
        })
    }

    /// Returns the run mode.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.writer.mode()
    }

    /// Returns the root cancellation token. Cancelling it aborts the step in
    /// flight and every later step.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.root_token.clone()
    }

    /// Runs every case directory under `root` in name order.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::RootUnreadable`] when `root` cannot be listed.
    /// Case failures are reported in the [`RunReport`].
    pub async fn run(&self, root: &Path) -> Result<RunReport, HarnessError> {
        let cases = discover_cases(root)?;
        let mut reports = Vec::with_capacity(cases.len());
        for case in &cases {
            reports.push(self.run_test_case(case).await);
        }
        Ok(RunReport {
            mode: self.mode(),
            cases: reports,
        })
    }

    /// Runs a single case directory.
    pub async fn run_case(&self, dir: &Path) -> CaseReport {
        let name = dir
            .file_name()
            .map_or_else(|| dir.display().to_string(), |name| name.to_string_lossy().into_owned());
        let case = TestCase {
            name,
            dir: dir.to_path_buf(),
        };
        self.run_test_case(&case).await
    }

    /// Drives one case through its lifecycle.
    async fn run_test_case(&self, case: &TestCase) -> CaseReport {
        let mut report = CaseReport::new(&case.name);
        self.emit(HarnessEvent::new("case_discovered", &case.name).with_path(&case.dir));

        let steps = match load_step_files(&case.dir, &self.naming.layout) {
            Ok(steps) => steps,
            Err(err) => {
                self.emit(HarnessEvent::new("case_invalid", &case.name).with_detail(err.to_string()));
                report.failures.push(CaseFailure::Sequence(err));
                return report;
            }
        };
        report.phases.push(CasePhase::Validated);
        self.emit(
            HarnessEvent::new("case_validated", &case.name)
                .with_detail(format!("{} steps", steps.len())),
        );

        let expectation = Expectation::classify(&case.name, self.naming.failure_prefix.as_deref());
        report.expectation = Some(expectation);

        let fixture = match self.lifecycle.acquire(case).await {
            Ok(fixture) => fixture,
            Err(err) => {
                self.emit(
                    HarnessEvent::new("fixture_set_up_failed", &case.name)
                        .with_detail(err.to_string()),
                );
                report.failures.push(CaseFailure::SetUp(err));
                return report;
            }
        };
        report.phases.push(CasePhase::FixtureReady);
        self.emit(HarnessEvent::new("fixture_ready", &case.name));

        let plan = ExecutionPlan {
            case_name: &case.name,
            step_fn: Arc::clone(&self.step),
            parent: &self.root_token,
            timeout: self.step_timeout,
            events: self.events.as_ref(),
        };
        let (outcome, fixture) = execute(plan, fixture, steps).await;
        report.phases.extend(outcome.results.iter().map(|(ordinal, _)| CasePhase::Executing(*ordinal)));
        match &outcome.failure {
            Some(failure) => {
                report.phases.push(CasePhase::Executing(failure.ordinal));
                report.phases.push(CasePhase::Failed(failure.ordinal));
            }
            None => report.phases.push(CasePhase::Succeeded),
        }

        self.tear_down(case, fixture, &mut report).await;

        match route(expectation, outcome, self.error_formatter.is_some()) {
            Route::CompareResults(results) => {
                for (ordinal, value) in &results {
                    self.check_result(case, *ordinal, value, &mut report);
                }
            }
            Route::CompareError {
                ordinal,
                error,
            } => self.check_error(case, ordinal, &error, &mut report),
            Route::Fail(failure) => report.failures.push(failure),
        }

        let verdict = if report.passed() { "passed" } else { "failed" };
        self.emit(HarnessEvent::new("case_finished", &case.name).with_detail(verdict));
        report
    }

    /// Runs teardown when the fixture survived execution.
    async fn tear_down(&self, case: &TestCase, fixture: Option<F>, report: &mut CaseReport) {
        let result = match fixture {
            Some(fixture) => self.lifecycle.release(case, fixture).await,
            None => Err(FixtureError::new("fixture lost after step panic; teardown skipped")),
        };
        match result {
            Ok(()) => self.emit(HarnessEvent::new("fixture_torn_down", &case.name)),
            Err(err) => {
                self.emit(
                    HarnessEvent::new("fixture_tear_down_failed", &case.name)
                        .with_detail(err.to_string()),
                );
                report.teardown_error = Some(err);
            }
        }
        report.phases.push(CasePhase::TornDown);
    }

    /// Compares one step result against its success golden.
    fn check_result(&self, case: &TestCase, ordinal: u32, value: &T, report: &mut CaseReport) {
        let Some(path) = self.naming.layout.golden_path(&case.dir, ordinal, GoldenKind::Success)
        else {
            return;
        };
        let diff = match read_golden(&path) {
            Ok(Some(golden)) => {
                match compare(&path, &golden, value, self.codec.as_ref(), &self.compare) {
                    Ok(None) => return,
                    Ok(Some(diff)) => Some(diff.to_string()),
                    Err(error) => {
                        report.failures.push(CaseFailure::Codec {
                            ordinal,
                            path,
                            error,
                        });
                        return;
                    }
                }
            }
            Ok(None) => None,
            Err(err) => {
                report.failures.push(golden_io(ordinal, path, &err));
                return;
            }
        };
        match self.codec.format(value) {
            Ok(bytes) => self.resolve(case, ordinal, path, &bytes, diff, report),
            Err(error) => report.failures.push(CaseFailure::Codec {
                ordinal,
                path,
                error,
            }),
        }
    }

    /// Compares the formatted terminal error against the error golden.
    fn check_error(&self, case: &TestCase, ordinal: u32, error: &StepError, report: &mut CaseReport) {
        let (Some(formatter), Some(path)) = (
            &self.error_formatter,
            self.naming.layout.golden_path(&case.dir, ordinal, GoldenKind::Error),
        ) else {
            return;
        };
        let actual = formatter(error);
        let diff = match read_golden(&path) {
            Ok(Some(golden)) => match compare_bytes(&path, &golden, &actual) {
                None => return,
                Some(diff) => Some(diff.to_string()),
            },
            Ok(None) => None,
            Err(err) => {
                report.failures.push(golden_io(ordinal, path, &err));
                return;
            }
        };
        self.resolve(case, ordinal, path, &actual, diff, report);
    }

    /// Resolves a mismatch (`diff` set) or missing golden (`diff` unset).
    fn resolve(
        &self,
        case: &TestCase,
        ordinal: u32,
        path: PathBuf,
        bytes: &[u8],
        diff: Option<String>,
        report: &mut CaseReport,
    ) {
        match self.writer.resolve(&path, bytes) {
            Ok(Resolution::Rewritten) => {
                self.emit(
                    HarnessEvent::new("golden_rewritten", &case.name)
                        .with_step(ordinal)
                        .with_path(&path),
                );
                report.rewritten.push(path);
            }
            Ok(Resolution::Reported) => {
                let event = if diff.is_some() { "golden_mismatch" } else { "golden_missing" };
                self.emit(HarnessEvent::new(event, &case.name).with_step(ordinal).with_path(&path));
                report.failures.push(match diff {
                    Some(diff) => CaseFailure::Mismatch {
                        ordinal,
                        path,
                        diff,
                    },
                    None => CaseFailure::MissingGolden {
                        ordinal,
                        path,
                    },
                });
            }
            Err(err) => report.failures.push(golden_io(ordinal, path, &err)),
        }
    }

    /// Records an event.
    fn emit(&self, event: HarnessEvent) {
        self.events.record(&event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a golden; `Ok(None)` when it does not exist.
fn read_golden(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Builds a golden I/O failure.
fn golden_io(ordinal: u32, path: PathBuf, err: &io::Error) -> CaseFailure {
    CaseFailure::GoldenIo {
        ordinal,
        path,
        message: err.to_string(),
    }
}
