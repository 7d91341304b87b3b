// crates/golden-harness/src/lib.rs
// ============================================================================
// Module: Golden Harness
// Description: Golden-sequence test harness for multi-step scenarios.
// Purpose: Drive numbered step files through a fixture and verify goldens.
// Dependencies: async-trait, difference, ron, serde, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The harness discovers one directory per test case under a root, validates
//! its numbered step inputs, creates a fixture, feeds each step to a
//! caller-supplied [`StepFunction`], and compares every result (or the
//! terminal error of a failure-marked case) against checked-in golden files.
//! In update mode mismatching goldens are rewritten instead of reported.
//!
//! ```text
//! testdata/
//!   greet_basic/
//!     1.in.ron   1.out.ron
//!   error_empty_name/
//!     1.in.ron   1.out.txt
//! ```
//!
//! Case directories whose name starts with the failure prefix (default
//! `error_`) must end in an error when error handling is configured.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod classify;
pub mod codec;
pub mod compare;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod fixture;
pub mod layout;
pub mod report;
pub mod rewrite;
pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use classify::Expectation;
pub use codec::FnCodec;
pub use codec::FormatKind;
pub use codec::GoldenCodec;
pub use codec::SerdeCodec;
pub use compare::CompareOptions;
pub use compare::Difference;
pub use compare::EquivalenceRule;
pub use compare::FloatTolerance;
pub use compare::IgnoreFields;
pub use compare::TrimTrailingWhitespace;
pub use compare::semantic_equality;
pub use config::DEFAULT_ERROR_PREFIX;
pub use config::ErrorFormatter;
pub use config::HarnessConfig;
pub use config::HarnessConfigBuilder;
pub use config::RunMode;
pub use config::UPDATE_ENV_VAR;
pub use config::display_error_formatter;
pub use context::StepContext;
pub use error::CodecError;
pub use error::ConfigError;
pub use error::FixtureError;
pub use error::HarnessError;
pub use error::SequenceError;
pub use error::StepError;
pub use events::FileEventSink;
pub use events::HarnessEvent;
pub use events::HarnessEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use executor::ExecutionOutcome;
pub use executor::StepFailure;
pub use executor::StepFunction;
pub use executor::SyncStep;
pub use fixture::CaseInfo;
pub use fixture::SetUpFn;
pub use fixture::TearDownFn;
pub use fixture::set_up_fn;
pub use fixture::tear_down_fn;
pub use layout::GoldenKind;
pub use layout::StepFile;
pub use layout::StepLayout;
pub use layout::TestCase;
pub use report::CaseFailure;
pub use report::CasePhase;
pub use report::CaseReport;
pub use report::HarnessFailure;
pub use report::RunReport;
pub use rewrite::GoldenWriter;
pub use rewrite::Resolution;
pub use runner::Harness;

/// Re-exported so step functions can implement [`StepFunction`] without a
/// direct dependency.
pub use async_trait::async_trait;
