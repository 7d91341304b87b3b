// crates/golden-harness/src/config/tests.rs
// ============================================================================
// Module: Harness Configuration Tests
// Description: Unit tests for config validation and run mode resolution.
// Purpose: Ensure invalid combinations are rejected before any I/O.
// Dependencies: golden-harness
// ============================================================================

//! ## Overview
//! Covers extension normalization, error handling pairing rules, prefix
//! defaults, timeouts, and flag/environment run mode conflicts.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::time::Duration;

use super::DEFAULT_ERROR_PREFIX;
use super::HarnessConfig;
use super::HarnessConfigBuilder;
use super::RunMode;
use super::UPDATE_ENV_VAR;
use super::display_error_formatter;
use crate::codec::FnCodec;
use crate::compare::CompareOptions;
use crate::compare::semantic_equality;
use crate::context::StepContext;
use crate::error::ConfigError;
use crate::error::StepError;
use crate::executor::SyncStep;
use crate::layout::GoldenKind;
use crate::layout::StepFile;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn echo(_ctx: &StepContext, _fixture: &mut (), step: &StepFile) -> Result<String, StepError> {
    step.text().map(str::to_string).map_err(StepError::new)
}

fn builder() -> HarnessConfigBuilder<(), String> {
    HarnessConfig::builder(SyncStep::new(echo)).input_ext("txt").success_ext("txt")
}

// ============================================================================
// SECTION: Extension Tests
// ============================================================================

#[test]
fn leading_dot_is_stripped() {
    let naming = builder().input_ext(".ron").success_ext(".json").build().naming().unwrap();
    assert_eq!(naming.layout.input_suffix(), ".in.ron");
    assert_eq!(naming.layout.golden_name(1, GoldenKind::Success).as_deref(), Some("1.out.json"));
    assert_eq!(naming.failure_prefix, None);
}

#[test]
fn empty_input_extension_is_rejected() {
    let err = builder().input_ext("").build().validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::EmptyExtension {
            field: "input_ext",
        }
    );
}

#[test]
fn lone_dot_extension_is_rejected_as_empty() {
    let err = builder().success_ext(".").build().validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::EmptyExtension {
            field: "success_ext",
        }
    );
}

#[test]
fn path_like_extension_is_rejected() {
    let err = builder().input_ext("in/json").build().validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidExtension { field: "input_ext", .. }));
}

#[test]
fn success_and_error_extensions_must_differ() {
    let err = builder().error_handling("txt").build().validate().unwrap_err();
    assert_eq!(err, ConfigError::ConflictingExtensions("txt".to_string()));
}

// ============================================================================
// SECTION: Error Handling Tests
// ============================================================================

#[test]
fn error_extension_without_formatter_is_rejected() {
    let err = builder().error_ext("err").build().validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::PartialErrorHandling {
            set: "error_ext",
            missing: "error_formatter",
        }
    );
}

#[test]
fn formatter_without_error_extension_is_rejected() {
    let err = builder().error_formatter(display_error_formatter()).build().validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::PartialErrorHandling {
            set: "error_formatter",
            missing: "error_ext",
        }
    );
}

#[test]
fn prefix_without_error_handling_is_rejected() {
    let err = builder().error_prefix("fail_").build().validate().unwrap_err();
    assert_eq!(err, ConfigError::PrefixWithoutErrorHandling);
}

#[test]
fn empty_prefix_is_rejected() {
    let err = builder().error_handling("err").error_prefix("").build().validate().unwrap_err();
    assert_eq!(err, ConfigError::EmptyErrorPrefix);
}

#[test]
fn error_handling_defaults_the_prefix() {
    let config = builder().error_handling("err").build();
    assert!(config.error_handling_enabled());
    let naming = config.naming().unwrap();
    assert_eq!(naming.failure_prefix.as_deref(), Some(DEFAULT_ERROR_PREFIX));
    assert_eq!(naming.layout.golden_name(4, GoldenKind::Error).as_deref(), Some("4.out.err"));
}

#[test]
fn custom_prefix_is_kept() {
    let naming = builder().error_handling("err").error_prefix("bad_").build().naming().unwrap();
    assert_eq!(naming.failure_prefix.as_deref(), Some("bad_"));
}

#[test]
fn zero_timeout_is_rejected() {
    let err = builder().step_timeout(Duration::ZERO).build().validate().unwrap_err();
    assert_eq!(err, ConfigError::ZeroTimeout);
}

fn text_codec() -> FnCodec<String> {
    FnCodec::new(
        |value: &String| Ok(value.clone().into_bytes()),
        |bytes: &[u8]| Ok(String::from_utf8_lossy(bytes).into_owned().into()),
        |value: &String| Ok(value.clone().into()),
    )
}

#[test]
fn semantic_eq_requires_a_decoding_codec() {
    let err = builder()
        .codec(text_codec())
        .compare(CompareOptions::default().with_semantic_eq(semantic_equality()))
        .build()
        .validate()
        .unwrap_err();
    assert_eq!(err, ConfigError::SemanticEqWithoutDecode);
}

#[test]
fn semantic_eq_accepts_closure_codec_with_decode() {
    let codec = text_codec()
        .with_decode(|bytes: &[u8]| Ok(String::from_utf8_lossy(bytes).into_owned()));
    builder()
        .codec(codec)
        .compare(CompareOptions::default().with_semantic_eq(semantic_equality()))
        .build()
        .validate()
        .unwrap();
}

#[test]
fn default_codec_supports_semantic_eq() {
    builder()
        .compare(CompareOptions::default().with_semantic_eq(semantic_equality()))
        .build()
        .validate()
        .unwrap();
}

// ============================================================================
// SECTION: Run Mode Tests
// ============================================================================

#[test]
fn run_mode_defaults_to_verify() {
    assert_eq!(RunMode::resolve(None, None).unwrap(), RunMode::Verify);
    assert_eq!(builder().build().mode(), RunMode::Verify);
}

#[test]
fn run_mode_accepts_agreeing_sources() {
    assert_eq!(RunMode::resolve(Some(RunMode::Update), None).unwrap(), RunMode::Update);
    assert_eq!(RunMode::resolve(None, Some(RunMode::Update)).unwrap(), RunMode::Update);
    assert_eq!(
        RunMode::resolve(Some(RunMode::Update), Some(RunMode::Update)).unwrap(),
        RunMode::Update
    );
}

#[test]
fn run_mode_rejects_conflicting_sources() {
    let err = RunMode::resolve(Some(RunMode::Update), Some(RunMode::Verify)).unwrap_err();
    assert_eq!(
        err,
        ConfigError::ConflictingMode {
            flag: "update",
            env: "verify",
            env_var: UPDATE_ENV_VAR,
        }
    );
}

#[test]
fn run_mode_parses_env_values() {
    for raw in ["1", "true", "TRUE", " true "] {
        assert_eq!(RunMode::parse_env_value(UPDATE_ENV_VAR, raw).unwrap(), RunMode::Update);
    }
    for raw in ["0", "false"] {
        assert_eq!(RunMode::parse_env_value(UPDATE_ENV_VAR, raw).unwrap(), RunMode::Verify);
    }
    let err = RunMode::parse_env_value(UPDATE_ENV_VAR, "yes").unwrap_err();
    assert_eq!(
        err,
        ConfigError::EnvValue {
            name: UPDATE_ENV_VAR,
            value: "yes".to_string(),
        }
    );
}

#[test]
fn run_mode_flag_is_read_from_args() {
    assert_eq!(RunMode::from_args(["test-bin", "--update"]), Some(RunMode::Update));
    assert_eq!(RunMode::from_args(["test-bin", "--nocapture"]), None);
}
