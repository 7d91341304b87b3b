// crates/golden-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for configuration, sequencing, fixtures, and steps.
// Purpose: Keep whole-run failures apart from per-case and per-step failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Errors are grouped by blast radius:
//! - [`ConfigError`] aborts the whole run before any I/O.
//! - [`SequenceError`] and [`FixtureError`] fail a single case.
//! - [`StepError`] is the terminal error of a step sequence.
//! - [`CodecError`] covers golden formatting, loading, and value projection.
//! - [`HarnessError`] covers failures of the run itself (unreadable root).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as StdError;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Invalid harness configuration, detected before any case runs.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required extension is empty.
    #[error("{field} must not be empty")]
    EmptyExtension {
        /// Configuration field name.
        field: &'static str,
    },
    /// An extension contains characters that cannot appear in a file suffix.
    #[error("{field} `{value}` must be a plain file extension")]
    InvalidExtension {
        /// Configuration field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// Success and error goldens would share one suffix.
    #[error("success and error output extensions must differ (both are `{0}`)")]
    ConflictingExtensions(String),
    /// Only half of the error handling pair is configured.
    #[error("error handling is partially configured: {set} is set but {missing} is not")]
    PartialErrorHandling {
        /// The configured half.
        set: &'static str,
        /// The missing half.
        missing: &'static str,
    },
    /// A failure prefix was given without error handling.
    #[error("error prefix is set but no error formatter is configured")]
    PrefixWithoutErrorHandling,
    /// The failure prefix is empty.
    #[error("error prefix must not be empty")]
    EmptyErrorPrefix,
    /// The explicit flag and the environment select different run modes.
    #[error("conflicting run modes: flag selects {flag}, {env_var} selects {env}")]
    ConflictingMode {
        /// Mode selected by the flag.
        flag: &'static str,
        /// Mode selected by the environment.
        env: &'static str,
        /// Environment variable consulted.
        env_var: &'static str,
    },
    /// An environment variable holds non UTF-8 data.
    #[error("{name} must be valid UTF-8")]
    EnvEncoding {
        /// Environment variable name.
        name: &'static str,
    },
    /// An environment variable holds an unsupported value.
    #[error("{name} must be one of 1, true, 0, false (got `{value}`)")]
    EnvValue {
        /// Environment variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
    /// The per-step timeout is zero.
    #[error("step timeout must be greater than zero")]
    ZeroTimeout,
    /// A semantic equality hook is set but the codec cannot decode typed results.
    #[error("semantic equality requires a codec that decodes typed results")]
    SemanticEqWithoutDecode,
}

// ============================================================================
// SECTION: Sequence Errors
// ============================================================================

/// Step directory validation failure. Fatal to one case only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The case directory or one of its files could not be read.
    #[error("failed to read {}: {message}", .path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
    /// A subdirectory was found inside a case directory.
    #[error("unexpected subdirectory {name} in step directory")]
    UnexpectedDirectory {
        /// Entry name.
        name: String,
    },
    /// A file does not carry the input suffix and is not a golden.
    #[error("unexpected file {name} with wrong extension (expected {expected})")]
    MalformedEntry {
        /// Entry name.
        name: String,
        /// Expected input suffix.
        expected: String,
    },
    /// The ordinal prefix is not an integer.
    #[error("invalid step filename {name}: must be a number")]
    NonNumericOrdinal {
        /// Entry name.
        name: String,
    },
    /// The ordinal prefix is zero or negative.
    #[error("invalid step number {ordinal} in filename {name}: must be positive")]
    NonPositiveOrdinal {
        /// Entry name.
        name: String,
        /// Parsed ordinal.
        ordinal: i64,
    },
    /// The ordinal prefix does not fit the ordinal range.
    #[error("invalid step number {ordinal} in filename {name}: out of range")]
    OrdinalOutOfRange {
        /// Entry name.
        name: String,
        /// Parsed ordinal.
        ordinal: i64,
    },
    /// Two files resolve to the same ordinal.
    #[error("duplicate step number {ordinal} ({first} and {second})")]
    DuplicateOrdinal {
        /// Duplicated ordinal.
        ordinal: u32,
        /// First file name.
        first: String,
        /// Second file name.
        second: String,
    },
    /// The sorted ordinals skip a value.
    #[error("step sequence is not dense: expected step {expected}, found step {found}")]
    SequenceGap {
        /// First missing ordinal.
        expected: u32,
        /// Ordinal found in its place.
        found: u32,
    },
    /// The directory holds no input files.
    #[error("no step files found in directory")]
    Empty,
}

// ============================================================================
// SECTION: Fixture Errors
// ============================================================================

/// Fixture setup or teardown failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FixtureError {
    /// Human-readable failure message.
    message: String,
}

impl FixtureError {
    /// Creates a fixture error from any displayable value.
    #[must_use]
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// SECTION: Step Errors
// ============================================================================

/// Terminal error of a step sequence.
///
/// # Invariants
/// - `Failed` displays exactly the wrapped error text, so error goldens hold
///   the step function's own message.
#[derive(Debug, Error)]
pub enum StepError {
    /// The step function returned an error.
    #[error("{0}")]
    Failed(Box<dyn StdError + Send + Sync>),
    /// The harness cancellation token fired during the step.
    #[error("step cancelled")]
    Cancelled,
    /// The step exceeded the configured timeout.
    #[error("step timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),
    /// The step function panicked.
    #[error("step panicked: {0}")]
    Panicked(String),
}

impl StepError {
    /// Wraps any error or message returned by a step function.
    ///
    /// # Examples
    /// ```
    /// use golden_harness::StepError;
    ///
    /// let err = StepError::new("name must not be empty");
    /// assert_eq!(err.to_string(), "name must not be empty");
    /// ```
    #[must_use]
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Failed(err.into())
    }
}

// ============================================================================
// SECTION: Codec Errors
// ============================================================================

/// Golden serialization or comparison failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Formatting a result failed.
    #[error("format failed: {0}")]
    Format(String),
    /// Loading golden bytes failed.
    #[error("load failed: {0}")]
    Load(String),
    /// The result does not have the shape the selected format requires.
    #[error("{kind} format requires a {expected} result")]
    Shape {
        /// Selected format label.
        kind: &'static str,
        /// Required result shape.
        expected: &'static str,
    },
    /// Projecting a result into a comparable value failed.
    #[error("value projection failed: {0}")]
    Projection(String),
}

// ============================================================================
// SECTION: Run Errors
// ============================================================================

/// Failure of the harness run itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Configuration is invalid.
    #[error("invalid harness config: {0}")]
    Config(#[from] ConfigError),
    /// The test root could not be listed.
    #[error("failed to read test root {}: {message}", .path.display())]
    RootUnreadable {
        /// Root directory.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
}
