// crates/golden-harness/src/config.rs
// ============================================================================
// Module: Harness Configuration
// Description: Typed harness configuration, builder, and run mode selection.
// Purpose: Validate every option once before any case touches the filesystem.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`HarnessConfig`] bundles extensions, error handling, the step function,
//! fixture callbacks, the codec, comparison options, and the [`RunMode`].
//! It is assembled with [`HarnessConfigBuilder`] and validated by
//! [`crate::Harness::new`].
//!
//! Run mode is resolved from an explicit flag and the `GOLDEN_UPDATE`
//! environment variable; disagreeing sources are a configuration error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::FormatKind;
use crate::codec::GoldenCodec;
use crate::codec::SerdeCodec;
use crate::compare::CompareOptions;
use crate::error::ConfigError;
use crate::error::StepError;
use crate::events::HarnessEventSink;
use crate::events::NoopEventSink;
use crate::executor::StepFunction;
use crate::fixture::FixtureSource;
use crate::fixture::SetUpFn;
use crate::fixture::TearDownFn;
use crate::layout::StepLayout;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default prefix marking failure-expected cases.
pub const DEFAULT_ERROR_PREFIX: &str = "error_";
/// Environment variable selecting update mode.
pub const UPDATE_ENV_VAR: &str = "GOLDEN_UPDATE";
/// Command-line flag selecting update mode.
pub const UPDATE_FLAG: &str = "--update";

// ============================================================================
// SECTION: Run Mode
// ============================================================================

/// Whether mismatches fail or rewrite goldens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Mismatches are failures.
    #[default]
    Verify,
    /// Mismatches overwrite goldens.
    Update,
}

impl RunMode {
    /// Returns a stable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Update => "update",
        }
    }

    /// Returns true in update mode.
    #[must_use]
    pub const fn is_update(self) -> bool {
        matches!(self, Self::Update)
    }

    /// Combines the flag and environment selections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingMode`] when both are set and differ.
    pub fn resolve(flag: Option<Self>, env: Option<Self>) -> Result<Self, ConfigError> {
        match (flag, env) {
            (Some(flag), Some(env)) if flag != env => Err(ConfigError::ConflictingMode {
                flag: flag.label(),
                env: env.label(),
                env_var: UPDATE_ENV_VAR,
            }),
            (Some(mode), _) | (None, Some(mode)) => Ok(mode),
            (None, None) => Ok(Self::Verify),
        }
    }

    /// Returns `Some(Update)` when the update flag is present.
    pub fn from_args<I, S>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter().any(|arg| arg.as_ref() == UPDATE_FLAG).then_some(Self::Update)
    }

    /// Parses an environment value: `1`/`true` or `0`/`false`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvValue`] for any other value.
    pub fn parse_env_value(name: &'static str, raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(Self::Update),
            "0" | "false" => Ok(Self::Verify),
            _ => Err(ConfigError::EnvValue {
                name,
                value: raw.to_string(),
            }),
        }
    }

    /// Reads the `GOLDEN_UPDATE` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the value is not UTF-8 or unsupported.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        read_env_strict(UPDATE_ENV_VAR)?
            .map(|raw| Self::parse_env_value(UPDATE_ENV_VAR, &raw))
            .transpose()
    }

    /// Resolves the mode from process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for bad environment values or conflicts.
    pub fn detect() -> Result<Self, ConfigError> {
        Self::resolve(Self::from_args(std::env::args()), Self::from_env()?)
    }
}

/// Reads an environment variable, rejecting non UTF-8 and empty values.
fn read_env_strict(name: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var_os(name) {
        None => Ok(None),
        Some(raw) => {
            let value = raw.into_string().map_err(|_| ConfigError::EnvEncoding {
                name,
            })?;
            if value.trim().is_empty() {
                return Err(ConfigError::EnvValue {
                    name,
                    value,
                });
            }
            Ok(Some(value))
        }
    }
}

// ============================================================================
// SECTION: Error Formatting
// ============================================================================

/// Formats a terminal step error into error golden bytes.
pub type ErrorFormatter = Arc<dyn Fn(&StepError) -> Vec<u8> + Send + Sync>;

/// Returns a formatter writing the error's display text.
#[must_use]
pub fn display_error_formatter() -> ErrorFormatter {
    Arc::new(|err: &StepError| err.to_string().into_bytes())
}

// ============================================================================
// SECTION: Harness Config
// ============================================================================

/// Complete harness configuration for fixture type `F` and result type `T`.
pub struct HarnessConfig<F, T> {
    /// Input extension.
    pub(crate) input_ext: String,
    /// Success golden extension.
    pub(crate) success_ext: String,
    /// Error golden extension.
    pub(crate) error_ext: Option<String>,
    /// Error golden formatter.
    pub(crate) error_formatter: Option<ErrorFormatter>,
    /// Failure-expected case prefix.
    pub(crate) error_prefix: Option<String>,
    /// Step function.
    pub(crate) step: Arc<dyn StepFunction<F, T>>,
    /// Fixture source.
    pub(crate) fixture: FixtureSource<F>,
    /// Teardown callback.
    pub(crate) tear_down: Option<TearDownFn<F>>,
    /// Golden codec.
    pub(crate) codec: Arc<dyn GoldenCodec<T>>,
    /// Comparison options.
    pub(crate) compare: CompareOptions<T>,
    /// Run mode.
    pub(crate) mode: RunMode,
    /// Per-step timeout.
    pub(crate) step_timeout: Option<Duration>,
    /// Event sink.
    pub(crate) events: Arc<dyn HarnessEventSink>,
}

/// Validated naming derived from a [`HarnessConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatedNaming {
    /// File layout.
    pub(crate) layout: StepLayout,
    /// Failure prefix when error handling is configured.
    pub(crate) failure_prefix: Option<String>,
}

impl<F, T> HarnessConfig<F, T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Starts a builder whose fixture is `F::default()`.
    pub fn builder<S>(step: S) -> HarnessConfigBuilder<F, T>
    where
        F: Default,
        S: StepFunction<F, T> + 'static,
    {
        HarnessConfigBuilder::new(Arc::new(step), FixtureSource::Default(F::default))
    }

    /// Starts a builder whose fixture comes from a setup callback.
    pub fn builder_with_set_up<S>(set_up: SetUpFn<F>, step: S) -> HarnessConfigBuilder<F, T>
    where
        S: StepFunction<F, T> + 'static,
    {
        HarnessConfigBuilder::new(Arc::new(step), FixtureSource::SetUp(set_up))
    }
}

impl<F, T> HarnessConfig<F, T> {
    /// Returns the run mode.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// Returns true when error goldens are configured.
    #[must_use]
    pub const fn error_handling_enabled(&self) -> bool {
        self.error_formatter.is_some() && self.error_ext.is_some()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.naming().map(|_| ())
    }

    /// Validates the configuration and derives the file layout.
    pub(crate) fn naming(&self) -> Result<ValidatedNaming, ConfigError> {
        let input_ext = normalize_extension("input_ext", &self.input_ext)?;
        let success_ext = normalize_extension("success_ext", &self.success_ext)?;
        let error_ext = match (&self.error_ext, &self.error_formatter) {
            (Some(ext), Some(_)) => Some(normalize_extension("error_ext", ext)?),
            (Some(_), None) => {
                return Err(ConfigError::PartialErrorHandling {
                    set: "error_ext",
                    missing: "error_formatter",
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::PartialErrorHandling {
                    set: "error_formatter",
                    missing: "error_ext",
                });
            }
            (None, None) => None,
        };
        if let Some(error_ext) = &error_ext
            && *error_ext == success_ext
        {
            return Err(ConfigError::ConflictingExtensions(success_ext));
        }
        let failure_prefix = match (&self.error_prefix, error_ext.is_some()) {
            (Some(_), false) => return Err(ConfigError::PrefixWithoutErrorHandling),
            (Some(prefix), true) if prefix.is_empty() => return Err(ConfigError::EmptyErrorPrefix),
            (Some(prefix), true) => Some(prefix.clone()),
            (None, true) => Some(DEFAULT_ERROR_PREFIX.to_string()),
            (None, false) => None,
        };
        if self.step_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.compare.semantic_eq.is_some() && !self.codec.decodes_typed() {
            return Err(ConfigError::SemanticEqWithoutDecode);
        }
        Ok(ValidatedNaming {
            layout: StepLayout::new(&input_ext, &success_ext, error_ext.as_deref()),
            failure_prefix,
        })
    }
}

/// Strips one leading dot and rejects empty or path-like extensions.
fn normalize_extension(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    let ext = raw.strip_prefix('.').unwrap_or(raw);
    if ext.is_empty() {
        return Err(ConfigError::EmptyExtension {
            field,
        });
    }
    if ext.starts_with('.')
        || ext.ends_with('.')
        || ext.chars().any(|ch| ch == '/' || ch == '\\' || ch.is_whitespace() || ch.is_control())
    {
        return Err(ConfigError::InvalidExtension {
            field,
            value: raw.to_string(),
        });
    }
    Ok(ext.to_string())
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`HarnessConfig`].
pub struct HarnessConfigBuilder<F, T> {
    /// Configuration under construction.
    config: HarnessConfig<F, T>,
}

impl<F, T> HarnessConfigBuilder<F, T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Creates a builder with the structured codec and verify mode.
    fn new(step: Arc<dyn StepFunction<F, T>>, fixture: FixtureSource<F>) -> Self {
        Self {
            config: HarnessConfig {
                input_ext: String::new(),
                success_ext: String::new(),
                error_ext: None,
                error_formatter: None,
                error_prefix: None,
                step,
                fixture,
                tear_down: None,
                codec: Arc::new(SerdeCodec::<T>::default()),
                compare: CompareOptions::default(),
                mode: RunMode::Verify,
                step_timeout: None,
                events: Arc::new(NoopEventSink),
            },
        }
    }

    /// Selects one of the built-in serde formats.
    #[must_use]
    pub fn format(mut self, kind: FormatKind) -> Self {
        self.config.codec = Arc::new(SerdeCodec::<T>::new(kind));
        self
    }
}

impl<F, T> HarnessConfigBuilder<F, T> {
    /// Sets the input extension.
    #[must_use]
    pub fn input_ext(mut self, ext: impl Into<String>) -> Self {
        self.config.input_ext = ext.into();
        self
    }

    /// Sets the success golden extension.
    #[must_use]
    pub fn success_ext(mut self, ext: impl Into<String>) -> Self {
        self.config.success_ext = ext.into();
        self
    }

    /// Sets the error golden extension.
    #[must_use]
    pub fn error_ext(mut self, ext: impl Into<String>) -> Self {
        self.config.error_ext = Some(ext.into());
        self
    }

    /// Sets the error golden formatter.
    #[must_use]
    pub fn error_formatter(mut self, formatter: ErrorFormatter) -> Self {
        self.config.error_formatter = Some(formatter);
        self
    }

    /// Enables error handling with the display formatter.
    #[must_use]
    pub fn error_handling(self, ext: impl Into<String>) -> Self {
        self.error_ext(ext).error_formatter(display_error_formatter())
    }

    /// Sets the failure-expected case prefix.
    #[must_use]
    pub fn error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.error_prefix = Some(prefix.into());
        self
    }

    /// Sets the teardown callback.
    #[must_use]
    pub fn tear_down(mut self, tear_down: TearDownFn<F>) -> Self {
        self.config.tear_down = Some(tear_down);
        self
    }

    /// Replaces the codec.
    #[must_use]
    pub fn codec(mut self, codec: impl GoldenCodec<T> + 'static) -> Self {
        self.config.codec = Arc::new(codec);
        self
    }

    /// Replaces the comparison options.
    #[must_use]
    pub fn compare(mut self, options: CompareOptions<T>) -> Self {
        self.config.compare = options;
        self
    }

    /// Sets the run mode.
    #[must_use]
    pub fn mode(mut self, mode: RunMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Sets a per-step timeout.
    #[must_use]
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.config.step_timeout = Some(timeout);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn events(mut self, events: Arc<dyn HarnessEventSink>) -> Self {
        self.config.events = events;
        self
    }

    /// Finishes the builder. Validation happens in [`crate::Harness::new`].
    #[must_use]
    pub fn build(self) -> HarnessConfig<F, T> {
        self.config
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
