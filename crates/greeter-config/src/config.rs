// crates/greeter-config/src/config.rs
// ============================================================================
// Module: Greeter Server Configuration
// Description: TOML parsing and validation for the greeter server.
// Purpose: Turn greeter.toml into validated settings plus diagnostics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! [`parse`] never fails outright: every problem becomes a positioned
//! [`Diagnostic`], and settings are returned only when no error was found.
//! [`load`] adds path resolution and a hard size limit on top.
//! Security posture: config inputs are untrusted; they are size-limited and
//! must be UTF-8.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use toml::Spanned;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Severity;
use crate::diagnostics::SourceRange;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "greeter.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "GREETER_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Name of the server table.
const SERVER_TABLE: &str = "server";
/// Name of the listening address key.
const LISTENING_ADDRESS: &str = "listening_address";

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Validated server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `host:port` the server listens on.
    pub listening_address: String,
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// The file or path violates a hard limit.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The file parsed with error diagnostics.
    #[error("config has errors:\n{0}")]
    Diagnostics(Diagnostics),
}

// ============================================================================
// SECTION: Raw Document
// ============================================================================

/// Document shape as written; unknown keys are reported separately.
#[derive(Debug, Deserialize)]
struct RawDocument {
    /// `[server]` table.
    server: Option<RawServer>,
}

/// `[server]` table as written.
#[derive(Debug, Deserialize)]
struct RawServer {
    /// Listening address value.
    listening_address: Option<Spanned<String>>,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses configuration `bytes` read from `path`.
///
/// Returns settings only when no error diagnostic was produced.
#[must_use]
pub fn parse(path: &Path, bytes: &[u8]) -> (Option<ServerConfig>, Diagnostics) {
    let mut report = Report::new(path);
    let Ok(text) = std::str::from_utf8(bytes) else {
        report.error(None, "Invalid encoding", "The configuration file must be UTF-8.");
        return (None, report.diagnostics);
    };
    let document: RawDocument = match toml::from_str(text) {
        Ok(document) => document,
        Err(err) => {
            let range = err.span().map(|span| SourceRange::from_span(text, span));
            report.error(range, "Invalid configuration", err.message().trim());
            return (None, report.diagnostics);
        }
    };
    report_unknown_keys(text, &mut report);

    let Some(server) = document.server else {
        report.error(None, "Missing server block", "A [server] table is required.");
        return (None, report.diagnostics);
    };
    let Some(address) = server.listening_address else {
        report.error(
            None,
            "Missing listening address",
            "The 'listening_address' must be set in the server block.",
        );
        return (None, report.diagnostics);
    };
    let address_range = SourceRange::from_span(text, address.span());
    let address = address.into_inner();
    if address.is_empty() {
        report.error(
            Some(address_range),
            "Missing listening address",
            "The 'listening_address' must be set in the server block.",
        );
        return (None, report.diagnostics);
    }
    if !is_host_port(&address) {
        report.error(
            Some(address_range),
            "Invalid listening address",
            "The 'listening_address' must be in the format 'host:port'.",
        );
        return (None, report.diagnostics);
    }

    let config = ServerConfig {
        listening_address: address,
    };
    (Some(config), report.diagnostics)
}

/// Loads configuration using the default resolution rules.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, violates a limit, or
/// parses with error diagnostics.
pub fn load(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let resolved = resolve_path(path)?;
    let bytes = read(&resolved)?;
    match parse(&resolved, &bytes) {
        (Some(config), _) => Ok(config),
        (None, diagnostics) => Err(ConfigError::Diagnostics(diagnostics)),
    }
}

/// Reads a config file, enforcing path and size limits.
///
/// # Errors
///
/// Returns [`ConfigError`] when the path is too long, the file cannot be
/// read, or it exceeds [`MAX_CONFIG_FILE_SIZE`].
pub fn read(path: &Path) -> Result<Vec<u8>, ConfigError> {
    validate_path(path)?;
    let bytes = fs::read(path)
        .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    Ok(bytes)
}

/// Resolves the config path from an explicit path, the environment, or the
/// default name.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the environment path is too long.
pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Diagnostic accumulator for one file.
struct Report {
    /// File label.
    file: String,
    /// Collected diagnostics.
    diagnostics: Diagnostics,
}

impl Report {
    /// Creates an empty report for `path`.
    fn new(path: &Path) -> Self {
        Self {
            file: path.display().to_string(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Records a diagnostic.
    fn push(&mut self, severity: Severity, range: Option<SourceRange>, summary: &str, detail: &str) {
        self.diagnostics.push(Diagnostic {
            severity,
            summary: summary.to_string(),
            detail: detail.to_string(),
            file: self.file.clone(),
            range,
        });
    }

    /// Records an error.
    fn error(&mut self, range: Option<SourceRange>, summary: &str, detail: &str) {
        self.push(Severity::Error, range, summary, detail);
    }
}

/// Warns about keys the greeter does not read.
fn report_unknown_keys(text: &str, report: &mut Report) {
    let Ok(table) = text.parse::<toml::Table>() else {
        return;
    };
    for (key, value) in &table {
        if key != SERVER_TABLE {
            warn_unknown(report, key);
            continue;
        }
        if let Some(server) = value.as_table() {
            for inner in server.keys().filter(|inner| inner.as_str() != LISTENING_ADDRESS) {
                warn_unknown(report, &format!("{SERVER_TABLE}.{inner}"));
            }
        }
    }
}

/// Records an unknown-setting warning.
fn warn_unknown(report: &mut Report, key: &str) {
    report.push(
        Severity::Warning,
        None,
        "Unknown setting",
        &format!("'{key}' is not a recognized setting and is ignored."),
    );
}

/// Returns true when `address` is `host:port` with a non-empty host and a
/// numeric port. IPv6 hosts must be bracketed.
fn is_host_port(address: &str) -> bool {
    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let Some((host, port)) = rest.split_once("]:") else {
            return false;
        };
        (host, port)
    } else {
        let Some((host, port)) = address.rsplit_once(':') else {
            return false;
        };
        if host.contains(':') {
            return false;
        }
        (host, port)
    };
    !host.is_empty() && port.parse::<u16>().is_ok() && port.bytes().all(|byte| byte.is_ascii_digit())
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
