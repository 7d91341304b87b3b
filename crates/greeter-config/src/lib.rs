// crates/greeter-config/src/lib.rs
// ============================================================================
// Module: Greeter Config
// Description: Configuration parsing for the greeter server.
// Purpose: Expose the greeter.toml parser, loader, and diagnostics.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! `greeter.toml` holds a single `[server]` table:
//!
//! ```toml
//! [server]
//! listening_address = "127.0.0.1:8080"
//! ```
//!
//! [`parse`] reports every finding as a [`Diagnostic`]; [`load`] resolves
//! the file location and fails when any error diagnostic is produced.

pub mod config;
pub mod diagnostics;

pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::MAX_CONFIG_FILE_SIZE;
pub use config::ServerConfig;
pub use config::load;
pub use config::parse;
pub use config::read;
pub use config::resolve_path;
pub use diagnostics::Diagnostic;
pub use diagnostics::Diagnostics;
pub use diagnostics::Position;
pub use diagnostics::Severity;
pub use diagnostics::SourceRange;
