// crates/golden-harness/src/rewrite.rs
// ============================================================================
// Module: Golden Rewriting
// Description: Mismatch resolution for verify and update runs.
// Purpose: Overwrite goldens in update mode; report them in verify mode.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The [`GoldenWriter`] is built once per run from the [`RunMode`] and never
//! changes during the run. Goldens are only written after a mismatch or when
//! missing, so a second update run over unchanged outputs writes nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;

use crate::config::RunMode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How a mismatch or missing golden was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The golden was overwritten with the actual output.
    Rewritten,
    /// The mismatch must be reported as a failure.
    Reported,
}

/// Resolves golden mismatches according to the run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldenWriter {
    /// Run mode fixed for the whole run.
    mode: RunMode,
}

impl GoldenWriter {
    /// Creates a writer for `mode`.
    #[must_use]
    pub const fn new(mode: RunMode) -> Self {
        Self {
            mode,
        }
    }

    /// Returns the run mode.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// Resolves a mismatch at `path` whose actual output is `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the golden cannot be written.
    pub fn resolve(&self, path: &Path, bytes: &[u8]) -> io::Result<Resolution> {
        match self.mode {
            RunMode::Verify => Ok(Resolution::Reported),
            RunMode::Update => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, bytes)?;
                Ok(Resolution::Rewritten)
            }
        }
    }
}
