// crates/golden-harness/src/layout.rs
// ============================================================================
// Module: Step Layout
// Description: Case discovery and numbered step file validation.
// Purpose: Turn a case directory into a dense, ordered list of step inputs.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A test root holds one directory per case. Each case directory holds
//! numbered inputs (`1.in.<ext>`, `2.in.<ext>`, ...) next to their goldens
//! (`1.out.<ext>`). [`load_step_files`] validates names and density before
//! reading any file content, so a failing directory never yields a partial
//! list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::error::HarnessError;
use crate::error::SequenceError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Marker segment between ordinal and extension for step inputs.
pub const INPUT_MARKER: &str = "in";
/// Marker segment between ordinal and extension for golden outputs.
pub const OUTPUT_MARKER: &str = "out";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A discovered test case directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Directory name; drives failure classification.
    pub name: String,
    /// Full directory path.
    pub dir: PathBuf,
}

/// One numbered step input.
///
/// # Invariants
/// - `ordinal` is at least 1 and unique within its case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFile {
    /// 1-based step number.
    pub ordinal: u32,
    /// Full path of the input file.
    pub path: PathBuf,
    /// Raw file content.
    pub data: Vec<u8>,
}

impl StepFile {
    /// Returns the content as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`std::str::Utf8Error`] when the file is not valid UTF-8.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }
}

/// Which golden artifact a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldenKind {
    /// Per-step success output.
    Success,
    /// Terminal error output.
    Error,
}

/// File naming scheme for one harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLayout {
    /// Input suffix, for example `.in.ron`.
    input_suffix: String,
    /// Success golden suffix, for example `.out.ron`.
    success_suffix: String,
    /// Error golden suffix when error handling is configured.
    error_suffix: Option<String>,
}

impl StepLayout {
    /// Builds a layout from bare extensions (no leading dot).
    #[must_use]
    pub fn new(input_ext: &str, success_ext: &str, error_ext: Option<&str>) -> Self {
        Self {
            input_suffix: format!(".{INPUT_MARKER}.{input_ext}"),
            success_suffix: format!(".{OUTPUT_MARKER}.{success_ext}"),
            error_suffix: error_ext.map(|ext| format!(".{OUTPUT_MARKER}.{ext}")),
        }
    }

    /// Returns the input suffix.
    #[must_use]
    pub fn input_suffix(&self) -> &str {
        &self.input_suffix
    }

    /// Returns true when `name` is one of the configured golden outputs.
    #[must_use]
    pub fn is_golden(&self, name: &str) -> bool {
        name.ends_with(&self.success_suffix)
            || self.error_suffix.as_deref().is_some_and(|suffix| name.ends_with(suffix))
    }

    /// Returns the golden file name for an ordinal, or `None` when the error
    /// golden is requested without error handling.
    #[must_use]
    pub fn golden_name(&self, ordinal: u32, kind: GoldenKind) -> Option<String> {
        let suffix = match kind {
            GoldenKind::Success => Some(self.success_suffix.as_str()),
            GoldenKind::Error => self.error_suffix.as_deref(),
        }?;
        Some(format!("{ordinal}{suffix}"))
    }

    /// Returns the golden path inside `dir` for an ordinal.
    #[must_use]
    pub fn golden_path(&self, dir: &Path, ordinal: u32, kind: GoldenKind) -> Option<PathBuf> {
        self.golden_name(ordinal, kind).map(|name| dir.join(name))
    }
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Lists case directories under `root`, sorted by name.
///
/// Plain files at the root are ignored.
///
/// # Errors
///
/// Returns [`HarnessError::RootUnreadable`] when the root cannot be listed.
pub fn discover_cases(root: &Path) -> Result<Vec<TestCase>, HarnessError> {
    let unreadable = |err: std::io::Error| HarnessError::RootUnreadable {
        path: root.to_path_buf(),
        message: err.to_string(),
    };
    let mut cases = Vec::new();
    for entry in fs::read_dir(root).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        if !entry.file_type().map_err(unreadable)?.is_dir() {
            continue;
        }
        cases.push(TestCase {
            name: entry.file_name().to_string_lossy().into_owned(),
            dir: entry.path(),
        });
    }
    cases.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(cases)
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Validates a case directory and loads its step files in ordinal order.
///
/// # Errors
///
/// Returns the first [`SequenceError`] found: unreadable entries, stray
/// subdirectories or extensions, bad or duplicate ordinals, gaps, or an empty
/// directory.
pub fn load_step_files(dir: &Path, layout: &StepLayout) -> Result<Vec<StepFile>, SequenceError> {
    let io_error = |err: std::io::Error| SequenceError::Io {
        path: dir.to_path_buf(),
        message: err.to_string(),
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let is_dir = entry.file_type().map_err(io_error)?.is_dir();
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    entries.sort();

    let mut ordinals: BTreeMap<u32, String> = BTreeMap::new();
    for (name, is_dir) in entries {
        if is_dir {
            return Err(SequenceError::UnexpectedDirectory {
                name,
            });
        }
        if layout.is_golden(&name) {
            continue;
        }
        let ordinal = parse_ordinal(&name, layout.input_suffix())?;
        if let Some(first) = ordinals.get(&ordinal) {
            return Err(SequenceError::DuplicateOrdinal {
                ordinal,
                first: first.clone(),
                second: name,
            });
        }
        ordinals.insert(ordinal, name);
    }

    if ordinals.is_empty() {
        return Err(SequenceError::Empty);
    }
    let mut expected: u32 = 1;
    for &found in ordinals.keys() {
        if found != expected {
            return Err(SequenceError::SequenceGap {
                expected,
                found,
            });
        }
        expected = expected.saturating_add(1);
    }

    let mut steps = Vec::with_capacity(ordinals.len());
    for (ordinal, name) in ordinals {
        let path = dir.join(&name);
        let data = fs::read(&path).map_err(|err| SequenceError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;
        steps.push(StepFile {
            ordinal,
            path,
            data,
        });
    }
    Ok(steps)
}

/// Parses the ordinal prefix of an input file name.
fn parse_ordinal(name: &str, input_suffix: &str) -> Result<u32, SequenceError> {
    let Some(stem) = name.strip_suffix(input_suffix) else {
        return Err(SequenceError::MalformedEntry {
            name: name.to_string(),
            expected: input_suffix.to_string(),
        });
    };
    let value: i64 = stem.parse().map_err(|_| SequenceError::NonNumericOrdinal {
        name: name.to_string(),
    })?;
    if value <= 0 {
        return Err(SequenceError::NonPositiveOrdinal {
            name: name.to_string(),
            ordinal: value,
        });
    }
    u32::try_from(value).map_err(|_| SequenceError::OrdinalOutOfRange {
        name: name.to_string(),
        ordinal: value,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
