// crates/golden-harness/src/compare.rs
// ============================================================================
// Module: Structural Comparison
// Description: Value diffing with equivalence rules and readable output.
// Purpose: Decide whether a result matches its golden and explain why not.
// Dependencies: difference, serde_json
// ============================================================================

//! ## Overview
//! Expected and actual values are walked in parallel. At every path the
//! configured [`EquivalenceRule`]s are consulted first, then the empty
//! equivalence (absent, `null`, `[]` and `{}` compare equal), then plain
//! equality. Objects and arrays recurse; every other leaf that differs
//! becomes one entry of the resulting [`Difference`].
//!
//! Multi-line strings and error goldens are rendered as line diffs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use difference::Changeset;
use difference::Difference as LineChange;
use serde_json::Value;

use crate::codec::GoldenCodec;
use crate::error::CodecError;

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Extra equivalence consulted before structural comparison.
pub trait EquivalenceRule: Send + Sync {
    /// Stable rule name for diagnostics.
    fn name(&self) -> &'static str;

    /// Returns true when the values at `path` are equivalent. Either side may
    /// be absent.
    fn equivalent(&self, path: &str, expected: Option<&Value>, actual: Option<&Value>) -> bool;
}

/// Treats the named fields as equal wherever they appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreFields {
    /// Field names to ignore.
    fields: BTreeSet<String>,
}

impl IgnoreFields {
    /// Creates the rule from field names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl EquivalenceRule for IgnoreFields {
    fn name(&self) -> &'static str {
        "ignore_fields"
    }

    fn equivalent(&self, path: &str, _expected: Option<&Value>, _actual: Option<&Value>) -> bool {
        path.rsplit_once('.').is_some_and(|(_, field)| self.fields.contains(field))
    }
}

/// Treats numbers within an absolute tolerance as equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatTolerance {
    /// Maximum absolute difference.
    epsilon: f64,
}

impl FloatTolerance {
    /// Creates the rule with an absolute tolerance.
    #[must_use]
    pub const fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
        }
    }
}

impl EquivalenceRule for FloatTolerance {
    fn name(&self) -> &'static str {
        "float_tolerance"
    }

    fn equivalent(&self, _path: &str, expected: Option<&Value>, actual: Option<&Value>) -> bool {
        match (expected.and_then(Value::as_f64), actual.and_then(Value::as_f64)) {
            (Some(expected), Some(actual)) => (expected - actual).abs() <= self.epsilon,
            _ => false,
        }
    }
}

/// Treats strings that differ only in trailing whitespace as equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimTrailingWhitespace;

impl EquivalenceRule for TrimTrailingWhitespace {
    fn name(&self) -> &'static str {
        "trim_trailing_whitespace"
    }

    fn equivalent(&self, _path: &str, expected: Option<&Value>, actual: Option<&Value>) -> bool {
        match (expected.and_then(Value::as_str), actual.and_then(Value::as_str)) {
            (Some(expected), Some(actual)) => expected.trim_end() == actual.trim_end(),
            _ => false,
        }
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Typed equality hook for result types.
pub type SemanticEq<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Returns a [`SemanticEq`] backed by `PartialEq`.
#[must_use]
pub fn semantic_equality<T: PartialEq + 'static>() -> SemanticEq<T> {
    Arc::new(|expected: &T, actual: &T| expected == actual)
}

/// Comparison options for one result type.
pub struct CompareOptions<T> {
    /// Absent and empty containers compare equal.
    pub equate_empty: bool,
    /// Extra equivalence rules, consulted in order.
    pub rules: Vec<Arc<dyn EquivalenceRule>>,
    /// Typed equality consulted before structural comparison.
    pub semantic_eq: Option<SemanticEq<T>>,
}

impl<T> Default for CompareOptions<T> {
    fn default() -> Self {
        Self {
            equate_empty: true,
            rules: Vec::new(),
            semantic_eq: None,
        }
    }
}

impl<T> CompareOptions<T> {
    /// Adds an equivalence rule.
    #[must_use]
    pub fn with_rule(mut self, rule: impl EquivalenceRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the typed equality hook.
    #[must_use]
    pub fn with_semantic_eq(mut self, semantic_eq: SemanticEq<T>) -> Self {
        self.semantic_eq = Some(semantic_eq);
        self
    }

    /// Enables or disables the empty equivalence.
    #[must_use]
    pub const fn with_equate_empty(mut self, equate_empty: bool) -> Self {
        self.equate_empty = equate_empty;
        self
    }
}

// ============================================================================
// SECTION: Differences
// ============================================================================

/// One differing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDiff {
    /// Value path, rooted at `$`.
    pub path: String,
    /// Expected value; `None` when absent.
    pub expected: Option<Value>,
    /// Actual value; `None` when absent.
    pub actual: Option<Value>,
}

/// Body of a difference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DiffBody {
    /// Structural differences by path.
    Paths(Vec<PathDiff>),
    /// Line diff of two texts.
    Text {
        /// Expected text.
        expected: String,
        /// Actual text.
        actual: String,
    },
}

/// Mismatch between a golden and an actual value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Golden file compared against.
    golden: PathBuf,
    /// Difference body.
    body: DiffBody,
}

impl Difference {
    /// Returns the golden path.
    #[must_use]
    pub fn golden(&self) -> &Path {
        &self.golden
    }

    /// Returns the differing paths of a structural difference.
    #[must_use]
    pub fn paths(&self) -> &[PathDiff] {
        match &self.body {
            DiffBody::Paths(paths) => paths,
            DiffBody::Text {
                ..
            } => &[],
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mismatch against golden file {} (-expected +actual):", self.golden.display())?;
        match &self.body {
            DiffBody::Paths(paths) => {
                for entry in paths {
                    write!(f, "\n  {}:", entry.path)?;
                    match (&entry.expected, &entry.actual) {
                        (Some(Value::String(expected)), Some(Value::String(actual)))
                            if expected.contains('\n') || actual.contains('\n') =>
                        {
                            f.write_str(&line_diff(expected, actual, "    "))?;
                        }
                        (expected, actual) => {
                            write!(f, "\n    - {}", render_value(expected.as_ref()))?;
                            write!(f, "\n    + {}", render_value(actual.as_ref()))?;
                        }
                    }
                }
                Ok(())
            }
            DiffBody::Text {
                expected,
                actual,
            } => f.write_str(&line_diff(expected, actual, "  ")),
        }
    }
}

/// Renders one side of a leaf difference.
fn render_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "<absent>".to_string(), Value::to_string)
}

/// Renders a line diff, one prefixed line per output line.
#[must_use]
pub fn line_diff(expected: &str, actual: &str, indent: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut out = String::new();
    for change in &changeset.diffs {
        let (marker, text) = match change {
            LineChange::Same(text) => (' ', text),
            LineChange::Rem(text) => ('-', text),
            LineChange::Add(text) => ('+', text),
        };
        for line in text.split('\n') {
            let _ = write!(out, "\n{indent}{marker} {line}");
        }
    }
    out
}

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Compares golden bytes against a live result.
///
/// # Errors
///
/// Returns [`CodecError`] when the golden cannot be loaded or the result
/// cannot be projected.
pub fn compare<T>(
    golden: &Path,
    golden_bytes: &[u8],
    actual: &T,
    codec: &dyn GoldenCodec<T>,
    options: &CompareOptions<T>,
) -> Result<Option<Difference>, CodecError> {
    let semantic = match (&options.semantic_eq, codec.decode(golden_bytes)) {
        (Some(semantic_eq), Some(decoded)) => Some(semantic_eq(&decoded?, actual)),
        _ => None,
    };
    if semantic == Some(true) {
        return Ok(None);
    }

    let expected = codec.load(golden_bytes)?;
    let projected = codec.project(actual)?;
    let mut paths = diff_values(&expected, &projected, options);
    if paths.is_empty() && semantic == Some(false) {
        paths.push(PathDiff {
            path: "$".to_string(),
            expected: Some(expected),
            actual: Some(projected),
        });
    }
    if paths.is_empty() {
        return Ok(None);
    }
    Ok(Some(Difference {
        golden: golden.to_path_buf(),
        body: DiffBody::Paths(paths),
    }))
}

/// Compares golden bytes against actual bytes exactly.
#[must_use]
pub fn compare_bytes(golden: &Path, expected: &[u8], actual: &[u8]) -> Option<Difference> {
    if expected == actual {
        return None;
    }
    Some(Difference {
        golden: golden.to_path_buf(),
        body: DiffBody::Text {
            expected: String::from_utf8_lossy(expected).into_owned(),
            actual: String::from_utf8_lossy(actual).into_owned(),
        },
    })
}

/// Returns every differing path between two values.
#[must_use]
pub fn diff_values<T>(expected: &Value, actual: &Value, options: &CompareOptions<T>) -> Vec<PathDiff> {
    let mut out = Vec::new();
    walk("$", Some(expected), Some(actual), options, &mut out);
    out
}

/// Walks one path of both values.
fn walk<T>(
    path: &str,
    expected: Option<&Value>,
    actual: Option<&Value>,
    options: &CompareOptions<T>,
    out: &mut Vec<PathDiff>,
) {
    if options.rules.iter().any(|rule| rule.equivalent(path, expected, actual)) {
        return;
    }
    if options.equate_empty && is_empty(expected) && is_empty(actual) {
        return;
    }
    match (expected, actual) {
        (Some(Value::Object(expected)), Some(Value::Object(actual))) => {
            let keys: BTreeSet<&String> = expected.keys().chain(actual.keys()).collect();
            for key in keys {
                walk(&format!("{path}.{key}"), expected.get(key), actual.get(key), options, out);
            }
        }
        (Some(Value::Array(expected)), Some(Value::Array(actual))) => {
            for index in 0 .. expected.len().max(actual.len()) {
                walk(
                    &format!("{path}[{index}]"),
                    expected.get(index),
                    actual.get(index),
                    options,
                    out,
                );
            }
        }
        (expected, actual) if expected == actual => {}
        (expected, actual) => out.push(PathDiff {
            path: path.to_string(),
            expected: expected.cloned(),
            actual: actual.cloned(),
        }),
    }
}

/// Returns true for absent, `null`, `[]` and `{}`.
fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(_) => false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
