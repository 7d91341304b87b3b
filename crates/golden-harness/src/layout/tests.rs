// crates/golden-harness/src/layout/tests.rs
// ============================================================================
// Module: Step Layout Tests
// Description: Unit tests for step file naming, validation, and discovery.
// Purpose: Pin the loader's rejection order and ordinal rules.
// Dependencies: golden-harness, tempfile
// ============================================================================

//! ## Overview
//! Builds scratch case directories and checks that the loader accepts dense
//! sequences and rejects everything else without returning partial lists.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use super::GoldenKind;
use super::StepLayout;
use super::discover_cases;
use super::load_step_files;
use crate::error::SequenceError;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn layout() -> StepLayout {
    StepLayout::new("json", "json", Some("txt"))
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture file");
}

// ============================================================================
// SECTION: Naming Tests
// ============================================================================

#[test]
fn golden_names_follow_ordinal_and_extension() {
    let layout = layout();
    assert_eq!(layout.input_suffix(), ".in.json");
    assert_eq!(layout.golden_name(3, GoldenKind::Success).as_deref(), Some("3.out.json"));
    assert_eq!(layout.golden_name(2, GoldenKind::Error).as_deref(), Some("2.out.txt"));
}

#[test]
fn error_golden_requires_error_extension() {
    let layout = StepLayout::new("json", "json", None);
    assert_eq!(layout.golden_name(1, GoldenKind::Error), None);
    assert!(layout.is_golden("1.out.json"));
    assert!(!layout.is_golden("1.out.txt"));
}

// ============================================================================
// SECTION: Loader Tests
// ============================================================================

#[test]
fn loads_dense_sequence_in_ordinal_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    for ordinal in [10, 2, 1, 3, 4, 5, 6, 7, 8, 9] {
        write(dir.path(), &format!("{ordinal}.in.json"), &format!("{{\"n\":{ordinal}}}"));
    }
    write(dir.path(), "1.out.json", "{}");
    write(dir.path(), "10.out.txt", "boom");

    let steps = load_step_files(dir.path(), &layout()).expect("load steps");
    let ordinals: Vec<u32> = steps.iter().map(|step| step.ordinal).collect();
    assert_eq!(ordinals, (1 ..= 10).collect::<Vec<_>>());
    assert_eq!(steps[9].text().expect("utf8"), "{\"n\":10}");
    assert_eq!(steps[0].path, dir.path().join("1.in.json"));
}

#[test]
fn rejects_gap_naming_first_missing_ordinal() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "1.in.json", "{}");
    write(dir.path(), "3.in.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("gap must fail");
    assert_eq!(
        err,
        SequenceError::SequenceGap {
            expected: 2,
            found: 3,
        }
    );
}

#[test]
fn rejects_sequence_not_starting_at_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "2.in.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("must start at 1");
    assert_eq!(
        err,
        SequenceError::SequenceGap {
            expected: 1,
            found: 2,
        }
    );
}

#[test]
fn rejects_zero_ordinal() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "0.in.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("zero must fail");
    assert!(matches!(err, SequenceError::NonPositiveOrdinal { ordinal: 0, .. }));
}

#[test]
fn rejects_negative_ordinal() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "-1.in.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("negative must fail");
    assert!(matches!(err, SequenceError::NonPositiveOrdinal { ordinal: -1, .. }));
}

#[test]
fn rejects_non_numeric_ordinal() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "first.in.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("name must fail");
    assert_eq!(err.to_string(), "invalid step filename first.in.json: must be a number");
}

#[test]
fn rejects_ordinal_beyond_u32() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "4294967296.in.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("overflow must fail");
    assert!(matches!(err, SequenceError::OrdinalOutOfRange { .. }));
}

#[test]
fn rejects_duplicate_ordinals() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "1.in.json", "{}");
    write(dir.path(), "01.in.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("duplicate must fail");
    assert_eq!(
        err,
        SequenceError::DuplicateOrdinal {
            ordinal: 1,
            first: "01.in.json".to_string(),
            second: "1.in.json".to_string(),
        }
    );
}

#[test]
fn rejects_wrong_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "1.in.json", "{}");
    write(dir.path(), "notes.md", "stray");

    let err = load_step_files(dir.path(), &layout()).expect_err("stray file must fail");
    assert_eq!(
        err,
        SequenceError::MalformedEntry {
            name: "notes.md".to_string(),
            expected: ".in.json".to_string(),
        }
    );
}

#[test]
fn rejects_subdirectory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "1.in.json", "{}");
    fs::create_dir(dir.path().join("nested")).expect("mkdir");

    let err = load_step_files(dir.path(), &layout()).expect_err("subdirectory must fail");
    assert_eq!(
        err,
        SequenceError::UnexpectedDirectory {
            name: "nested".to_string(),
        }
    );
}

#[test]
fn rejects_directory_with_only_goldens() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "1.out.json", "{}");

    let err = load_step_files(dir.path(), &layout()).expect_err("empty must fail");
    assert_eq!(err, SequenceError::Empty);
}

// ============================================================================
// SECTION: Discovery Tests
// ============================================================================

#[test]
fn discovery_lists_directories_sorted_and_skips_files() {
    let root = tempfile::tempdir().expect("tempdir");
    for name in ["b_case", "a_case", "error_case"] {
        fs::create_dir(root.path().join(name)).expect("mkdir");
    }
    write(root.path(), "README.md", "ignored");

    let cases = discover_cases(root.path()).expect("discover");
    let names: Vec<&str> = cases.iter().map(|case| case.name.as_str()).collect();
    assert_eq!(names, ["a_case", "b_case", "error_case"]);
    assert_eq!(cases[0].dir, root.path().join("a_case"));
}

#[test]
fn discovery_reports_missing_root() {
    let root = tempfile::tempdir().expect("tempdir");
    let missing = root.path().join("absent");
    let err = discover_cases(&missing).expect_err("missing root must fail");
    assert!(err.to_string().starts_with("failed to read test root"));
}
