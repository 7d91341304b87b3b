// crates/golden-harness/src/codec/tests.rs
// ============================================================================
// Module: Golden Codec Tests
// Description: Unit tests for the built-in format kinds and closure codecs.
// Purpose: Pin golden byte layouts and shape checks per format.
// Dependencies: golden-harness, serde, serde_json
// ============================================================================

//! ## Overview
//! Checks the exact bytes each format writes and that loading those bytes
//! yields the same comparable value as projecting the live result.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use super::FnCodec;
use super::FormatKind;
use super::GoldenCodec;
use super::SerdeCodec;
use crate::error::CodecError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reply {
    message: String,
    count: u32,
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Envelope {
    Greeting(Reply),
    Empty,
}

fn reply() -> Reply {
    Reply {
        message: "Hello, World".to_string(),
        count: 2,
        tags: vec!["a".to_string()],
    }
}

#[test]
fn structured_format_is_pretty_json_with_newline() {
    let codec = SerdeCodec::<Reply>::new(FormatKind::Structured);
    let bytes = codec.format(&reply()).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.ends_with("}\n"));
    assert!(text.contains("\n  \"message\": \"Hello, World\""));
    assert_eq!(codec.load(&bytes).unwrap(), codec.project(&reply()).unwrap());
}

#[test]
fn record_format_keeps_enum_variants() {
    let codec = SerdeCodec::<Envelope>::new(FormatKind::Record);
    let value = Envelope::Greeting(reply());
    let bytes = codec.format(&value).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.starts_with("Greeting("));
    assert_eq!(codec.decode(&bytes).unwrap().unwrap(), value);
    assert_eq!(codec.load(&bytes).unwrap(), json!({"Greeting": {"message": "Hello, World", "count": 2, "tags": ["a"]}}));
}

#[test]
fn record_format_loads_hand_written_goldens() {
    let codec = SerdeCodec::<Envelope>::new(FormatKind::Record);
    let golden = b"Greeting((message: \"Hi\", count: 1, tags: []))\n";
    let loaded = codec.load(golden).unwrap();
    assert_eq!(loaded, json!({"Greeting": {"message": "Hi", "count": 1, "tags": []}}));
}

#[test]
fn text_format_writes_raw_string() {
    let codec = SerdeCodec::<String>::new(FormatKind::Text);
    let bytes = codec.format(&"line one\nline two".to_string()).unwrap();
    assert_eq!(bytes, b"line one\nline two");
    assert_eq!(codec.load(&bytes).unwrap(), Value::String("line one\nline two".to_string()));
}

#[test]
fn text_format_rejects_non_string_results() {
    let codec = SerdeCodec::<Reply>::new(FormatKind::Text);
    let err = codec.format(&reply()).unwrap_err();
    assert_eq!(
        err,
        CodecError::Shape {
            kind: "text",
            expected: "string",
        }
    );
}

#[test]
fn bytes_format_writes_raw_bytes() {
    let codec = SerdeCodec::<Vec<u8>>::new(FormatKind::Bytes);
    let value = vec![0_u8, 159, 255];
    let bytes = codec.format(&value).unwrap();
    assert_eq!(bytes, value);
    assert_eq!(codec.decode(&bytes).unwrap().unwrap(), value);
}

#[test]
fn bytes_format_rejects_non_byte_results() {
    let codec = SerdeCodec::<String>::new(FormatKind::Bytes);
    let err = codec.format(&"abc".to_string()).unwrap_err();
    assert_eq!(
        err,
        CodecError::Shape {
            kind: "bytes",
            expected: "byte sequence",
        }
    );
}

#[test]
fn structured_load_reports_malformed_golden() {
    let codec = SerdeCodec::<Reply>::default();
    let err = codec.load(b"{ not json").unwrap_err();
    assert!(matches!(err, CodecError::Load(_)));
}

#[test]
fn fn_codec_delegates_to_closures() {
    let codec = FnCodec::new(
        |value: &u32| Ok(format!("{value:08}").into_bytes()),
        |bytes: &[u8]| {
            let text = std::str::from_utf8(bytes).map_err(|err| CodecError::Load(err.to_string()))?;
            text.parse::<u64>().map(Value::from).map_err(|err| CodecError::Load(err.to_string()))
        },
        |value: &u32| Ok(Value::from(*value)),
    );
    let bytes = codec.format(&42).unwrap();
    assert_eq!(bytes, b"00000042");
    assert_eq!(codec.load(&bytes).unwrap(), codec.project(&42).unwrap());
    assert!(codec.decode(&bytes).is_none());
    assert!(!codec.decodes_typed());

    let codec = codec.with_decode(|bytes: &[u8]| {
        let text = std::str::from_utf8(bytes).map_err(|err| CodecError::Load(err.to_string()))?;
        text.parse::<u32>().map_err(|err| CodecError::Load(err.to_string()))
    });
    assert!(codec.decodes_typed());
    assert_eq!(codec.decode(&bytes).unwrap().unwrap(), 42);
}
