// crates/golden-harness/src/codec.rs
// ============================================================================
// Module: Golden Codecs
// Description: Format and load strategies for golden artifacts.
// Purpose: Turn results into stored bytes and stored bytes into comparable values.
// Dependencies: ron, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`GoldenCodec`] formats a result into golden bytes, loads golden bytes
//! into a comparable [`serde_json::Value`], and projects a live result into
//! the same value space. [`SerdeCodec`] covers the closed [`FormatKind`] set;
//! [`FnCodec`] wraps caller closures for anything else.
//!
//! Format kinds are chosen explicitly by the caller and never inferred from
//! the result type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::marker::PhantomData;
use std::sync::Arc;

use ron::ser::PrettyConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CodecError;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Paired serialize/deserialize strategy for one result type.
pub trait GoldenCodec<T>: Send + Sync {
    /// Formats a result into golden bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the result cannot be formatted.
    fn format(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Loads golden bytes into a comparable value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the bytes do not decode.
    fn load(&self, bytes: &[u8]) -> Result<Value, CodecError>;

    /// Projects a live result into the comparable value space.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the result cannot be projected.
    fn project(&self, value: &T) -> Result<Value, CodecError>;

    /// Decodes golden bytes back into a typed result, when supported.
    fn decode(&self, _bytes: &[u8]) -> Option<Result<T, CodecError>> {
        None
    }

    /// Returns true when [`GoldenCodec::decode`] yields typed results.
    fn decodes_typed(&self) -> bool {
        false
    }
}

// ============================================================================
// SECTION: Serde Codec
// ============================================================================

/// Default format strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatKind {
    /// Raw UTF-8 text; the result must serialize to a string.
    Text,
    /// Raw bytes; the result must serialize to a byte sequence.
    Bytes,
    /// Typed record messages in RON.
    Record,
    /// Pretty-printed JSON.
    #[default]
    Structured,
}

impl FormatKind {
    /// Returns a stable label for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Record => "record",
            Self::Structured => "structured",
        }
    }
}

/// Serde-backed codec over [`FormatKind`].
pub struct SerdeCodec<T> {
    /// Selected format.
    kind: FormatKind,
    /// Result type marker.
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeCodec<T> {
    /// Creates a codec for `kind`.
    #[must_use]
    pub const fn new(kind: FormatKind) -> Self {
        Self {
            kind,
            _marker: PhantomData,
        }
    }

    /// Returns the selected format.
    #[must_use]
    pub const fn kind(&self) -> FormatKind {
        self.kind
    }
}

impl<T> Default for SerdeCodec<T> {
    fn default() -> Self {
        Self::new(FormatKind::default())
    }
}

impl<T> GoldenCodec<T> for SerdeCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn format(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self.kind {
            FormatKind::Text => match self.project(value)? {
                Value::String(text) => Ok(text.into_bytes()),
                _ => Err(self.shape_error()),
            },
            FormatKind::Bytes => {
                bytes_from_value(&self.project(value)?).ok_or_else(|| self.shape_error())
            }
            FormatKind::Record => {
                let mut text = ron::ser::to_string_pretty(value, PrettyConfig::default())
                    .map_err(|err| CodecError::Format(err.to_string()))?;
                text.push('\n');
                Ok(text.into_bytes())
            }
            FormatKind::Structured => {
                let mut bytes = serde_json::to_vec_pretty(value)
                    .map_err(|err| CodecError::Format(err.to_string()))?;
                bytes.push(b'\n');
                Ok(bytes)
            }
        }
    }

    fn load(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        match self.kind {
            FormatKind::Text => {
                let text =
                    std::str::from_utf8(bytes).map_err(|err| CodecError::Load(err.to_string()))?;
                Ok(Value::String(text.to_string()))
            }
            FormatKind::Bytes => {
                Ok(Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect()))
            }
            FormatKind::Record | FormatKind::Structured => {
                let decoded = self.decode_typed(bytes)?;
                self.project(&decoded)
            }
        }
    }

    fn project(&self, value: &T) -> Result<Value, CodecError> {
        serde_json::to_value(value).map_err(|err| CodecError::Projection(err.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Option<Result<T, CodecError>> {
        Some(self.decode_typed(bytes))
    }

    fn decodes_typed(&self) -> bool {
        true
    }
}

impl<T> SerdeCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Decodes golden bytes into `T` according to the format.
    fn decode_typed(&self, bytes: &[u8]) -> Result<T, CodecError> {
        match self.kind {
            FormatKind::Text | FormatKind::Bytes => {
                let value = self.load(bytes)?;
                serde_json::from_value(value).map_err(|err| CodecError::Load(err.to_string()))
            }
            FormatKind::Record => {
                let text =
                    std::str::from_utf8(bytes).map_err(|err| CodecError::Load(err.to_string()))?;
                ron::from_str(text).map_err(|err| CodecError::Load(err.to_string()))
            }
            FormatKind::Structured => {
                serde_json::from_slice(bytes).map_err(|err| CodecError::Load(err.to_string()))
            }
        }
    }

    /// Builds the shape error for text and byte formats.
    const fn shape_error(&self) -> CodecError {
        CodecError::Shape {
            kind: self.kind.label(),
            expected: match self.kind {
                FormatKind::Bytes => "byte sequence",
                _ => "string",
            },
        }
    }
}

/// Reads a JSON array of integers in `0..=255` as raw bytes.
fn bytes_from_value(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_u64().and_then(|byte| u8::try_from(byte).ok()))
        .collect()
}

// ============================================================================
// SECTION: Closure Codec
// ============================================================================

/// Format closure.
pub type FormatFn<T> = Arc<dyn Fn(&T) -> Result<Vec<u8>, CodecError> + Send + Sync>;
/// Load closure.
pub type LoadFn = Arc<dyn Fn(&[u8]) -> Result<Value, CodecError> + Send + Sync>;
/// Projection closure.
pub type ProjectFn<T> = Arc<dyn Fn(&T) -> Result<Value, CodecError> + Send + Sync>;
/// Typed decode closure.
pub type DecodeFn<T> = Arc<dyn Fn(&[u8]) -> Result<T, CodecError> + Send + Sync>;

/// Codec assembled from caller-supplied closures.
pub struct FnCodec<T> {
    /// Format closure.
    format: FormatFn<T>,
    /// Load closure.
    load: LoadFn,
    /// Projection closure.
    project: ProjectFn<T>,
    /// Typed decode closure, required for semantic equality hooks.
    decode: Option<DecodeFn<T>>,
}

impl<T> FnCodec<T> {
    /// Creates a codec from format, load, and projection closures.
    pub fn new<Fo, Lo, Pr>(format: Fo, load: Lo, project: Pr) -> Self
    where
        Fo: Fn(&T) -> Result<Vec<u8>, CodecError> + Send + Sync + 'static,
        Lo: Fn(&[u8]) -> Result<Value, CodecError> + Send + Sync + 'static,
        Pr: Fn(&T) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        Self {
            format: Arc::new(format),
            load: Arc::new(load),
            project: Arc::new(project),
            decode: None,
        }
    }

    /// Adds a typed decode closure so semantic equality hooks can run.
    #[must_use]
    pub fn with_decode<De>(mut self, decode: De) -> Self
    where
        De: Fn(&[u8]) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(decode));
        self
    }
}

impl<T> GoldenCodec<T> for FnCodec<T> {
    fn format(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        (self.format)(value)
    }

    fn load(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        (self.load)(bytes)
    }

    fn project(&self, value: &T) -> Result<Value, CodecError> {
        (self.project)(value)
    }

    fn decode(&self, bytes: &[u8]) -> Option<Result<T, CodecError>> {
        self.decode.as_ref().map(|decode| decode(bytes))
    }

    fn decodes_typed(&self) -> bool {
        self.decode.is_some()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
