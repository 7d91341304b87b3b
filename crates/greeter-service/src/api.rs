// crates/greeter-service/src/api.rs
// ============================================================================
// Module: Greeter API
// Description: Request, response, and status types for the greeter RPC.
// Purpose: Define the typed wire model shared by server, client, and tests.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The greeter exposes two JSON-RPC methods. [`Request`] and [`Response`] are
//! the typed envelopes a caller executes through
//! [`crate::client::GreeterClient::execute`]; RPC failures are folded into
//! [`Response::Status`] so a step sequence can record them as ordinary
//! results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JSON-RPC method for [`Request::Greet`].
pub const GREET_METHOD: &str = "greeter.greet";
/// JSON-RPC method for [`Request::ListServices`].
pub const LIST_SERVICES_METHOD: &str = "server.list_services";

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Greet call parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetRequest {
    /// Name to greet.
    pub name: String,
}

/// Greet call result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetResponse {
    /// Greeting text.
    pub message: String,
}

/// Service listing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceList {
    /// Registered service names in sorted order.
    pub services: Vec<String>,
}

/// One logical call against the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Calls `greeter.greet`.
    Greet(GreetRequest),
    /// Calls `server.list_services`.
    ListServices,
    /// Calls an arbitrary method without parameters.
    Raw {
        /// JSON-RPC method name.
        method: String,
    },
}

impl Request {
    /// Returns the JSON-RPC method this request invokes.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Greet(_) => GREET_METHOD,
            Self::ListServices => LIST_SERVICES_METHOD,
            Self::Raw {
                method,
            } => method,
        }
    }
}

/// Result of one logical call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// Greet succeeded.
    Greet(GreetResponse),
    /// Service listing succeeded.
    Services(ServiceList),
    /// The server rejected the call.
    Status(Status),
}

// ============================================================================
// SECTION: Status
// ============================================================================

/// RPC status classes.
///
/// # Invariants
/// - Each class maps to exactly one JSON-RPC error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Caller supplied an invalid argument.
    InvalidArgument,
    /// Method is not implemented.
    Unimplemented,
    /// Server-side failure.
    Internal,
    /// Referenced entity does not exist.
    NotFound,
}

impl StatusCode {
    /// Returns the JSON-RPC error code for this class.
    #[must_use]
    pub const fn rpc_code(self) -> i64 {
        match self {
            Self::InvalidArgument => -32602,
            Self::Unimplemented => -32601,
            Self::Internal => -32603,
            Self::NotFound => -32004,
        }
    }

    /// Maps a JSON-RPC error code back to a status class.
    ///
    /// Codes outside the known set are treated as [`Self::Internal`].
    #[must_use]
    pub const fn from_rpc_code(code: i64) -> Self {
        match code {
            -32602 => Self::InvalidArgument,
            -32601 => Self::Unimplemented,
            -32004 => Self::NotFound,
            _ => Self::Internal,
        }
    }

    /// Returns a stable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
            Self::NotFound => "not_found",
        }
    }
}

/// RPC failure with a class and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}: {message}", code.label())]
pub struct Status {
    /// Status class.
    pub code: StatusCode,
    /// Failure message.
    pub message: String,
}

impl Status {
    /// Builds a status.
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds an [`StatusCode::InvalidArgument`] status.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    /// Builds an [`StatusCode::Unimplemented`] status.
    #[must_use]
    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unimplemented, message)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
