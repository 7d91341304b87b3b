// crates/greeter-service/src/client.rs
// ============================================================================
// Module: Greeter Client
// Description: Typed JSON-RPC client for the greeter server.
// Purpose: Issue greet and listing calls over HTTP.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`GreeterClient`] speaks JSON-RPC 2.0 to a [`crate::server::GreeterServer`].
//! The typed calls return RPC failures as [`ClientError::Status`];
//! [`GreeterClient::execute`] instead folds them into
//! [`Response::Status`] and only errors on transport or protocol failures.
//!
//! Security posture: server responses are untrusted; bodies are size-limited
//! and parse failures fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::api::GREET_METHOD;
use crate::api::GreetRequest;
use crate::api::GreetResponse;
use crate::api::LIST_SERVICES_METHOD;
use crate::api::Request;
use crate::api::Response;
use crate::api::ServiceList;
use crate::api::Status;
use crate::api::StatusCode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body size accepted by the client.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Greeter client errors.
///
/// # Invariants
/// - Only [`ClientError::Status`] carries a server-side verdict; every other
///   variant means the call did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Client configuration is invalid.
    #[error("client config error: {0}")]
    Config(String),
    /// The request could not be delivered or the response not read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response is not a valid JSON-RPC envelope.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The response exceeds the size limit.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
    /// The server rejected the call.
    #[error("{0}")]
    Status(Status),
}

// ============================================================================
// SECTION: JSON-RPC Structures
// ============================================================================

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    /// JSON-RPC version tag.
    jsonrpc: &'static str,
    /// Request identifier.
    id: u64,
    /// Method name to invoke.
    method: &'a str,
    /// Optional parameters payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// Optional result payload.
    result: Option<Value>,
    /// Optional error payload.
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Error message provided by the server.
    message: String,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Greeter JSON-RPC client.
#[derive(Debug)]
pub struct GreeterClient {
    /// HTTP client.
    http: Client,
    /// Full `/rpc` endpoint URL.
    endpoint: String,
    /// Next JSON-RPC request identifier.
    next_id: AtomicU64,
}

impl GreeterClient {
    /// Creates a client for the server at `base_url` (for example
    /// `http://127.0.0.1:8080`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the URL is empty or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(ClientError::Config("server url must not be empty".to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ClientError::Config(format!("http client build failed: {err}")))?;
        Ok(Self {
            http,
            endpoint: format!("{base}/rpc"),
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the `/rpc` endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Calls `greeter.greet`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] when the server rejects the name, or
    /// another [`ClientError`] when the call does not complete.
    pub async fn greet(&self, request: &GreetRequest) -> Result<GreetResponse, ClientError> {
        let params = serde_json::to_value(request)
            .map_err(|err| ClientError::Protocol(format!("invalid greet params: {err}")))?;
        self.call(GREET_METHOD, Some(params)).await
    }

    /// Calls `server.list_services`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub async fn list_services(&self) -> Result<ServiceList, ClientError> {
        self.call(LIST_SERVICES_METHOD, None).await
    }

    /// Executes one logical call, folding RPC failures into
    /// [`Response::Status`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for transport and protocol failures only.
    pub async fn execute(&self, request: &Request) -> Result<Response, ClientError> {
        let outcome = match request {
            Request::Greet(greet) => self.greet(greet).await.map(Response::Greet),
            Request::ListServices => self.list_services().await.map(Response::Services),
            Request::Raw {
                method,
            } => self.call::<Value>(method, None).await.map(|_| {
                Response::Status(Status::new(
                    StatusCode::Internal,
                    format!("method {method} returned an untyped result"),
                ))
            }),
        };
        match outcome {
            Err(ClientError::Status(status)) => Ok(Response::Status(status)),
            other => other,
        }
    }

    /// Sends one JSON-RPC call and decodes its result as `T`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, ClientError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| ClientError::Transport(format!("{method} request failed: {err}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::Transport(format!("{method} response failed: {err}")))?;
        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(ClientError::ResponseTooLarge {
                actual: bytes.len(),
                limit: MAX_RESPONSE_BYTES,
            });
        }
        decode_response(method, &bytes)
    }
}

/// Decodes a JSON-RPC response body into a typed result or status error.
fn decode_response<T: DeserializeOwned>(method: &str, bytes: &[u8]) -> Result<T, ClientError> {
    let envelope: JsonRpcResponse = serde_json::from_slice(bytes)
        .map_err(|err| ClientError::Protocol(format!("invalid {method} response: {err}")))?;
    if let Some(error) = envelope.error {
        return Err(ClientError::Status(Status::new(
            StatusCode::from_rpc_code(error.code),
            error.message,
        )));
    }
    let result = envelope
        .result
        .ok_or_else(|| ClientError::Protocol(format!("missing result in {method} response")))?;
    serde_json::from_value(result)
        .map_err(|err| ClientError::Protocol(format!("invalid {method} payload: {err}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
