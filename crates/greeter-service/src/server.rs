// crates/greeter-service/src/server.rs
// ============================================================================
// Module: Greeter Server
// Description: JSON-RPC 2.0 over HTTP for the greeter service.
// Purpose: Expose the greeter and the service listing on `POST /rpc`.
// Dependencies: axum, serde_json, tokio, tokio-util
// ============================================================================

//! ## Overview
//! [`GreeterServer`] routes `POST /rpc` requests to
//! [`HelloWorldService`] and answers `server.list_services` with the
//! registered service names. Service failures travel as JSON-RPC error
//! objects whose codes map onto [`crate::api::StatusCode`]. Serving stops
//! gracefully when the shutdown token is cancelled.
//!
//! Security posture: request bodies are untrusted; they are size-checked
//! before parsing and never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::StatusCode as HttpStatus;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api::GREET_METHOD;
use crate::api::GreetRequest;
use crate::api::LIST_SERVICES_METHOD;
use crate::api::ServiceList;
use crate::api::Status;
use crate::api::StatusCode;
use crate::audit::NoopAuditSink;
use crate::audit::RpcAuditEvent;
use crate::audit::RpcAuditSink;
use crate::service::HelloWorldService;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum request body size.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Service name of the listing endpoint.
pub const REFLECTION_SERVICE: &str = "server.v1.Reflection";

/// JSON-RPC code for oversized request bodies.
const BODY_TOO_LARGE_CODE: i64 = -32070;

/// JSON-RPC code for malformed requests.
const INVALID_REQUEST_CODE: i64 = -32600;

/// Fallback payload when a response cannot be serialized.
const SERIALIZATION_FAILED: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"serialization failed"}}"#;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Binding the listener failed.
    #[error("failed to bind {addr}: {message}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying I/O error text.
        message: String,
    },
    /// The server stopped with an error.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Greeter JSON-RPC server.
pub struct GreeterServer {
    /// Greeting logic.
    service: HelloWorldService,
    /// Per-request audit sink.
    audit: Arc<dyn RpcAuditSink>,
    /// Maximum request body size.
    max_body_bytes: usize,
}

impl GreeterServer {
    /// Builds a server with a no-op audit sink and the default body limit.
    #[must_use]
    pub fn new(service: HelloWorldService) -> Self {
        Self {
            service,
            audit: Arc::new(NoopAuditSink),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn RpcAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the request body limit.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Builds the axum router serving `POST /rpc`.
    pub fn router(self) -> Router {
        let state = Arc::new(ServerState {
            service: self.service,
            audit: self.audit,
            max_body_bytes: self.max_body_bytes,
        });
        Router::new().route("/rpc", post(handle_rpc)).with_state(state)
    }

    /// Serves on `listener` until `shutdown` is cancelled, then drains
    /// in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when the server fails.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Binds a TCP listener on `addr`.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] when the address cannot be bound.
pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr).await.map_err(|err| ServerError::Bind {
        addr: addr.to_string(),
        message: err.to_string(),
    })
}

/// Returns the registered service names in sorted order.
#[must_use]
pub fn registered_services() -> Vec<String> {
    let mut services = vec![HelloWorldService::NAME.to_string(), REFLECTION_SERVICE.to_string()];
    services.sort();
    services
}

// ============================================================================
// SECTION: HTTP Handling
// ============================================================================

/// Shared state for the RPC handler.
struct ServerState {
    /// Greeting logic.
    service: HelloWorldService,
    /// Per-request audit sink.
    audit: Arc<dyn RpcAuditSink>,
    /// Maximum request body size.
    max_body_bytes: usize,
}

/// Handles one HTTP JSON-RPC request.
async fn handle_rpc(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    bytes: Bytes,
) -> impl IntoResponse {
    let mut event = RpcAuditEvent::request(bytes.len());
    event.peer_ip = Some(peer.ip().to_string());
    let (status, response) = dispatch(&state, &bytes, &mut event);
    let payload = serde_json::to_vec(&response).unwrap_or_else(|_| SERIALIZATION_FAILED.to_vec());
    event.response_bytes = payload.len();
    state.audit.record(&event);
    (status, [(CONTENT_TYPE, "application/json")], payload)
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Parses, routes, and answers one request body, filling in `event`.
fn dispatch(
    state: &ServerState,
    bytes: &[u8],
    event: &mut RpcAuditEvent,
) -> (HttpStatus, JsonRpcResponse) {
    let (status, response) = route_request(state, bytes, event);
    if let Some(error) = &response.error {
        event.outcome = "error";
        event.error_code = Some(error.code);
    }
    (status, response)
}

/// Validates the envelope and routes by method.
fn route_request(
    state: &ServerState,
    bytes: &[u8],
    event: &mut RpcAuditEvent,
) -> (HttpStatus, JsonRpcResponse) {
    if bytes.len() > state.max_body_bytes {
        return protocol_error(
            HttpStatus::PAYLOAD_TOO_LARGE,
            Value::Null,
            BODY_TOO_LARGE_CODE,
            "request body too large",
        );
    }
    let Ok(request) = serde_json::from_slice::<JsonRpcRequest>(bytes) else {
        return protocol_error(
            HttpStatus::BAD_REQUEST,
            Value::Null,
            INVALID_REQUEST_CODE,
            "invalid json-rpc request",
        );
    };
    event.request_id = Some(request.id.to_string());
    event.method = Some(request.method.clone());
    if request.jsonrpc != "2.0" {
        return protocol_error(
            HttpStatus::BAD_REQUEST,
            request.id,
            INVALID_REQUEST_CODE,
            "invalid json-rpc version",
        );
    }

    let id = request.id;
    let outcome = match request.method.as_str() {
        GREET_METHOD => {
            let params = request.params.unwrap_or(Value::Null);
            serde_json::from_value::<GreetRequest>(params)
                .map_err(|_| Status::invalid_argument("invalid greet params"))
                .and_then(|greet| state.service.greet(&greet))
                .and_then(|response| to_result(&response))
        }
        LIST_SERVICES_METHOD => to_result(&ServiceList {
            services: registered_services(),
        }),
        other => Err(Status::unimplemented(format!("unknown method: {other}"))),
    };
    match outcome {
        Ok(result) => (
            HttpStatus::OK,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id,
                result: Some(result),
                error: None,
            },
        ),
        Err(status) => status_error(id, status),
    }
}

/// Serializes a successful result.
fn to_result<T: Serialize>(value: &T) -> Result<Value, Status> {
    serde_json::to_value(value)
        .map_err(|_| Status::new(StatusCode::Internal, "serialization failed"))
}

/// Builds a JSON-RPC error response for a service status.
fn status_error(id: Value, status: Status) -> (HttpStatus, JsonRpcResponse) {
    let http = match status.code {
        StatusCode::InvalidArgument | StatusCode::Unimplemented => HttpStatus::BAD_REQUEST,
        StatusCode::Internal | StatusCode::NotFound => HttpStatus::OK,
    };
    (
        http,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code: status.code.rpc_code(),
                message: status.message,
            }),
        },
    )
}

/// Builds a JSON-RPC error response for an envelope failure.
fn protocol_error(
    http: HttpStatus,
    id: Value,
    code: i64,
    message: &str,
) -> (HttpStatus, JsonRpcResponse) {
    (
        http,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.to_string(),
            }),
        },
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
