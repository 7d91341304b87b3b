// crates/greeter-service/src/audit.rs
// ============================================================================
// Module: RPC Audit Logging
// Description: Structured audit events for JSON-RPC request handling.
// Purpose: Emit one JSON line per request without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The server records one [`RpcAuditEvent`] per request. Request payloads are
//! never logged; only sizes, the method, and the outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event payload for one JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when the request parsed.
    pub request_id: Option<String>,
    /// Peer IP address.
    pub peer_ip: Option<String>,
    /// Method name when the request parsed.
    pub method: Option<String>,
    /// `ok` or `error`.
    pub outcome: &'static str,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl RpcAuditEvent {
    /// Builds a request event stamped with the current time.
    #[must_use]
    pub fn request(request_bytes: usize) -> Self {
        Self {
            event: "rpc_request",
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            request_id: None,
            peer_ip: None,
            method: None,
            outcome: "ok",
            error_code: None,
            request_bytes,
            response_bytes: 0,
        }
    }
}

/// Audit sink for RPC events.
pub trait RpcAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &RpcAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RpcAuditSink for StderrAuditSink {
    fn record(&self, event: &RpcAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl RpcAuditSink for NoopAuditSink {
    fn record(&self, _event: &RpcAuditEvent) {}
}
