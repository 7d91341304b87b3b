// crates/greeter-service/src/server/tests.rs
// ============================================================================
// Module: Greeter Server Tests
// Description: Unit tests for JSON-RPC dispatch and audit fields.
// Purpose: Pin envelope validation, method routing, and error codes.
// Dependencies: greeter-service, serde_json
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::sync::Arc;

use axum::http::StatusCode as HttpStatus;
use serde_json::Value;
use serde_json::json;

use super::ServerState;
use super::dispatch;
use super::registered_services;
use crate::audit::NoopAuditSink;
use crate::audit::RpcAuditEvent;
use crate::service::HelloWorldService;

fn state(max_body_bytes: usize) -> ServerState {
    ServerState {
        service: HelloWorldService,
        audit: Arc::new(NoopAuditSink),
        max_body_bytes,
    }
}

fn call(body: &[u8]) -> (HttpStatus, Value, RpcAuditEvent) {
    let mut event = RpcAuditEvent::request(body.len());
    let (status, response) = dispatch(&state(1024), body, &mut event);
    (status, serde_json::to_value(&response).unwrap(), event)
}

#[test]
fn greet_returns_message() {
    let (status, response, event) =
        call(br#"{"jsonrpc":"2.0","id":7,"method":"greeter.greet","params":{"name":"World"}}"#);
    assert_eq!(status, HttpStatus::OK);
    assert_eq!(response, json!({"jsonrpc": "2.0", "id": 7, "result": {"message": "Hello, World"}}));
    assert_eq!(event.outcome, "ok");
    assert_eq!(event.method.as_deref(), Some("greeter.greet"));
    assert_eq!(event.request_id.as_deref(), Some("7"));
}

#[test]
fn empty_name_maps_to_invalid_argument() {
    let (status, response, event) =
        call(br#"{"jsonrpc":"2.0","id":1,"method":"greeter.greet","params":{"name":""}}"#);
    assert_eq!(status, HttpStatus::BAD_REQUEST);
    assert_eq!(response["error"], json!({"code": -32602, "message": "name must not be empty"}));
    assert_eq!(event.outcome, "error");
    assert_eq!(event.error_code, Some(-32602));
}

#[test]
fn missing_greet_params_are_invalid() {
    let (_, response, _) = call(br#"{"jsonrpc":"2.0","id":1,"method":"greeter.greet"}"#);
    assert_eq!(response["error"]["message"], "invalid greet params");
}

#[test]
fn list_services_returns_sorted_names() {
    let (status, response, _) = call(br#"{"jsonrpc":"2.0","id":2,"method":"server.list_services"}"#);
    assert_eq!(status, HttpStatus::OK);
    assert_eq!(response["result"]["services"], json!(registered_services()));
    assert_eq!(registered_services(), ["greeter.v1.HelloWorld", "server.v1.Reflection"]);
}

#[test]
fn unknown_method_is_unimplemented() {
    let (_, response, _) = call(br#"{"jsonrpc":"2.0","id":3,"method":"greeter.wave"}"#);
    assert_eq!(response["error"], json!({"code": -32601, "message": "unknown method: greeter.wave"}));
}

#[test]
fn malformed_envelopes_are_rejected() {
    let (status, response, event) = call(b"not json");
    assert_eq!(status, HttpStatus::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], Value::Null);
    assert_eq!(event.method, None);

    let (_, response, _) = call(br#"{"jsonrpc":"1.0","id":4,"method":"server.list_services"}"#);
    assert_eq!(response["error"]["message"], "invalid json-rpc version");
    assert_eq!(response["id"], 4);
}

#[test]
fn oversized_bodies_are_rejected_before_parsing() {
    let body = vec![b' '; 2048];
    let mut event = RpcAuditEvent::request(body.len());
    let (status, response) = dispatch(&state(1024), &body, &mut event);
    assert_eq!(status, HttpStatus::PAYLOAD_TOO_LARGE);
    assert_eq!(serde_json::to_value(&response).unwrap()["error"]["code"], -32070);
    assert_eq!(event.error_code, Some(-32070));
}
