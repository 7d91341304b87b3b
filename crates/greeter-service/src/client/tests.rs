// crates/greeter-service/src/client/tests.rs
// ============================================================================
// Module: Greeter Client Tests
// Description: Unit tests for response decoding and client construction.
// Purpose: Pin status folding and protocol failures without a server.
// Dependencies: greeter-service
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use super::ClientError;
use super::DEFAULT_TIMEOUT;
use super::GreeterClient;
use super::decode_response;
use crate::api::GreetResponse;
use crate::api::Status;
use crate::api::StatusCode;

#[test]
fn result_payload_decodes_to_type() {
    let body = br#"{"jsonrpc":"2.0","id":1,"result":{"message":"Hello, World"}}"#;
    let response: GreetResponse = decode_response("greeter.greet", body).unwrap();
    assert_eq!(response.message, "Hello, World");
}

#[test]
fn error_payload_becomes_status() {
    let body = br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"name must not be empty"}}"#;
    let err = decode_response::<GreetResponse>("greeter.greet", body).unwrap_err();
    assert_eq!(
        err,
        ClientError::Status(Status::new(StatusCode::InvalidArgument, "name must not be empty"))
    );
}

#[test]
fn missing_result_is_protocol_error() {
    let err = decode_response::<GreetResponse>("greeter.greet", br#"{"jsonrpc":"2.0","id":1}"#)
        .unwrap_err();
    assert_eq!(err, ClientError::Protocol("missing result in greeter.greet response".to_string()));
}

#[test]
fn endpoint_appends_rpc_path() {
    let client = GreeterClient::new("http://127.0.0.1:9/", DEFAULT_TIMEOUT).unwrap();
    assert_eq!(client.endpoint(), "http://127.0.0.1:9/rpc");
    assert!(matches!(GreeterClient::new("", DEFAULT_TIMEOUT), Err(ClientError::Config(_))));
}
