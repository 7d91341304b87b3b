// crates/greeter-service/src/lib.rs
// ============================================================================
// Module: Greeter Service
// Description: Greeter RPC service, JSON-RPC server, and typed client.
// Purpose: Provide the service-under-test for golden step cases.
// Dependencies: axum, reqwest, serde, tokio
// ============================================================================

//! ## Overview
//! The greeter answers `greeter.greet` with `"Hello, {name}"` and
//! `server.list_services` with its registered service names, over JSON-RPC
//! 2.0 on `POST /rpc`. [`testing::TestServer`] runs it on a loopback port for
//! tests; [`GreeterClient`] is the typed caller.
//!
//! Golden step cases store typed messages as RON records (`1.in.ron` /
//! `1.out.ron`) rather than protobuf text format: the request and response
//! types are serde types, so RON is their schema-aware text form.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod audit;
pub mod client;
pub mod server;
pub mod service;
pub mod testing;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::GreetRequest;
pub use api::GreetResponse;
pub use api::Request;
pub use api::Response;
pub use api::ServiceList;
pub use api::Status;
pub use api::StatusCode;
pub use audit::NoopAuditSink;
pub use audit::RpcAuditEvent;
pub use audit::RpcAuditSink;
pub use audit::StderrAuditSink;
pub use client::ClientError;
pub use client::GreeterClient;
pub use server::GreeterServer;
pub use server::ServerError;
pub use service::HelloWorldService;
