// crates/greeter-service/src/testing.rs
// ============================================================================
// Module: Test Server
// Description: Loopback greeter server for integration and golden tests.
// Purpose: Start a server on an ephemeral port and stop it gracefully.
// Dependencies: tokio, tokio-util
// ============================================================================

//! ## Overview
//! [`TestServer`] binds `127.0.0.1:0`, serves on a spawned task, and hands
//! out clients pointed at itself. [`TestServer::shutdown`] cancels the
//! server token and waits for in-flight requests to drain.

use std::net::SocketAddr;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::ClientError;
use crate::client::DEFAULT_TIMEOUT;
use crate::client::GreeterClient;
use crate::server::GreeterServer;
use crate::server::ServerError;
use crate::server::bind;
use crate::service::HelloWorldService;

/// Greeter server running on a loopback port.
#[derive(Debug)]
pub struct TestServer {
    /// Bound address.
    addr: SocketAddr,
    /// Shutdown token for the server task.
    shutdown: CancellationToken,
    /// Server task.
    task: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    /// Starts a default greeter server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the loopback port cannot be bound.
    pub async fn start() -> Result<Self, ServerError> {
        Self::start_with(GreeterServer::new(HelloWorldService)).await
    }

    /// Starts `server` on a loopback port.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the loopback port cannot be bound.
    pub async fn start_with(server: GreeterServer) -> Result<Self, ServerError> {
        let listener = bind("127.0.0.1:0").await?;
        let addr = listener.local_addr().map_err(|err| ServerError::Bind {
            addr: "127.0.0.1:0".to_string(),
            message: err.to_string(),
        })?;
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(server.serve(listener, shutdown.clone()));
        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    /// Returns the bound address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the base URL of the server.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Builds a client for this server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the HTTP client cannot be built.
    pub fn client(&self) -> Result<GreeterClient, ClientError> {
        GreeterClient::new(&self.url(), DEFAULT_TIMEOUT)
    }

    /// Stops the server and waits for it to drain.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the server failed or its task panicked.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.shutdown.cancel();
        self.task
            .await
            .map_err(|err| ServerError::Transport(format!("server task failed: {err}")))?
    }
}
