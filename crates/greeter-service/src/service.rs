// crates/greeter-service/src/service.rs
// ============================================================================
// Module: Greeter Service
// Description: The hello-world greeting logic.
// Purpose: Validate greet requests and build greeting responses.
// Dependencies: none
// ============================================================================

//! ## Overview
//! [`HelloWorldService`] is transport-free; the server decodes JSON-RPC
//! parameters and hands typed requests to it.

use crate::api::GreetRequest;
use crate::api::GreetResponse;
use crate::api::Status;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted name length in bytes.
pub const MAX_NAME_BYTES: usize = 256;

// ============================================================================
// SECTION: Service
// ============================================================================

/// Greeter service implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelloWorldService;

impl HelloWorldService {
    /// Registered service name.
    pub const NAME: &'static str = "greeter.v1.HelloWorld";

    /// Greets `request.name`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument [`Status`] when the name is empty or longer
    /// than [`MAX_NAME_BYTES`].
    pub fn greet(&self, request: &GreetRequest) -> Result<GreetResponse, Status> {
        if request.name.is_empty() {
            return Err(Status::invalid_argument("name must not be empty"));
        }
        if request.name.len() > MAX_NAME_BYTES {
            return Err(Status::invalid_argument(format!(
                "name exceeds {MAX_NAME_BYTES} bytes"
            )));
        }
        Ok(GreetResponse {
            message: format!("Hello, {}", request.name),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
