//! HTTP request handlers for API endpoints.
//!
//! This module is the host integration layer: it resolves the client IP,
//! calls the guard's extension points and turns its decisions into HTTP
//! responses.

pub mod auth;
pub mod health;
pub mod metrics;
pub mod openapi;

pub use auth::*;
pub use health::*;
pub use metrics::*;
pub use openapi::*;
