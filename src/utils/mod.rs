//! Utility functions and helper modules.
//!
//! This module contains client IP resolution and request inspection helpers.

pub mod http;
pub mod ip;

pub use http::*;
pub use ip::*;
