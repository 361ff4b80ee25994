//! Data models for the login guard.
//!
//! This module contains the persisted attempt records, the decisions returned
//! by the guard, request/response models and audit types.

pub mod api;
pub mod attempt;
pub mod audit;
pub mod auth;
pub mod decision;

pub use api::*;
pub use attempt::*;
pub use audit::*;
pub use auth::*;
pub use decision::*;
