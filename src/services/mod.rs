//! Business logic and service layer modules.
//!
//! This module contains the attempt store, the ban policy, the tracker and
//! gate built on them, and the [`LoginGuard`] that exposes the extension points.

pub mod auth;
pub mod clock;
pub mod gate;
pub mod guard;
pub mod metrics;
pub mod notifier;
pub mod policy;
pub mod store;
pub mod tracker;

pub use auth::*;
pub use clock::*;
pub use gate::*;
pub use guard::*;
pub use metrics::*;
pub use notifier::*;
pub use policy::*;
pub use store::*;
pub use tracker::*;
