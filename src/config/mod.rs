//! Configuration structures and loading utilities.
//!
//! Every structure has a `Default` holding the documented defaults and a
//! `from_env()` constructor reading `FACECONTROL_*` variables.

pub mod allow_list;
pub mod guard;
pub mod metrics;
pub mod notification;

pub use allow_list::*;
pub use guard::*;
pub use metrics::*;
pub use notification::*;

/// Variable lookup used by the `from_env` constructors
pub(crate) type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;
