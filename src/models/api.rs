//! Health reporting models.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Attempt store state as seen by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Readable,
    /// Bans are not enforced while the store cannot be read
    Unreadable,
}

/// Response model for the health check endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the attempt store is unreadable
    pub status: String,
    pub store: StoreStatus,
}

impl HealthResponse {
    pub fn from_store(store: StoreStatus) -> Self {
        let status = match store {
            StoreStatus::Readable => "healthy",
            StoreStatus::Unreadable => "degraded",
        };
        Self {
            status: status.to_string(),
            store,
        }
    }
}
