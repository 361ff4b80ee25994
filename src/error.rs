//! Error types shared by the guard services.

use std::path::PathBuf;

use crate::services::notifier::NotificationError;

/// Errors raised inside the guard.
///
/// None of these ever reach the end user: the extension points in
/// [`crate::services::LoginGuard`] log them and fail open.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("client IP address could not be resolved")]
    UnresolvableIp,

    #[error("failed to read attempt store {path}: {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("attempt store {path} is corrupt: {source}")]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write attempt store {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize attempt records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("notification failed: {0}")]
    Notification(#[from] NotificationError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl GuardError {
    /// Attempt store operation that failed, used as the storage error metric
    /// label. `None` for errors that do not come from the store.
    pub fn storage_operation(&self) -> Option<&'static str> {
        match self {
            GuardError::StorageRead { .. } | GuardError::CorruptStore { .. } => Some("read"),
            GuardError::StorageWrite { .. } | GuardError::Serialize(_) => Some("write"),
            GuardError::UnresolvableIp | GuardError::Notification(_) | GuardError::Metrics(_) => {
                None
            }
        }
    }
}
