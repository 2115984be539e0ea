//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by session services.
///
/// State-machine operations never fail; these cover configuration parsing and
/// the external snapshot store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid quiz configuration: {0}")]
    Config(#[source] serde_json::Error),
    #[error(transparent)]
    Content(#[from] quiz_core::Error),
    #[error("failed to encode session snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
