//! crates/revision_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the core's external collaborators.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the text-generation API and of the storage backend.

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, disk).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The remote service answered with a non-success status.
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait RewriteService: Send + Sync {
    /// Rewrites `original` according to `instruction`.
    ///
    /// An empty string is a valid suggestion and must not be reported as an error.
    async fn rewrite(&self, original: &str, instruction: &str) -> PortResult<String>;
}

/// A synchronous key-value store used to persist the serialized history.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value as a whole.
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
}
