//! Error types shared across the offerfeed workspace

use thiserror::Error;

/// Result type alias for offerfeed operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors shared between offerfeed components.
///
/// The ingest crate keeps its own attempt-level taxonomy; this type covers
/// the surfaces shared across crates, currently the catalog connection.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Database error: {0}")]
    Database(String),
}
