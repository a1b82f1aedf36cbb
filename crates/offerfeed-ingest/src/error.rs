//! Ingestion error taxonomy
//!
//! Structural errors abort the current attempt and are retried by the
//! orchestrator. Row-level failures are not errors at this level; the
//! pipeline counts them as skipped and keeps streaming.

use thiserror::Error;

/// Attempt-level failure of the ingestion pipeline
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    #[error("Feed decompression failed: {0}")]
    Decompress(String),

    #[error("Feed parsing failed: {0}")]
    Parse(String),
}
