//! Offerfeed Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, logging setup, and the localized message catalog
//! used by the offerfeed workspace members.

pub mod error;
pub mod logging;
pub mod messages;

// Re-export commonly used types
pub use error::{FeedError, Result};
