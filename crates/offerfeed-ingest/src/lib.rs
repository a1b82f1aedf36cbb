//! Offerfeed Ingest Library
//!
//! Scheduled ingestion of a compressed affiliate product feed into the
//! product catalog.
//!
//! The pipeline streams the feed end to end: HTTP download, gzip decode and
//! CSV parsing all operate on the same byte stream, so memory use stays flat
//! regardless of feed size. Rows are written to the catalog one at a time;
//! a malformed row is skipped and counted, while transport, decompression
//! and framing failures abort the attempt and are retried by the
//! orchestrator up to a configured limit.
//!
//! # Example
//!
//! ```no_run
//! use offerfeed_ingest::{config::JobConfig, scheduler::FeedScheduler};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = JobConfig::from_env();
//!     let scheduler = FeedScheduler::from_config(&config).await?;
//!     scheduler.start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod notify;
pub mod orchestrator;
pub mod pipeline;
pub mod price;
pub mod scheduler;
pub mod sink;
pub mod transport;
