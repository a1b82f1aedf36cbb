//! Streaming ingestion pipeline
//!
//! Composes download, gzip decode and CSV parsing over a single byte
//! stream, so memory stays O(1) in the feed size. Rows are pulled one at a
//! time: the next record is not read until the current row's upsert has
//! resolved, which bounds the pipeline to one in-flight catalog write.
//!
//! Error policy: a malformed or unwritable row is counted as skipped and
//! the stream continues. Transport, decompression and framing failures are
//! structural; they fail the whole attempt.

use std::sync::Arc;
use std::time::Instant;

use async_compression::tokio::bufread::GzipDecoder;
use csv_async::{AsyncReaderBuilder, StringRecord};
use tokio::io::BufReader;
use tracing::{error, info, warn};

use crate::error::IngestError;
use crate::mapper::{map_row, HeaderIndex, RawRow, COL_MERCHANT_ID, COL_PRODUCT_ID};
use crate::models::RunOutcome;
use crate::sink::CatalogSink;
use crate::transport::FeedTransport;

/// One download→decompress→parse→upsert pass over the feed
pub struct StreamPipeline {
    transport: Arc<dyn FeedTransport>,
    sink: Arc<dyn CatalogSink>,
}

impl StreamPipeline {
    pub fn new(transport: Arc<dyn FeedTransport>, sink: Arc<dyn CatalogSink>) -> Self {
        Self { transport, sink }
    }

    /// Run one full attempt against `feed_url`.
    pub async fn run(&self, feed_url: &str) -> Result<RunOutcome, IngestError> {
        let started = Instant::now();

        info!(url = feed_url, "Downloading feed");
        let raw = self.transport.open_stream(feed_url).await?;
        info!("Feed stream open, starting decompression and parsing");

        let decoder = GzipDecoder::new(BufReader::new(raw));
        let mut reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .create_reader(decoder);

        let headers = reader
            .headers()
            .await
            .map_err(classify_stream_error)?
            .clone();
        let index = HeaderIndex::new(&headers);

        let mut outcome = RunOutcome::default();
        let mut record = StringRecord::new();

        loop {
            match reader.read_record(&mut record).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => return Err(classify_stream_error(e)),
            }

            let row = RawRow::new(&index, &record);
            let entry = map_row(&row);

            let Some(key) = entry.key() else {
                outcome.skipped_rows += 1;
                warn!(
                    merchant_id = ?row.get(COL_MERCHANT_ID),
                    product_id = ?row.get(COL_PRODUCT_ID),
                    "Skipping row - missing required key fields"
                );
                continue;
            };

            match self.sink.upsert(&key, &entry).await {
                Ok(()) => outcome.processed_rows += 1,
                Err(e) => {
                    outcome.skipped_rows += 1;
                    error!(
                        merchant_id = key.merchant_id,
                        product_id = %key.merchant_product_id,
                        error = %e,
                        "Error processing row"
                    );
                }
            }
        }

        outcome.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            processed_rows = outcome.processed_rows,
            skipped_rows = outcome.skipped_rows,
            duration_ms = outcome.duration_ms,
            "Feed parsing completed"
        );

        Ok(outcome)
    }
}

/// Classify a CSV-layer error into the structural taxonomy.
///
/// IO errors surfacing here come from below the parser: invalid or
/// truncated data is the gzip layer rejecting its input, anything else is
/// the transport failing mid-stream. Non-IO errors are framing problems in
/// the CSV itself.
fn classify_stream_error(err: csv_async::Error) -> IngestError {
    match err.kind() {
        csv_async::ErrorKind::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
                IngestError::Decompress(err.to_string())
            }
            _ => IngestError::Fetch(err.to_string()),
        },
        _ => IngestError::Parse(err.to_string()),
    }
}
