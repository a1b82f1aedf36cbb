//! Feed transport
//!
//! Opens a streaming byte read against the feed URL. The production
//! transport is HTTP via `reqwest`; tests substitute their own
//! implementations behind [`FeedTransport`].

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::error::IngestError;

/// Default connect timeout for the feed server.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle-read timeout. A feed server that stops sending bytes for
/// this long fails the attempt instead of wedging the run guard.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 120;

/// A streaming byte source for one feed download
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Abstract transport for opening a feed stream
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Open a streaming read against `url`. Connection failures and
    /// non-success responses are fetch errors.
    async fn open_stream(&self, url: &str) -> Result<ByteStream, IngestError>;
}

/// HTTP transport backed by a shared `reqwest` client
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS))
            .build()
            .map_err(|e| IngestError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn open_stream(&self, url: &str) -> Result<ByteStream, IngestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Fetch(format!(
                "unexpected status {status} from feed server"
            )));
        }

        debug!(
            url,
            content_length = response.content_length(),
            "Feed stream opened"
        );

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::new(StreamReader::new(stream)))
    }
}
