//! Retry orchestration
//!
//! Runs the pipeline up to the configured number of attempts with immediate
//! retry on structural failure. Every failed attempt and the eventual
//! success each notify the operator; notification failures are logged and
//! swallowed so they can never mask the ingestion result.

use std::sync::Arc;

use chrono::Utc;
use offerfeed_common::messages;
use tracing::{error, info, warn};

use crate::config::JobConfig;
use crate::error::IngestError;
use crate::models::RunOutcome;
use crate::notify::Notifier;
use crate::pipeline::StreamPipeline;

/// Attempt sequence driver for one scheduled run
pub struct IngestOrchestrator {
    pipeline: StreamPipeline,
    notifier: Arc<dyn Notifier>,
}

impl IngestOrchestrator {
    pub fn new(pipeline: StreamPipeline, notifier: Arc<dyn Notifier>) -> Self {
        Self { pipeline, notifier }
    }

    /// Run the pipeline up to `config.max_attempts` times. Returns the
    /// outcome of the first successful attempt, or the last attempt's error
    /// once attempts are exhausted.
    pub async fn run_with_retries(&self, config: &JobConfig) -> Result<RunOutcome, IngestError> {
        let Some(feed_url) = config.feed_url.as_deref() else {
            return Err(IngestError::Config(messages::lookup(
                "feed.job.error.missingFeedUrl",
                &config.language,
                &[],
            )));
        };

        let max_attempts = config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, "Starting attempt");

            match self.pipeline.run(feed_url).await {
                Ok(outcome) => {
                    info!(
                        processed_rows = outcome.processed_rows,
                        skipped_rows = outcome.skipped_rows,
                        duration_ms = outcome.duration_ms,
                        "Job completed successfully"
                    );
                    self.notify_success(config, &outcome).await;
                    return Ok(outcome);
                }
                Err(err) => {
                    error!(attempt, max_attempts, error = %err, "Attempt failed");
                    self.notify_failure(config, attempt, max_attempts, &err).await;

                    if attempt < max_attempts {
                        info!(next_attempt = attempt + 1, max_attempts, "Retrying immediately");
                    } else {
                        error!("All attempts failed. Skipping this run.");
                    }
                    last_error = Some(err);
                }
            }
        }

        // max_attempts >= 1, so at least one attempt ran and failed.
        Err(last_error
            .unwrap_or_else(|| IngestError::Config("no attempts were executed".to_string())))
    }

    async fn notify_success(&self, config: &JobConfig, outcome: &RunOutcome) {
        let Some(to) = config.operator_email.as_deref() else {
            warn!("{}", messages::lookup("feed.job.email.notSet", &config.language, &[]));
            return;
        };

        let subject = messages::lookup("feed.job.email.success.subject", &config.language, &[]);
        let body = messages::lookup(
            "feed.job.email.success.body",
            &config.language,
            &[
                ("timestamp", Utc::now().to_rfc3339()),
                ("processedRows", outcome.processed_rows.to_string()),
                ("skippedRows", outcome.skipped_rows.to_string()),
                ("totalRows", outcome.total_rows().to_string()),
                ("duration", outcome.duration_ms.to_string()),
            ],
        );

        if let Err(err) = self.notifier.notify(to, &subject, &body).await {
            error!(
                error = %err,
                "{}",
                messages::lookup(
                    "feed.job.email.sendError",
                    &config.language,
                    &[("type", "success".to_string())],
                )
            );
        }
    }

    async fn notify_failure(
        &self,
        config: &JobConfig,
        attempt: u32,
        max_attempts: u32,
        ingest_err: &IngestError,
    ) {
        let Some(to) = config.operator_email.as_deref() else {
            warn!("{}", messages::lookup("feed.job.email.notSet", &config.language, &[]));
            return;
        };

        let placeholders = [
            ("timestamp", Utc::now().to_rfc3339()),
            ("attempt", attempt.to_string()),
            ("maxAttempts", max_attempts.to_string()),
            ("error", ingest_err.to_string()),
        ];
        let subject =
            messages::lookup("feed.job.email.failure.subject", &config.language, &placeholders);
        let body =
            messages::lookup("feed.job.email.failure.body", &config.language, &placeholders);

        if let Err(err) = self.notifier.notify(to, &subject, &body).await {
            error!(
                error = %err,
                "{}",
                messages::lookup(
                    "feed.job.email.sendError",
                    &config.language,
                    &[("type", "failure".to_string())],
                )
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::{BrokenNotifier, RecordingNotifier};
    use crate::sink::testing::MemorySink;
    use crate::transport::{ByteStream, FeedTransport};
    use async_trait::async_trait;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` opens structurally, then serves the feed.
    struct FlakyTransport {
        failures: u32,
        calls: AtomicU32,
        body: Vec<u8>,
    }

    impl FlakyTransport {
        fn new(failures: u32, body: Vec<u8>) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                body,
            }
        }
    }

    #[async_trait]
    impl FeedTransport for FlakyTransport {
        async fn open_stream(&self, _url: &str) -> Result<ByteStream, IngestError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(IngestError::Fetch(format!("transient failure #{call}")))
            } else {
                Ok(Box::new(std::io::Cursor::new(self.body.clone())))
            }
        }
    }

    fn feed_body() -> Vec<u8> {
        let csv = "merchant_id,aw_product_id,product_name\n1001,SKU-1,Widget\n";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(csv.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn config(max_attempts: u32) -> JobConfig {
        JobConfig {
            language: "en".to_string(),
            max_attempts,
            feed_url: Some("http://feed.test/products.gz".to_string()),
            cron_schedule: None,
            operator_email: Some("ops@example.com".to_string()),
            run_on_start: false,
            database_url: None,
        }
    }

    fn orchestrator(
        transport: Arc<FlakyTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> IngestOrchestrator {
        let pipeline = StreamPipeline::new(transport, Arc::new(MemorySink::default()));
        IngestOrchestrator::new(pipeline, notifier)
    }

    #[tokio::test]
    async fn test_two_failures_then_success_notifies_each_attempt() {
        let transport = Arc::new(FlakyTransport::new(2, feed_body()));
        let notifier = Arc::new(RecordingNotifier::default());
        let orch = orchestrator(transport.clone(), notifier.clone());

        let outcome = orch.run_with_retries(&config(3)).await.unwrap();

        assert_eq!(outcome.processed_rows, 1);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].subject.contains("attempt 1/3"));
        assert!(sent[1].subject.contains("attempt 2/3"));
        assert!(sent[2].subject.contains("completed successfully"));
    }

    #[tokio::test]
    async fn test_exhausted_attempts_surface_last_error() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX, Vec::new()));
        let notifier = Arc::new(RecordingNotifier::default());
        let orch = orchestrator(transport.clone(), notifier.clone());

        let err = orch.run_with_retries(&config(2)).await.unwrap_err();

        assert!(matches!(err, IngestError::Fetch(_)));
        assert!(err.to_string().contains("#2"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.subject.contains("failed")));
    }

    #[tokio::test]
    async fn test_success_stops_retrying() {
        let transport = Arc::new(FlakyTransport::new(0, feed_body()));
        let notifier = Arc::new(RecordingNotifier::default());
        let orch = orchestrator(transport.clone(), notifier.clone());

        orch.run_with_retries(&config(3)).await.unwrap();

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_broken_notifier_never_masks_the_result() {
        let transport = Arc::new(FlakyTransport::new(1, feed_body()));
        let orch = orchestrator(transport, Arc::new(BrokenNotifier));

        let outcome = orch.run_with_retries(&config(2)).await.unwrap();
        assert_eq!(outcome.processed_rows, 1);
    }

    #[tokio::test]
    async fn test_missing_operator_email_skips_notification() {
        let transport = Arc::new(FlakyTransport::new(0, feed_body()));
        let notifier = Arc::new(RecordingNotifier::default());
        let orch = orchestrator(transport, notifier.clone());

        let mut cfg = config(1);
        cfg.operator_email = None;
        orch.run_with_retries(&cfg).await.unwrap();

        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_feed_url_is_config_error() {
        let transport = Arc::new(FlakyTransport::new(0, feed_body()));
        let orch = orchestrator(transport.clone(), Arc::new(RecordingNotifier::default()));

        let mut cfg = config(1);
        cfg.feed_url = None;
        let err = orch.run_with_retries(&cfg).await.unwrap_err();

        assert!(matches!(err, IngestError::Config(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_localized_failure_notification() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX, Vec::new()));
        let notifier = Arc::new(RecordingNotifier::default());
        let orch = orchestrator(transport, notifier.clone());

        let mut cfg = config(1);
        cfg.language = "de".to_string();
        orch.run_with_retries(&cfg).await.unwrap_err();

        let sent = notifier.sent.lock().unwrap();
        assert!(sent[0].subject.contains("fehlgeschlagen"));
    }
}
