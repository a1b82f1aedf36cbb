//! Scheduling and run exclusion
//!
//! Registers the cron trigger for the ingestion job and owns the run
//! guard. Missing or invalid configuration disables the job with a logged
//! diagnostic; it never takes down the host process. Overlapping firings
//! are skipped outright, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use offerfeed_common::messages;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::JobConfig;
use crate::notify::LogNotifier;
use crate::orchestrator::IngestOrchestrator;
use crate::pipeline::StreamPipeline;
use crate::sink::PgCatalogSink;
use crate::transport::HttpTransport;

/// Process-wide "a run is executing" flag.
///
/// At most one attempt sequence runs at a time per process. This is not a
/// distributed lock; multi-process deployments need external exclusion.
#[derive(Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. Returns false if a run is already executing.
    pub fn try_acquire(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn release(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Releases the guard when the run body finishes or unwinds.
struct ReleaseOnDrop<'a>(&'a RunGuard);

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Cron-driven entry point for the ingestion job
pub struct FeedScheduler {
    orchestrator: Arc<IngestOrchestrator>,
    guard: RunGuard,
}

impl FeedScheduler {
    pub fn new(orchestrator: Arc<IngestOrchestrator>) -> Self {
        Self {
            orchestrator,
            guard: RunGuard::new(),
        }
    }

    /// Wire the production pipeline: HTTP transport, Postgres sink, log
    /// notifier. Requires `DATABASE_URL` in the config.
    pub async fn from_config(config: &JobConfig) -> anyhow::Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;

        let sink = PgCatalogSink::connect(database_url).await?;
        sink.ensure_schema().await?;

        let transport = HttpTransport::new()?;
        let pipeline = StreamPipeline::new(Arc::new(transport), Arc::new(sink));
        let orchestrator = IngestOrchestrator::new(pipeline, Arc::new(LogNotifier));

        Ok(Self::new(Arc::new(orchestrator)))
    }

    /// Perform one guarded run immediately.
    pub async fn run_now(&self, config: &JobConfig) {
        run_guarded(self.orchestrator.clone(), self.guard.clone(), config.clone()).await;
    }

    /// Validate configuration and register the cron trigger.
    ///
    /// Returns the scheduler handle to keep alive, or `None` when the job
    /// is disabled by missing/invalid configuration. Configuration problems
    /// are logged, never raised.
    pub async fn start(self, config: JobConfig) -> anyhow::Result<Option<JobScheduler>> {
        if config.feed_url.is_none() {
            error!(
                "{}",
                messages::lookup("feed.job.error.missingFeedUrl", &config.language, &[])
            );
            return Ok(None);
        }

        let Some(schedule) = config.cron_schedule.clone() else {
            error!(
                "{}",
                messages::lookup("feed.job.error.missingCronSchedule", &config.language, &[])
            );
            return Ok(None);
        };

        let orchestrator = self.orchestrator.clone();
        let guard = self.guard.clone();
        let job_config = config.clone();

        let job = match Job::new_async(schedule.as_str(), move |_id, _scheduler| {
            let orchestrator = orchestrator.clone();
            let guard = guard.clone();
            let config = job_config.clone();
            Box::pin(async move {
                run_guarded(orchestrator, guard, config).await;
            })
        }) {
            Ok(job) => job,
            Err(err) => {
                error!(
                    error = %err,
                    "{}",
                    messages::lookup(
                        "feed.job.error.invalidCronSchedule",
                        &config.language,
                        &[("schedule", schedule.clone())],
                    )
                );
                return Ok(None);
            }
        };

        let scheduler = JobScheduler::new().await?;
        scheduler.add(job).await?;
        scheduler.start().await?;
        info!(schedule = %schedule, "Cron job scheduled");

        if config.run_on_start {
            info!("Running feed ingestion immediately on startup");
            let orchestrator = self.orchestrator.clone();
            let guard = self.guard.clone();
            tokio::spawn(async move {
                run_guarded(orchestrator, guard, config).await;
            });
        }

        Ok(Some(scheduler))
    }
}

/// One guarded firing: skip if a run is in flight, otherwise run the full
/// retry sequence and release the guard no matter how it ends.
async fn run_guarded(orchestrator: Arc<IngestOrchestrator>, guard: RunGuard, config: JobConfig) {
    if !guard.try_acquire() {
        warn!("Previous run still in progress. Skipping.");
        return;
    }
    let _release = ReleaseOnDrop(&guard);

    info!(timestamp = %Utc::now().to_rfc3339(), "Job started");

    if let Err(err) = orchestrator.run_with_retries(&config).await {
        error!(error = %err, "Job failed after all retries");
    }

    info!(timestamp = %Utc::now().to_rfc3339(), "Job finished");
}
