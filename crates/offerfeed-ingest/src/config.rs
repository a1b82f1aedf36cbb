//! Job configuration
//!
//! Read once from the environment at startup into an immutable snapshot and
//! passed explicitly to each component; nothing rereads the environment
//! mid-run.

use serde::{Deserialize, Serialize};

/// Default number of attempts per scheduled run.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default notification/message language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Immutable per-run configuration snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Language for operator notifications
    pub language: String,
    /// Attempts per run, always >= 1
    pub max_attempts: u32,
    /// Feed download URL; the job is disabled without one
    pub feed_url: Option<String>,
    /// Cron recurrence expression; the job is disabled without one
    pub cron_schedule: Option<String>,
    /// Operator notification address; notifications are skipped without one
    pub operator_email: Option<String>,
    /// Perform one guarded run at process start
    pub run_on_start: bool,
    /// Catalog database connection string
    pub database_url: Option<String>,
}

impl JobConfig {
    /// Snapshot configuration from the environment.
    ///
    /// Variables: `FEED_URL`, `FEED_CRON_SCHEDULE`, `FEED_MAX_ATTEMPTS`,
    /// `FEED_LANGUAGE`, `JOB_EMAIL`, `FEED_RUN_ON_START`, `DATABASE_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            language: non_empty_var("FEED_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            max_attempts: non_empty_var("FEED_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ATTEMPTS)
                .max(1),
            feed_url: non_empty_var("FEED_URL"),
            cron_schedule: non_empty_var("FEED_CRON_SCHEDULE"),
            operator_email: non_empty_var("JOB_EMAIL"),
            run_on_start: non_empty_var("FEED_RUN_ON_START")
                .map(|v| v == "true")
                .unwrap_or(false),
            database_url: non_empty_var("DATABASE_URL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
