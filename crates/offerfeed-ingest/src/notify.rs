//! Operator notification
//!
//! Delivery failures are the caller's problem to log and swallow; a broken
//! mail transport must never replace or mask an ingestion error.

use async_trait::async_trait;
use tracing::info;

/// Abstract notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Notifier that writes the message to the log instead of delivering it.
///
/// Stands in for a real mail transport; deployments slot an SMTP
/// implementation behind [`Notifier`] without touching the orchestrator.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(to, subject, body, "Operator notification");
        Ok(())
    }
}
