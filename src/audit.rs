//! Audit trail for mutating settings calls.

use crate::db::AuditEntry;
use crate::error::AppResult;
use async_trait::async_trait;
use tracing::warn;

/// Destination for audit entries
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> AppResult<()>;
}

/// Record an entry without letting a sink failure fail the caller.
pub async fn record_best_effort(sink: &dyn AuditSink, entry: AuditEntry) {
    if let Err(e) = sink.record(&entry).await {
        warn!(
            "Failed to record audit entry {} on {} by {}: {}",
            entry.action, entry.entity_id, entry.actor, e
        );
    }
}
