//! # Post-Commit Hooks
//!
//! Activity notifications emitted after a mutation has been committed.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  service.create(...)                                                    │
//! │     │  guard → write → COMMIT                                           │
//! │     ▼                                                                   │
//! │  PostCommitHooks::notify(event)                                        │
//! │     ├──► DbActivitySink     (activity_logs row)                        │
//! │     ├──► TracingSink        (info! line)                               │
//! │     └──► ...                                                           │
//! │                                                                         │
//! │  A failing or slow sink is logged with warn! and skipped. Each sink    │
//! │  gets at most `timeout` before the next one runs. The mutation has     │
//! │  already succeeded and its result is returned unchanged.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use ud_core::{ActivityAction, ActivityLogEntry, ActivityModule};
use ud_db::{ActivityLogRepository, DbResult};

use crate::clock::Clock;

/// One committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub actor_id: String,
    pub action: ActivityAction,
    pub module: ActivityModule,
    pub description: String,
    pub target_id: Option<String>,
    /// JSON text.
    pub metadata: Option<String>,
}

impl ActivityEvent {
    pub fn new(
        actor_id: impl Into<String>,
        action: ActivityAction,
        module: ActivityModule,
        description: impl Into<String>,
    ) -> Self {
        ActivityEvent {
            actor_id: actor_id.into(),
            action,
            module,
            description: description.into(),
            target_id: None,
            metadata: None,
        }
    }

    pub fn target(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    pub fn metadata(mut self, value: serde_json::Value) -> Self {
        self.metadata = Some(value.to_string());
        self
    }
}

/// Receiver of activity events.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, event: &ActivityEvent) -> Result<(), SinkError>;
}

/// Failure reported by a sink. Never reaches the engine's callers.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SinkError(pub String);

impl From<ud_db::DbError> for SinkError {
    fn from(err: ud_db::DbError) -> Self {
        SinkError(err.to_string())
    }
}

/// Sink that drops every event.
pub struct NoOpSink;

#[async_trait]
impl ActivitySink for NoOpSink {
    async fn record(&self, _event: &ActivityEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that only logs the event.
pub struct TracingSink;

#[async_trait]
impl ActivitySink for TracingSink {
    async fn record(&self, event: &ActivityEvent) -> Result<(), SinkError> {
        info!(
            actor_id = %event.actor_id,
            action = ?event.action,
            module = ?event.module,
            target_id = ?event.target_id,
            "{}",
            event.description
        );
        Ok(())
    }
}

/// Sink that appends to the `activity_logs` table.
pub struct DbActivitySink {
    repo: ActivityLogRepository,
    clock: Arc<dyn Clock>,
}

impl DbActivitySink {
    pub fn new(repo: ActivityLogRepository, clock: Arc<dyn Clock>) -> Self {
        DbActivitySink { repo, clock }
    }

    async fn insert(&self, event: &ActivityEvent) -> DbResult<()> {
        let entry = ActivityLogEntry {
            id: Uuid::new_v4().to_string(),
            actor_id: event.actor_id.clone(),
            action: event.action,
            module: event.module,
            description: event.description.clone(),
            target_id: event.target_id.clone(),
            metadata: event.metadata.clone(),
            created_at: self.clock.now(),
        };
        self.repo.insert(&entry).await
    }
}

#[async_trait]
impl ActivitySink for DbActivitySink {
    async fn record(&self, event: &ActivityEvent) -> Result<(), SinkError> {
        self.insert(event).await.map_err(SinkError::from)
    }
}

/// Upper bound on a single sink delivery.
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(2);

/// Ordered list of sinks notified after each committed mutation.
///
/// Delivery is inline and in order, so a sink that writes to the ledger
/// store has finished by the time the service call returns.
#[derive(Clone)]
pub struct PostCommitHooks {
    sinks: Vec<Arc<dyn ActivitySink>>,
    timeout: Duration,
}

impl Default for PostCommitHooks {
    fn default() -> Self {
        PostCommitHooks {
            sinks: Vec::new(),
            timeout: DEFAULT_SINK_TIMEOUT,
        }
    }
}

impl PostCommitHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn with_sink(mut self, sink: Arc<dyn ActivitySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn ActivitySink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Delivers `event` to every sink. Failures and timeouts are logged and
    /// discarded.
    pub async fn notify(&self, event: ActivityEvent) {
        for sink in &self.sinks {
            match tokio::time::timeout(self.timeout, sink.record(&event)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    error = %e,
                    module = ?event.module,
                    target_id = ?event.target_id,
                    "Activity sink failed, event dropped"
                ),
                Err(_) => warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    module = ?event.module,
                    target_id = ?event.target_id,
                    "Activity sink timed out, event dropped"
                ),
            }
        }
    }
}

impl std::fmt::Debug for PostCommitHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostCommitHooks")
            .field("sinks", &self.sinks.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
