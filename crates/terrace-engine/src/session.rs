//! Session state: the most recent annotated snapshot.
//!
//! Readers take an `Arc` of whichever snapshot is current; a finished batch
//! swaps in a new one wholesale. Only one batch runs at a time per session.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use terrace_core::{AnnotatedComment, TopicInfo};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::EngineError;
use crate::pipeline::{AnnotatedBatch, Pipeline};
use crate::search::{context_window, search, SearchQuery};
use crate::stats::{batch_summary, compute_statistics, BatchSummary, Statistics};

/// An immutable, fully annotated batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Increments with each snapshot installed in a session.
    pub version: u64,
    pub batch_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub comments: Vec<AnnotatedComment>,
    pub topics: Vec<TopicInfo>,
    pub skipped_records: usize,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        batch_summary(&self.comments, &self.topics, self.skipped_records)
    }
}

#[derive(Default)]
pub struct Session {
    current: RwLock<Option<Arc<Snapshot>>>,
    batch_lock: Mutex<()>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `pipeline` over `input` and install the result.
    ///
    /// Concurrent callers queue behind the running batch. On failure the
    /// previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Propagates any [`EngineError`] from [`Pipeline::process_batch`].
    pub async fn run_batch(
        &self,
        pipeline: &Pipeline,
        input: &Value,
    ) -> Result<Arc<Snapshot>, EngineError> {
        let _guard = self.batch_lock.lock().await;
        let batch = pipeline.process_batch(input).await?;
        Ok(self.install(batch))
    }

    /// Replace the current snapshot with `batch`.
    pub fn install(&self, batch: AnnotatedBatch) -> Arc<Snapshot> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let version = slot.as_ref().map_or(1, |s| s.version + 1);
        let snapshot = Arc::new(Snapshot {
            version,
            batch_id: Uuid::new_v4(),
            completed_at: Utc::now(),
            comments: batch.comments,
            topics: batch.topics,
            skipped_records: batch.skipped_records,
        });
        *slot = Some(Arc::clone(&snapshot));
        tracing::info!(
            version,
            batch_id = %snapshot.batch_id,
            comments = snapshot.comments.len(),
            "snapshot installed"
        );
        snapshot
    }

    /// Install a previously exported snapshot as-is.
    pub fn restore(&self, snapshot: Snapshot) {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(snapshot));
    }

    /// The current snapshot, if any batch has completed.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current snapshot, provided it holds at least one row.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] before the first successful batch
    /// or when the current snapshot is empty.
    pub fn ready(&self) -> Result<Arc<Snapshot>, EngineError> {
        self.current()
            .filter(|s| !s.is_empty())
            .ok_or(EngineError::NotReady)
    }

    /// Rows matching `query` in the current snapshot, highest opinion score
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] when no rows are loaded, so an
    /// empty result always means "no matches".
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<AnnotatedComment>, EngineError> {
        let snapshot = self.ready()?;
        Ok(search(&snapshot.comments, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] when no rows are loaded.
    pub fn statistics(&self) -> Result<Statistics, EngineError> {
        Ok(compute_statistics(&self.ready()?.comments))
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] when no rows are loaded.
    pub fn topics(&self) -> Result<Vec<TopicInfo>, EngineError> {
        Ok(self.ready()?.topics.clone())
    }

    /// The comment with `comment_id` and up to `window` neighbours on each
    /// side. `None` when no row has that id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] when no rows are loaded.
    pub fn context(
        &self,
        comment_id: &str,
        window: usize,
    ) -> Result<Option<Vec<AnnotatedComment>>, EngineError> {
        let snapshot = self.ready()?;
        Ok(context_window(&snapshot.comments, comment_id, window)
            .map(<[AnnotatedComment]>::to_vec))
    }
}
