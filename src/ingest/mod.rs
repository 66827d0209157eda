// src/ingest/mod.rs
//! Ingestion flow: validate -> enrich -> build trend + ledger record -> persist -> enqueue.
//!
//! Storage and queueing are reached only through the `Persister` / `TaskQueue`
//! collaborators, so the flow itself stays in-memory and synchronous.

pub mod config;
pub mod runner;
pub mod sinks;
pub mod types;
pub mod worker;

use chrono::Utc;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::enrichment::Enricher;
use crate::error::{IngestError, Result};
use crate::ingest::config::IngestConfig;
use crate::ingest::types::{Persister, TaskQueue};
use crate::models::{
    new_id, EmbeddingStatus, EnrichedTrend, FinancialRecord, RawEvent, DEFAULT_CURRENCY,
};
use crate::tasks::process_enriched_trend;

static DEFAULT_INGESTOR: Lazy<Ingestor> = Lazy::new(Ingestor::new);

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Raw events submitted for ingestion.");
        describe_counter!(
            "ingest_rejected_total",
            "Raw events rejected by validation, labelled by reason."
        );
        describe_counter!(
            "ingest_persist_errors_total",
            "Financial record persist failures."
        );
        describe_counter!("ingest_enqueue_errors_total", "Task enqueue failures.");
        describe_counter!("ingest_enqueued_total", "Trends handed to a task queue.");
        describe_counter!(
            "ingest_processed_sync_total",
            "Trends processed inline (no queue configured)."
        );
        describe_counter!(
            "ingest_tasks_processed_total",
            "Tasks run by the channel worker."
        );
        describe_histogram!("ingest_duration_ms", "Time spent in one ingest call.");
    });
}

/// Short, non-reversible fingerprint of the event text. Raw text is never logged.
pub(crate) fn text_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// What happened to the follow-up processing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Handed to a queue; completion is not awaited.
    Enqueued,
    /// No queue configured; the task ran inline.
    ProcessedSync,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Enqueued => "enqueued",
            TaskStatus::ProcessedSync => "processed-sync",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub enriched_id: String,
    pub financial_id: String,
    pub task_status: TaskStatus,
}

/// Configured ingestion pipeline. Cheap to clone; safe to share across threads.
#[derive(Clone)]
pub struct Ingestor {
    enricher: Enricher,
    currency: String,
    persister: Option<Arc<dyn Persister>>,
    queue: Option<Arc<dyn TaskQueue>>,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    /// Stock enrichment rules, USD, no collaborators.
    pub fn new() -> Self {
        Self {
            enricher: Enricher::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            persister: None,
            queue: None,
        }
    }

    pub fn from_config(cfg: &IngestConfig) -> Self {
        Self {
            enricher: Enricher::new(cfg.enrichment.clone()),
            currency: cfg.currency.clone(),
            persister: None,
            queue: None,
        }
    }

    pub fn with_persister(mut self, persister: Arc<dyn Persister>) -> Self {
        self.persister = Some(persister);
        self
    }

    pub fn with_queue(mut self, queue: Arc<dyn TaskQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn ingest(&self, raw: &Value) -> Result<IngestReceipt> {
        self.ingest_with(raw, self.persister.as_deref(), self.queue.as_deref())
    }

    /// Ingest events in order. One result per input; a failure doesn't stop the rest.
    pub fn ingest_batch(&self, raws: &[Value]) -> Vec<Result<IngestReceipt>> {
        raws.iter().map(|raw| self.ingest(raw)).collect()
    }

    fn ingest_with(
        &self,
        raw: &Value,
        persister: Option<&dyn Persister>,
        queue: Option<&dyn TaskQueue>,
    ) -> Result<IngestReceipt> {
        ensure_metrics_described();
        let started = Instant::now();
        counter!("ingest_events_total").increment(1);

        // 1) Validate
        let event = RawEvent::from_value(raw).inspect_err(|e| {
            counter!("ingest_rejected_total", "reason" => e.kind()).increment(1);
            tracing::warn!(target: "ingest", reason = e.kind(), error = %e, "raw event rejected");
        })?;

        // 2) Enrich
        let enrichment = self.enricher.enrich(&event);

        // 3) Trend + ledger record share one timestamp
        let trend = EnrichedTrend {
            id: new_id(),
            external_id: enrichment.external_id,
            source: enrichment.source,
            text: enrichment.text,
            sentiment: enrichment.sentiment,
            topics: enrichment.topics,
            confidence_score: enrichment.confidence_score,
            geo: event.geo,
            enrichment_metadata: enrichment.enrichment_metadata,
            created_at: Utc::now(),
            embedding_status: EmbeddingStatus::Pending,
        };
        let financial = FinancialRecord::zeroed_for(&trend, &self.currency);

        // 4) Persist (no retry, no rollback)
        if let Some(p) = persister {
            p.persist(&financial).map_err(|e| {
                counter!("ingest_persist_errors_total").increment(1);
                tracing::warn!(
                    target: "ingest",
                    financial_id = %financial.id,
                    error = ?e,
                    "persist failed"
                );
                IngestError::Persist(e)
            })?;
        }

        // 5) Enqueue, or process inline
        let task_status = match queue {
            Some(q) => {
                q.enqueue(process_enriched_trend, trend.to_payload())
                    .map_err(|e| {
                        counter!("ingest_enqueue_errors_total").increment(1);
                        tracing::warn!(
                            target: "ingest",
                            enriched_id = %trend.id,
                            error = ?e,
                            "enqueue failed"
                        );
                        IngestError::Enqueue(e)
                    })?;
                counter!("ingest_enqueued_total").increment(1);
                TaskStatus::Enqueued
            }
            None => {
                let summary = process_enriched_trend(&trend.to_payload());
                counter!("ingest_processed_sync_total").increment(1);
                tracing::debug!(target: "ingest", status = %summary.status, "task processed inline");
                TaskStatus::ProcessedSync
            }
        };

        histogram!("ingest_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(
            target: "ingest",
            enriched_id = %trend.id,
            financial_id = %financial.id,
            source = %trend.source,
            text_hash = %text_hash(&trend.text),
            task_status = %task_status,
            "event ingested"
        );

        Ok(IngestReceipt {
            enriched_id: trend.id,
            financial_id: financial.id,
            task_status,
        })
    }
}

/// Process one raw event with the stock rules and optional collaborators.
///
/// Fails with `TypeMismatch` for non-objects and `Validation` when `external_id`,
/// `source` or `text` is missing or empty. Collaborator errors propagate unchanged.
pub fn ingest_event(
    raw: &Value,
    persister: Option<&dyn Persister>,
    queue: Option<&dyn TaskQueue>,
) -> Result<IngestReceipt> {
    DEFAULT_INGESTOR.ingest_with(raw, persister, queue)
}
