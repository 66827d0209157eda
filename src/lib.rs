// src/lib.rs
// Public library surface for the runner binary and integration tests.

pub mod enrichment;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod tasks;

// ---- Re-exports for stable public API ----
pub use crate::enrichment::{enrich_event, Enricher, EnrichmentRules};
pub use crate::error::IngestError;
pub use crate::ingest::types::{Persister, TaskFn, TaskQueue};
pub use crate::ingest::{ingest_event, IngestReceipt, Ingestor, TaskStatus};
pub use crate::models::{EmbeddingRecord, EmbeddingStatus, EnrichedTrend, FinancialRecord, RawEvent};
pub use crate::tasks::{process_enriched_trend, TaskSummary};
