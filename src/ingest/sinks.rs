// src/ingest/sinks.rs
//! In-process collaborators: no-op and counting persisters for the runner binary,
//! plus in-memory persister/queue used by tests.

use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::ingest::types::{Persister, TaskFn, TaskQueue};
use crate::models::{FinancialRecord, TrendPayload};
use crate::tasks::TaskSummary;

/// Accepts and discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersister;

impl Persister for NoopPersister {
    fn persist(&self, _record: &FinancialRecord) -> Result<()> {
        Ok(())
    }
}

/// Counts records without keeping them; memory stays flat on long runs.
#[derive(Debug, Default)]
pub struct CountingPersister {
    count: AtomicU64,
}

impl CountingPersister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Persister for CountingPersister {
    fn persist(&self, _record: &FinancialRecord) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Keeps a clone of every persisted record. Grows without bound; meant for tests.
#[derive(Debug, Default)]
pub struct MemoryPersister {
    records: Mutex<Vec<FinancialRecord>>,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FinancialRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Persister for MemoryPersister {
    fn persist(&self, record: &FinancialRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

/// Buffers jobs until `run_all` is called.
#[derive(Default)]
pub struct MemoryQueue {
    jobs: Mutex<Vec<(TaskFn, TrendPayload)>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the queued payloads, in enqueue order.
    pub fn payloads(&self) -> Vec<TrendPayload> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Drain the queue, running each task on its payload in FIFO order.
    pub fn run_all(&self) -> Vec<TaskSummary> {
        let jobs = std::mem::take(&mut *self.jobs.lock().unwrap_or_else(PoisonError::into_inner));
        jobs.into_iter().map(|(task, payload)| task(&payload)).collect()
    }
}

impl TaskQueue for MemoryQueue {
    fn enqueue(&self, task: TaskFn, payload: TrendPayload) -> Result<()> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((task, payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::process_enriched_trend;
    use serde_json::json;

    #[test]
    fn memory_queue_runs_jobs_in_order_and_drains() {
        let q = MemoryQueue::new();
        for id in ["a", "b"] {
            let p = json!({ "external_id": id });
            q.enqueue(process_enriched_trend, p.as_object().unwrap().clone())
                .unwrap();
        }
        assert_eq!(q.len(), 2);
        let out = q.run_all();
        assert_eq!(
            out.iter()
                .map(|s| s.enriched_id.clone().unwrap())
                .collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn counting_persister_counts_without_storing() {
        use crate::ingest::Ingestor;
        use std::sync::Arc;

        let counter = Arc::new(CountingPersister::new());
        let ing = Ingestor::new().with_persister(counter.clone());
        for i in 0..3 {
            ing.ingest(&json!({ "external_id": format!("e{i}"), "source": "s", "text": "t" }))
                .unwrap();
        }
        // Rejected events never reach the persister.
        assert!(ing.ingest(&json!({ "source": "s" })).is_err());
        assert_eq!(counter.count(), 3);
    }
}
