// src/ingest/types.rs
use anyhow::Result;

use crate::models::{FinancialRecord, TrendPayload};
use crate::tasks::TaskSummary;

/// Task body carried by a queue; receives the enriched trend's field mapping.
pub type TaskFn = fn(&TrendPayload) -> TaskSummary;

/// Writes financial records (database, ledger service, ...).
pub trait Persister: Send + Sync {
    fn persist(&self, record: &FinancialRecord) -> Result<()>;
}

/// Hands a task and its payload to some worker. Must not wait for completion.
pub trait TaskQueue: Send + Sync {
    fn enqueue(&self, task: TaskFn, payload: TrendPayload) -> Result<()>;
}

// Plain closures work as collaborators too.
impl<F> Persister for F
where
    F: Fn(&FinancialRecord) -> Result<()> + Send + Sync,
{
    fn persist(&self, record: &FinancialRecord) -> Result<()> {
        self(record)
    }
}

impl<F> TaskQueue for F
where
    F: Fn(TaskFn, TrendPayload) -> Result<()> + Send + Sync,
{
    fn enqueue(&self, task: TaskFn, payload: TrendPayload) -> Result<()> {
        self(task, payload)
    }
}
