// src/ingest/worker.rs
use anyhow::anyhow;
use metrics::counter;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ingest::types::{TaskFn, TaskQueue};
use crate::models::TrendPayload;

struct Job {
    task: TaskFn,
    payload: TrendPayload,
}

/// Queue backed by an unbounded tokio channel. `enqueue` never blocks.
#[derive(Clone)]
pub struct ChannelQueue {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving half, consumed by `spawn_task_worker`.
pub struct TaskReceiver {
    rx: mpsc::UnboundedReceiver<Job>,
}

pub fn task_channel() -> (ChannelQueue, TaskReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelQueue { tx }, TaskReceiver { rx })
}

impl TaskQueue for ChannelQueue {
    fn enqueue(&self, task: TaskFn, payload: TrendPayload) -> anyhow::Result<()> {
        self.tx
            .send(Job { task, payload })
            .map_err(|_| anyhow!("task worker has shut down"))
    }
}

/// Spawn a worker draining the channel in FIFO order.
/// Finishes once every `ChannelQueue` clone is dropped; yields the number of tasks run.
pub fn spawn_task_worker(receiver: TaskReceiver) -> JoinHandle<u64> {
    let mut rx = receiver.rx;
    tokio::spawn(async move {
        let mut processed = 0u64;
        while let Some(job) = rx.recv().await {
            let summary = (job.task)(&job.payload);
            processed += 1;
            counter!("ingest_tasks_processed_total").increment(1);
            tracing::info!(
                target: "ingest",
                enriched_id = summary.enriched_id.as_deref().unwrap_or("-"),
                status = %summary.status,
                "task processed"
            );
        }
        tracing::debug!(target: "ingest", processed, "task worker stopped");
        processed
    })
}
