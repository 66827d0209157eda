// tests/ingest_pipeline.rs
use anyhow::anyhow;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

use trend_ingest::ingest::sinks::{MemoryPersister, MemoryQueue, NoopPersister};
use trend_ingest::models::TrendPayload;
use trend_ingest::{ingest_event, FinancialRecord, IngestError, Ingestor, TaskFn, TaskStatus};

fn evt42() -> serde_json::Value {
    json!({ "external_id": "evt-42", "source": "twitter", "text": "I love AI" })
}

#[test]
fn happy_path_persists_one_record_and_processes_inline() {
    let captured: Mutex<Vec<FinancialRecord>> = Mutex::new(Vec::new());
    let write_financial_record = |fr: &FinancialRecord| -> anyhow::Result<()> {
        captured.lock().push(fr.clone());
        Ok(())
    };

    let out = ingest_event(&evt42(), Some(&write_financial_record), None).unwrap();

    assert!(!out.enriched_id.is_empty());
    assert!(!out.financial_id.is_empty());
    assert_ne!(out.enriched_id, out.financial_id);
    assert_eq!(out.task_status, TaskStatus::ProcessedSync);

    let recs = captured.lock();
    assert_eq!(recs.len(), 1);
    let fr = &recs[0];
    assert_eq!(fr.id, out.financial_id);
    assert_eq!(fr.enriched_trend_id, out.enriched_id);
    assert_eq!(fr.cost_tokens, 0.0);
    assert_eq!(fr.currency, "USD");
    assert_eq!(fr.compute_duration_ms, 0);
    assert!(fr.invoice_reference.is_none());
}

#[test]
fn no_collaborators_still_succeeds() {
    let out = ingest_event(&evt42(), None, None).unwrap();
    assert_eq!(out.task_status.as_str(), "processed-sync");
}

#[test]
fn queue_gets_trend_payload_and_status_is_enqueued() {
    let queue = MemoryQueue::new();
    let out = ingest_event(&evt42(), Some(&NoopPersister), Some(&queue)).unwrap();
    assert_eq!(out.task_status, TaskStatus::Enqueued);

    let payloads = queue.payloads();
    assert_eq!(payloads.len(), 1);
    let p = &payloads[0];
    assert_eq!(p["id"], json!(out.enriched_id));
    assert_eq!(p["external_id"], json!("evt-42"));
    assert_eq!(p["sentiment"], json!(0.8));
    assert_eq!(p["topics"], json!(["ai"]));
    assert_eq!(p["confidence_score"], json!(0.9));
    assert_eq!(p["embedding_status"], json!("pending"));
    assert_eq!(p["enrichment_metadata"], json!({ "enr_version": "0.1" }));

    // Enqueued tasks only run when the queue is drained.
    let summaries = queue.run_all();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].enriched_id.as_deref(), Some("evt-42"));
    assert_eq!(summaries[0].status, "processed");
}

#[test]
fn closure_queue_receives_task_fn() {
    let seen: Mutex<Vec<TrendPayload>> = Mutex::new(Vec::new());
    let enqueue = |task: TaskFn, payload: TrendPayload| -> anyhow::Result<()> {
        let summary = task(&payload);
        assert_eq!(summary.status, "processed");
        seen.lock().push(payload);
        Ok(())
    };
    let out = ingest_event(&evt42(), None, Some(&enqueue)).unwrap();
    assert_eq!(out.task_status, TaskStatus::Enqueued);
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn same_external_id_twice_gives_distinct_pairs() {
    let store = Arc::new(MemoryPersister::new());
    let ing = Ingestor::new().with_persister(store.clone());
    let a = ing.ingest(&evt42()).unwrap();
    let b = ing.ingest(&evt42()).unwrap();
    assert_ne!(a.enriched_id, b.enriched_id);
    assert_ne!(a.financial_id, b.financial_id);
    assert_eq!(store.len(), 2);
}

#[test]
fn persist_failure_propagates_and_skips_enqueue() {
    let failing = |_: &FinancialRecord| -> anyhow::Result<()> { Err(anyhow!("ledger offline")) };
    let queue = MemoryQueue::new();
    let err = ingest_event(&evt42(), Some(&failing), Some(&queue)).unwrap_err();
    assert!(matches!(err, IngestError::Persist(_)));
    assert_eq!(err.to_string(), "ledger offline");
    assert!(queue.is_empty());
}

#[test]
fn enqueue_failure_propagates_after_persist() {
    let store = MemoryPersister::new();
    let broken = |_: TaskFn, _: TrendPayload| -> anyhow::Result<()> { Err(anyhow!("queue full")) };
    let err = ingest_event(&evt42(), Some(&store), Some(&broken)).unwrap_err();
    assert!(matches!(err, IngestError::Enqueue(_)));
    // The ledger write already happened; there is no rollback.
    assert_eq!(store.len(), 1);
}

#[test]
fn batch_keeps_going_after_failures() {
    let ing = Ingestor::new().with_queue(Arc::new(MemoryQueue::new()));
    let results = ing.ingest_batch(&[
        evt42(),
        json!("not an object"),
        json!({ "source": "twitter", "text": "no id" }),
        json!({ "external_id": "evt-43", "source": "reddit", "text": "bad day" }),
    ]);
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_type_mismatch());
    assert!(results[2].as_ref().unwrap_err().is_validation());
    assert_eq!(
        results[3].as_ref().unwrap().task_status,
        TaskStatus::Enqueued
    );
}

#[test]
fn receipt_serializes_with_wire_names() {
    let out = ingest_event(&evt42(), None, None).unwrap();
    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["task_status"], json!("processed-sync"));
    assert!(v["enriched_id"].is_string());
    assert!(v["financial_id"].is_string());
}

#[test]
fn geo_is_copied_onto_the_trend_payload() {
    let queue = MemoryQueue::new();
    let with_geo = json!({
        "external_id": "evt-44",
        "source": "twitter",
        "text": "I love AI",
        "geo": { "lat": 1, "lon": 2 }
    });
    ingest_event(&with_geo, None, Some(&queue)).unwrap();
    ingest_event(&evt42(), None, Some(&queue)).unwrap();

    let payloads = queue.payloads();
    assert_eq!(payloads[0]["geo"], json!({ "lat": 1, "lon": 2 }));
    // Absent geo still shows up in the mapping, as null.
    assert!(payloads[1].contains_key("geo"));
    assert_eq!(payloads[1]["geo"], serde_json::Value::Null);
}
