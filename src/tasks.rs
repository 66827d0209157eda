// src/tasks.rs
//! Background task bodies. Plain functions so any queue can carry them as `TaskFn`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::TrendPayload;

pub const STATUS_PROCESSED: &str = "processed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Echoes the payload's `external_id`.
    pub enriched_id: Option<String>,
    pub status: String,
}

/// Process an enriched trend (placeholder: summary only).
///
/// Never fails; a missing or non-string `external_id` yields `enriched_id: None`.
pub fn process_enriched_trend(payload: &TrendPayload) -> TaskSummary {
    TaskSummary {
        enriched_id: payload
            .get("external_id")
            .and_then(Value::as_str)
            .map(str::to_string),
        status: STATUS_PROCESSED.to_string(),
    }
}
