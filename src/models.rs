// src/models.rs
//! Records produced by one ingestion call: the validated raw event, the enriched
//! trend, and its cost ledger entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{IngestError, Result};

/// Field mapping of an enriched trend, as handed to task functions.
pub type TrendPayload = Map<String, Value>;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Incoming event as posted by an upstream fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub external_id: String, // caller-supplied unique key
    pub source: String,      // e.g., "twitter", "reddit"
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RawEvent {
    /// Validate an arbitrary JSON value into a `RawEvent`.
    ///
    /// Non-objects fail with `TypeMismatch`. Every required field that is absent,
    /// not a string, or empty is reported together in one `Validation` error.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let obj = raw.as_object().ok_or(IngestError::TypeMismatch {
            found: json_type_name(raw),
        })?;

        let mut missing = Vec::new();
        let external_id = required_str(obj, "external_id", &mut missing);
        let source = required_str(obj, "source", &mut missing);
        let text = required_str(obj, "text", &mut missing);

        let (Some(external_id), Some(source), Some(text)) = (external_id, source, text) else {
            return Err(IngestError::Validation { missing });
        };

        let geo = obj.get("geo").filter(|v| !v.is_null()).cloned();
        let timestamp = obj
            .get("timestamp")
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });

        Ok(Self {
            external_id,
            source,
            text,
            geo,
            timestamp,
        })
    }
}

fn required_str(
    obj: &Map<String, Value>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let v = obj
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if v.is_none() {
        missing.push(name);
    }
    v
}

/// Name of the JSON type, for error messages.
fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Lifecycle of the vector embedding attached to a trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingStatus {
    #[default]
    Pending,
    Embedded,
    Failed,
}

impl EmbeddingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingStatus::Pending => "pending",
            EmbeddingStatus::Embedded => "embedded",
            EmbeddingStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for EmbeddingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw event plus derived sentiment, topics and confidence.
/// Created once per ingestion call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTrend {
    pub id: String,
    pub external_id: String,
    pub source: String,
    pub text: String,
    /// Roughly -1.0 ..= 1.0.
    pub sentiment: Option<f64>,
    pub topics: Vec<String>,
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub geo: Option<Value>,
    #[serde(default)]
    pub enrichment_metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub embedding_status: EmbeddingStatus,
}

impl EnrichedTrend {
    /// Serialized field mapping, the shape task functions receive.
    pub fn to_payload(&self) -> TrendPayload {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // Unreachable for plain data; logged in case a field type ever changes.
            other => {
                tracing::warn!(
                    target: "ingest",
                    enriched_id = %self.id,
                    result = ?other.map(|v| json_type_name(&v)),
                    "trend did not serialize to an object; task gets an empty payload"
                );
                TrendPayload::new()
            }
        }
    }
}

/// Cost ledger entry, exactly one per `EnrichedTrend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: String,
    pub enriched_trend_id: String,
    /// Abstract token units.
    pub cost_tokens: f64,
    pub currency: String,
    pub compute_duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub invoice_reference: Option<String>,
}

impl FinancialRecord {
    /// Zero-cost placeholder entry for `trend`; real cost accounting is not wired yet.
    pub fn zeroed_for(trend: &EnrichedTrend, currency: &str) -> Self {
        Self {
            id: new_id(),
            enriched_trend_id: trend.id.clone(),
            cost_tokens: 0.0,
            currency: currency.to_string(),
            compute_duration_ms: 0,
            timestamp: trend.created_at,
            invoice_reference: None,
        }
    }
}

/// Pointer to a trend's vector embedding in an external vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub enriched_trend_id: String,
    pub vector_id: Option<String>,
    pub embedding_status: EmbeddingStatus,
    pub created_at: DateTime<Utc>,
}

impl EmbeddingRecord {
    pub fn pending_for(trend: &EnrichedTrend) -> Self {
        Self {
            id: new_id(),
            enriched_trend_id: trend.id.clone(),
            vector_id: None,
            embedding_status: EmbeddingStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
