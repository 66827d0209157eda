// src/enrichment.rs
//! Keyword heuristics that derive sentiment, topic tags and a confidence score
//! from a raw event. Pure and deterministic; swap in a model-backed enricher later.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::RawEvent;

static DEFAULT_ENRICHER: Lazy<Enricher> = Lazy::new(Enricher::default);

fn default_positive() -> Vec<String> {
    ["good", "great", "love", "awesome"].map(String::from).to_vec()
}
fn default_negative() -> Vec<String> {
    ["bad", "hate", "terrible"].map(String::from).to_vec()
}
fn default_positive_score() -> f64 {
    0.8
}
fn default_negative_score() -> f64 {
    -0.6
}
fn default_confidence() -> f64 {
    0.9
}
fn default_version() -> String {
    "0.1".to_string()
}
fn default_topics() -> Vec<TopicRule> {
    vec![TopicRule {
        tag: "ai".to_string(),
        keywords: vec!["ai".to_string(), "artificial intelligence".to_string()],
    }]
}

/// Tag appended when the lower-cased text contains any of `keywords`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRule {
    pub tag: String,
    pub keywords: Vec<String>,
}

/// Tunables for the heuristics. `Default` is the stock rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRules {
    #[serde(default = "default_positive")]
    pub positive_keywords: Vec<String>,
    #[serde(default = "default_negative")]
    pub negative_keywords: Vec<String>,
    #[serde(default = "default_positive_score")]
    pub positive_score: f64,
    #[serde(default = "default_negative_score")]
    pub negative_score: f64,
    #[serde(default)]
    pub neutral_score: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicRule>,
}

impl Default for EnrichmentRules {
    fn default() -> Self {
        Self {
            positive_keywords: default_positive(),
            negative_keywords: default_negative(),
            positive_score: default_positive_score(),
            negative_score: default_negative_score(),
            neutral_score: 0.0,
            confidence: default_confidence(),
            version: default_version(),
            topics: default_topics(),
        }
    }
}

impl EnrichmentRules {
    /// Trim + lower-case keywords, drop empties and duplicates (first occurrence wins).
    pub fn normalized(mut self) -> Self {
        self.positive_keywords = clean_keywords(self.positive_keywords);
        self.negative_keywords = clean_keywords(self.negative_keywords);
        self.topics = self
            .topics
            .into_iter()
            .map(|t| TopicRule {
                tag: t.tag.trim().to_string(),
                keywords: clean_keywords(t.keywords),
            })
            .filter(|t| !t.tag.is_empty() && !t.keywords.is_empty())
            .collect();
        self
    }
}

fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Derived fields for one raw event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub external_id: String,
    pub source: String,
    pub text: String,
    pub sentiment: Option<f64>,
    pub topics: Vec<String>,
    pub confidence_score: Option<f64>,
    pub enrichment_metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Enricher {
    rules: EnrichmentRules,
}

impl Enricher {
    /// Rules are normalized here, so keywords built in code match like configured ones.
    pub fn new(rules: EnrichmentRules) -> Self {
        Self {
            rules: rules.normalized(),
        }
    }

    pub fn enrich(&self, event: &RawEvent) -> Enrichment {
        let lower = event.text.to_lowercase();

        let mut metadata = Map::new();
        metadata.insert(
            "enr_version".to_string(),
            Value::String(self.rules.version.clone()),
        );

        Enrichment {
            external_id: event.external_id.clone(),
            source: event.source.clone(),
            text: event.text.clone(),
            sentiment: Some(self.sentiment(&lower)),
            topics: self.topics(&lower),
            confidence_score: Some(self.rules.confidence),
            enrichment_metadata: metadata,
        }
    }

    /// Substring match on lower-cased text; positive wins over negative.
    fn sentiment(&self, lower: &str) -> f64 {
        let r = &self.rules;
        if contains_any(lower, &r.positive_keywords) {
            r.positive_score
        } else if contains_any(lower, &r.negative_keywords) {
            r.negative_score
        } else {
            r.neutral_score
        }
    }

    fn topics(&self, lower: &str) -> Vec<String> {
        self.rules
            .topics
            .iter()
            .filter(|t| contains_any(lower, &t.keywords))
            .map(|t| t.tag.clone())
            .collect()
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// Enrich with the stock rule set.
pub fn enrich_event(event: &RawEvent) -> Enrichment {
    DEFAULT_ENRICHER.enrich(event)
}
