// tests/enrichment.rs
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use trend_ingest::{enrich_event, Enricher, EnrichmentRules, RawEvent};

const WORDS: &[&str] = &[
    "markets", "love", "Terrible", "AI", "weather", "GREAT", "robots", "bad", "news", "today",
    "artificial", "intelligence", "hate", "coffee", "awesome", "the",
];

fn raw(text: &str) -> RawEvent {
    RawEvent {
        external_id: "evt-42".to_string(),
        source: "twitter".to_string(),
        text: text.to_string(),
        geo: None,
        timestamp: None,
    }
}

#[test]
fn love_ai_example() {
    let e = enrich_event(&raw("I love AI"));
    assert_eq!(e.external_id, "evt-42");
    assert_eq!(e.source, "twitter");
    assert_eq!(e.text, "I love AI");
    assert_eq!(e.sentiment, Some(0.8));
    assert_eq!(e.topics, vec!["ai".to_string()]);
    assert_eq!(e.confidence_score, Some(0.9));
}

#[test]
fn awesome_ai_is_tagged() {
    let e = enrich_event(&raw("AI is awesome"));
    assert!(e.topics.contains(&"ai".to_string()));
}

#[test]
fn matching_is_substring_based() {
    // "goodbye" contains "good"; "said" contains "ai".
    let e = enrich_event(&raw("she said goodbye"));
    assert_eq!(e.sentiment, Some(0.8));
    assert_eq!(e.topics, vec!["ai".to_string()]);
}

#[test]
fn enricher_is_pure_over_random_texts() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let stock = Enricher::new(EnrichmentRules::default());
    for _ in 0..300 {
        let n = rng.random_range(1..8);
        let text = (0..n)
            .map(|_| WORDS[rng.random_range(0..WORDS.len())])
            .collect::<Vec<_>>()
            .join(" ");
        let ev = raw(&text);

        let first = enrich_event(&ev);
        let second = enrich_event(&ev);
        assert_eq!(first, second, "text: {text}");
        // The free function uses the stock rules.
        assert_eq!(first, stock.enrich(&ev));

        let s = first.sentiment.unwrap();
        assert!(s == 0.8 || s == -0.6 || s == 0.0, "unexpected sentiment {s}");
        assert_eq!(first.confidence_score, Some(0.9));
    }
}
