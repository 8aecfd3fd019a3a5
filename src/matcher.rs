// src/matcher.rs
//! Topic matcher: additive substring scoring over the knowledge base.
//!
//! Per topic, against the lowercased question:
//! - topic name present      : +0.8
//! - each keyword present    : +0.3 (stacks, no cap)
//! - each related topic      : +0.2 (stacks, no cap)
//!
//! The best topic is the first one whose score is strictly greater than every
//! earlier score, so ties go to the topic authored first. Comparison uses the
//! unclamped sums; only the reported score is clamped to [0,1].

use tracing::info;

use crate::knowledge::{KnowledgeBase, TopicRecord};
use crate::telemetry::{dev_logging_enabled, question_fingerprint, truncate_vec};

pub const NAME_WEIGHT: f32 = 0.8;
pub const KEYWORD_WEIGHT: f32 = 0.3;
pub const RELATED_WEIGHT: f32 = 0.2;

/// Outcome of scoring one question.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchResult {
    pub topic: Option<String>,
    /// Unclamped winning sum; may exceed 1.0.
    pub raw_score: f32,
    /// Terms that contributed to the winning topic, e.g. `keyword:적금`.
    pub hits: Vec<String>,
}

impl MatchResult {
    /// Score reported to callers, clamped to [0,1].
    pub fn score(&self) -> f32 {
        self.raw_score.min(1.0)
    }

    pub fn is_match(&self) -> bool {
        self.topic.is_some()
    }
}

/// Score a single topic against an already lowercased question.
/// Returns the unclamped sum and the contributing terms.
pub fn score_topic(record: &TopicRecord, question_lower: &str) -> (f32, Vec<String>) {
    let mut score = 0.0f32;
    let mut hits = Vec::new();

    if question_lower.contains(&record.name.to_lowercase()) {
        score += NAME_WEIGHT;
        hits.push(format!("name:{}", record.name));
    }

    for kw in &record.keywords {
        if question_lower.contains(&kw.to_lowercase()) {
            score += KEYWORD_WEIGHT;
            hits.push(format!("keyword:{}", kw));
        }
    }

    for rel in &record.related_topics {
        if question_lower.contains(&rel.to_lowercase()) {
            score += RELATED_WEIGHT;
            hits.push(format!("related:{}", rel));
        }
    }

    (score, hits)
}

/// Pick the best-scoring topic for `question`. Never fails: empty input or an
/// empty knowledge base yields a result with no topic and score 0.0.
pub fn score_and_select(kb: &KnowledgeBase, question: &str) -> MatchResult {
    let q = question.to_lowercase();
    let mut best = MatchResult::default();

    for (name, record) in kb.iter() {
        let (score, hits) = score_topic(record, &q);
        if score > best.raw_score {
            best = MatchResult {
                topic: Some(name.to_string()),
                raw_score: score,
                hits,
            };
        }
    }

    dev_log_match(question, &best);
    best
}

fn dev_log_match(question: &str, m: &MatchResult) {
    if !dev_logging_enabled() {
        return;
    }
    let id = question_fingerprint(question);
    info!(
        target: "matcher",
        %id,
        topic = m.topic.as_deref().unwrap_or("-"),
        raw_score = m.raw_score,
        hits = ?truncate_vec(&m.hits, 5)
    );
}
