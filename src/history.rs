//! history.rs — bounded in-memory log of advice outcomes for admin stats.
//! Entries carry a question fingerprint, never the question itself.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::advice::Advice;
use crate::telemetry::question_fingerprint;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub question_id: String,
    pub topic: Option<String>,
    pub confidence: f32,
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Counters {
    pub total: u64,
    pub fallback: u64,
}

#[derive(Debug)]
pub struct AdviceHistory {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
    total: AtomicU64,
    fallback: AtomicU64,
}

impl AdviceHistory {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
            total: AtomicU64::new(0),
            fallback: AtomicU64::new(0),
        }
    }

    pub fn record(&self, question: &str, advice: &Advice) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if advice.is_fallback() {
            self.fallback.fetch_add(1, Ordering::Relaxed);
        }

        let entry = HistoryEntry {
            timestamp: advice.timestamp.clone(),
            question_id: question_fingerprint(question),
            topic: advice.topic.clone(),
            confidence: advice.confidence,
            fallback: advice.is_fallback(),
        };

        // A poisoned lock only means another request panicked mid-push; the data is still usable.
        let mut v = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn counters(&self) -> Counters {
        Counters {
            total: self.total.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }
}

impl Default for AdviceHistory {
    fn default() -> Self {
        Self::with_capacity(500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{compose, AdvicePolicy};
    use crate::knowledge::KnowledgeBase;

    #[test]
    fn counts_and_caps() {
        let kb = KnowledgeBase::builtin();
        let p = AdvicePolicy::default();
        let h = AdviceHistory::with_capacity(2);

        for q in ["예금 상품 추천해주세요", "오늘 날씨가 좋네요", "연금 준비 방법"] {
            let a = compose(&kb, q, &p).unwrap();
            h.record(q, &a);
        }

        let c = h.counters();
        assert_eq!(c.total, 3);
        assert_eq!(c.fallback, 1);

        let last = h.snapshot_last_n(10);
        assert_eq!(last.len(), 2, "capacity bounds the buffer");
        assert!(last[0].fallback);
        assert_eq!(last[1].topic.as_deref(), Some("연금"));
        assert_eq!(last[1].question_id, question_fingerprint("연금 준비 방법"));
    }
}
