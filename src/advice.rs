//! Advice composition: threshold-gated combination of a match with its topic.
//! No I/O besides the wall clock for the response timestamp.
//!
//! Policy: a topic's advice is returned only when the (clamped) match score
//! reaches the threshold. Presented confidence is then
//! `min(match_score * base_confidence, 1.0)`. Anything else yields the generic
//! fallback advisory with a fixed confidence.

use chrono::Local;
use serde::Serialize;

use crate::knowledge::{KnowledgeBase, KnowledgeError};
use crate::matcher::{score_and_select, MatchResult};

pub const DEFAULT_FALLBACK_CONFIDENCE: f32 = 0.5;

pub const DISCLAIMER: &str = "\n⚠️ 면책 조항: 본 조언은 일반적인 정보 제공 목적으로, 개인의 구체적인 재무상황을 반영하지 않습니다. \n실제 투자 결정 전에는 반드시 전문가와 상담하시기 바랍니다.\n";

pub const FALLBACK_ADVICE: &str = "구체적인 금융 상품이나 상황을 말씀해주시면 더 정확한 조언을 드릴 수 있습니다.\n\n\
📌 질문 가능한 주제:\n\
• 예금/적금: \"안전한 예금 상품 추천해주세요\"\n\
• 연금: \"50대 연금 준비 방법이 궁금해요\"  \n\
• 투자: \"중장년층 투자 방법 알려주세요\"\n\
• 세금: \"연말정산 절세 방법이 있나요\"\n\
• 부동산: \"지금 집을 사도 될까요\"\n\n\
💡 구체적인 상황(나이, 자산규모, 목표 등)을 함께 알려주시면 더 맞춤형 조언이 가능합니다.";

pub const FALLBACK_SOURCES: &[&str] = &["일반 금융 가이드"];
pub const FALLBACK_KEYWORDS: &[&str] = &["금융기초", "상담안내"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvicePolicy {
    pub threshold: f32,
    pub fallback_confidence: f32,
}

impl Default for AdvicePolicy {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            fallback_confidence: DEFAULT_FALLBACK_CONFIDENCE,
        }
    }
}

/// Response body of `POST /advice`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub advice: String,
    /// Presented confidence in [0,1].
    pub confidence: f32,
    pub sources: Vec<String>,
    pub keywords: Vec<String>,
    pub timestamp: String,
    pub disclaimer: String,
    /// Matched topic; `None` for the fallback advisory.
    pub topic: Option<String>,
}

impl Advice {
    pub fn is_fallback(&self) -> bool {
        self.topic.is_none()
    }
}

/// Score `question` and build the response.
pub fn compose(
    kb: &KnowledgeBase,
    question: &str,
    policy: &AdvicePolicy,
) -> Result<Advice, KnowledgeError> {
    let m = score_and_select(kb, question);
    compose_from_match(kb, &m, policy)
}

/// Build the response for an existing match result.
pub fn compose_from_match(
    kb: &KnowledgeBase,
    m: &MatchResult,
    policy: &AdvicePolicy,
) -> Result<Advice, KnowledgeError> {
    let timestamp = Local::now().to_rfc3339();
    let score = m.score();

    match m.topic.as_deref() {
        Some(name) if score >= policy.threshold => {
            let rec = kb.lookup(name)?;
            Ok(Advice {
                advice: rec.advice_text.clone(),
                confidence: (score * rec.base_confidence).min(1.0),
                sources: vec![
                    format!("금융 기초지식: {}", name),
                    "한국은행".to_string(),
                    "금융감독원".to_string(),
                ],
                keywords: rec.keywords.clone(),
                timestamp,
                disclaimer: DISCLAIMER.to_string(),
                topic: Some(name.to_string()),
            })
        }
        _ => Ok(fallback(policy, timestamp)),
    }
}

fn fallback(policy: &AdvicePolicy, timestamp: String) -> Advice {
    Advice {
        advice: FALLBACK_ADVICE.to_string(),
        confidence: policy.fallback_confidence,
        sources: FALLBACK_SOURCES.iter().map(|s| s.to_string()).collect(),
        keywords: FALLBACK_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        timestamp,
        disclaimer: DISCLAIMER.to_string(),
        topic: None,
    }
}
