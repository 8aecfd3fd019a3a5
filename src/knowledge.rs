//! # Knowledge Base
//!
//! Fixed set of financial topics the matcher scores questions against.
//!
//! - Built-in seed authored as literal data (`builtin()`), shared through a
//!   process-wide `Lazy` and never mutated.
//! - Optional override from a TOML file (`[[topics]]` tables).
//! - Authoring order is preserved; the matcher relies on it for tie-breaks.
//! - Lookups by unknown name are recoverable (`Option` / `KnowledgeError`).

use anyhow::{anyhow, Context};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Process-wide built-in knowledge base.
pub static BUILTIN: Lazy<KnowledgeBase> = Lazy::new(KnowledgeBase::builtin);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("topic not found: {0}")]
    NotFound(String),
}

/// One financial topic with its canned advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub name: String,
    #[serde(rename = "advice")]
    pub advice_text: String,
    /// Authored trust in the advice itself, in [0,1]. Unrelated to match quality.
    #[serde(rename = "confidence")]
    pub base_confidence: f32,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Weaker signals; names here need not exist in the knowledge base.
    #[serde(default)]
    pub related_topics: Vec<String>,
}

impl TopicRecord {
    pub fn new(
        name: &str,
        advice_text: &str,
        base_confidence: f32,
        keywords: &[&str],
        related_topics: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            advice_text: advice_text.to_string(),
            base_confidence,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            related_topics: related_topics.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    topics: Vec<TopicRecord>,
}

/// Immutable, ordered mapping from topic name to record.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    topics: Vec<TopicRecord>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from records, keeping their order.
    /// Rejects empty or duplicate names, blank matching terms and confidences outside [0,1].
    pub fn from_records(topics: Vec<TopicRecord>) -> anyhow::Result<Self> {
        let mut index = HashMap::with_capacity(topics.len());
        for (i, t) in topics.iter().enumerate() {
            if t.name.trim().is_empty() {
                return Err(anyhow!("topic #{} has an empty name", i));
            }
            if !t.base_confidence.is_finite() || !(0.0..=1.0).contains(&t.base_confidence) {
                return Err(anyhow!(
                    "topic `{}` confidence {} is outside [0,1]",
                    t.name,
                    t.base_confidence
                ));
            }
            // A blank term is a substring of every question.
            if let Some(term) = t
                .keywords
                .iter()
                .chain(&t.related_topics)
                .find(|k| k.trim().is_empty())
            {
                return Err(anyhow!(
                    "topic `{}` has a blank keyword or related topic ({:?})",
                    t.name,
                    term
                ));
            }
            if index.insert(t.name.clone(), i).is_some() {
                return Err(anyhow!("duplicate topic `{}`", t.name));
            }
        }
        Ok(Self { topics, index })
    }

    /// Parse a `[[topics]]` TOML document.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let file: KnowledgeFile = toml::from_str(toml_str).context("parsing knowledge base TOML")?;
        Self::from_records(file.topics)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading knowledge base from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading knowledge base from {}", path.display()))
    }

    /// Topics from `path` if given, otherwise the built-in set.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(BUILTIN.clone()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TopicRecord> {
        self.index.get(name).map(|&i| &self.topics[i])
    }

    pub fn lookup(&self, name: &str) -> Result<&TopicRecord, KnowledgeError> {
        self.get(name)
            .ok_or_else(|| KnowledgeError::NotFound(name.to_string()))
    }

    /// `(name, record)` pairs in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TopicRecord)> + '_ {
        self.topics.iter().map(|t| (t.name.as_str(), t))
    }

    pub fn names(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Mean authored confidence; `None` for an empty knowledge base.
    pub fn average_confidence(&self) -> Option<f32> {
        if self.topics.is_empty() {
            return None;
        }
        let sum: f32 = self.topics.iter().map(|t| t.base_confidence).sum();
        Some(sum / self.topics.len() as f32)
    }

    /// The six reference topics.
    pub fn builtin() -> Self {
        let topics = vec![
            TopicRecord::new(
                "예금",
                "예금은 원금이 100% 보장되는 가장 안전한 금융상품입니다. \n\n\
📌 주요 특징:\n\
• 예금자보호법에 의해 1인당 5천만원까지 보호\n\
• 현재 시중은행 정기예금 금리: 연 3.0~3.5% 내외\n\
• 중도해지시 약정금리보다 낮은 금리 적용\n\n\
💡 중장년층 추천사항:\n\
• 생활비 6개월분은 입출금이 자유로운 적금에 보관\n\
• 목돈은 1~2년 정기예금으로 안전하게 운용\n\
• 금리 변동 대비 단계별 만기 분산 고려",
                0.95,
                &["안전", "원금보장", "예금자보호", "정기예금", "적금"],
                &["적금", "금리", "안전투자"],
            ),
            TopicRecord::new(
                "적금",
                "적금은 매월 일정 금액을 저축하여 목돈을 마련하는 상품입니다.\n\n\
📌 주요 특징:\n\
• 매월 10만원~50만원 정도 납입 (상품별 상이)\n\
• 복리 효과로 단순 저축보다 유리\n\
• 중도해지시 약정금리 하향 적용\n\n\
💡 중장년층 활용법:\n\
• 은퇴자금 마련용으로 5년 이상 장기 적금 활용\n\
• 자녀 교육비, 결혼자금 등 목적자금 마련\n\
• 연금저축과 병행하여 세제혜택 극대화\n\n\
⚠️ 주의사항: 중도해지시 금리 손실이 크므로 여유자금으로만 가입",
                0.90,
                &["목돈마련", "복리효과", "장기저축", "정기적립"],
                &["예금", "연금저축", "목표설정"],
            ),
            TopicRecord::new(
                "연금",
                "연금은 은퇴 후 안정적인 노후생활을 위한 필수 준비입니다.\n\n\
📌 연금의 종류:\n\
• 국민연금: 의무가입, 평균 월 55만원 정도 수령\n\
• 개인연금(연금저축): 세액공제 연 400만원까지\n\
• 퇴직연금(DC형/DB형): 직장 통해 가입\n\n\
💡 중장년층 전략:\n\
• 50대: 개인연금 추가납입으로 절세 + 노후준비\n\
• 연금저축펀드보다 연금저축보험이 원금보장 측면에서 안전\n\
• 국민연금 임의계속가입으로 수령액 증대 고려\n\n\
📊 권장 비중: 안전자산(예적금) 70% + 연금상품 30%",
                0.92,
                &["노후준비", "세액공제", "개인연금", "국민연금", "퇴직연금"],
                &["세금", "은퇴계획", "안전투자"],
            ),
            TopicRecord::new(
                "투자",
                "중장년층 투자는 '안전성'을 최우선으로 해야 합니다.\n\n\
📌 기본 원칙:\n\
• 원금 손실 위험이 있는 투자는 여유자금으로만\n\
• 전체 자산의 20~30%를 넘지 않도록 제한\n\
• 단기 수익보다 장기 안정성 추구\n\n\
💡 추천 투자처:\n\
• 국고채, 회사채 등 채권형 펀드\n\
• 배당주 중심의 안정적인 주식\n\
• 리츠(REITs) - 부동산 간접투자\n\n\
⚠️ 피해야 할 투자:\n\
• 고위험 파생상품, 선물거래\n\
• 원금보장 안 되는 구조화상품\n\
• 이해하지 못하는 복잡한 상품",
                0.85,
                &["안전투자", "분산투자", "채권펀드", "배당주", "리츠"],
                &["위험관리", "자산배분", "포트폴리오"],
            ),
            TopicRecord::new(
                "세금",
                "중장년층은 절세를 통해 실질소득을 늘릴 수 있습니다.\n\n\
📌 주요 절세 방법:\n\
• 연금저축 세액공제: 연 400만원까지 16.5% 공제\n\
• 퇴직연금 세액공제: 연 700만원까지 추가 공제\n\
• 청약통장: 연 240만원까지 소득공제\n\n\
💡 실전 절세팁:\n\
• 의료비 공제: 총급여의 3% 초과분 공제\n\
• 신용카드 소득공제: 총급여의 25% 초과 사용분\n\
• 기부금 공제: 정치후원금, 종교단체 기부\n\n\
📊 50대 맞벌이 기준 연간 절세효과: 50~100만원 가능",
                0.88,
                &["세액공제", "소득공제", "연금저축", "의료비공제", "절세"],
                &["연금", "재무계획", "소득관리"],
            ),
            TopicRecord::new(
                "부동산",
                "중장년층 부동산 투자는 신중한 접근이 필요합니다.\n\n\
📌 현재 시장 상황 (2024년 기준):\n\
• 고금리로 인한 매수심리 위축\n\
• 지역별 격차 심화 (수도권 vs 지방)\n\
• 전세시장 불안정성 지속\n\n\
💡 중장년층 부동산 전략:\n\
• 실거주 목적이 우선, 투자는 부차적으로 고려\n\
• 대출 비중 최소화 (총 자산 대비 40% 이하)\n\
• 유지비용 (세금, 관리비) 충분히 고려\n\n\
⚠️ 주의사항: \n\
• 노후자금을 부동산에 과도하게 집중 금지\n\
• 유동성 부족 문제 심각하게 고려",
                0.80,
                &["부동산투자", "실거주", "대출비중", "유동성", "세금"],
                &["자산배분", "위험관리", "유동성관리"],
            ),
        ];

        let index = topics
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self { topics, index }
    }
}
