// src/api.rs
//! HTTP surface: advice, topic listing, health, admin stats, static UI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::advice::{compose, Advice, AdvicePolicy};
use crate::config::settings::Settings;
use crate::history::AdviceHistory;
use crate::knowledge::KnowledgeBase;
use crate::metrics::{self, Metrics};
use crate::telemetry::question_fingerprint;

pub const MIN_QUESTION_CHARS: usize = 5;
pub const MAX_QUESTION_CHARS: usize = 200;

const INTERNAL_ERROR_MESSAGE: &str = "조언 생성 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

#[derive(Clone)]
pub struct AppState {
    pub knowledge: Arc<KnowledgeBase>,
    pub settings: Arc<Settings>,
    pub history: Arc<AdviceHistory>,
    pub started: Instant,
}

impl AppState {
    pub fn new(knowledge: KnowledgeBase, settings: Settings) -> Self {
        Self {
            knowledge: Arc::new(knowledge),
            settings: Arc::new(settings),
            history: Arc::new(AdviceHistory::default()),
            started: Instant::now(),
        }
    }

    /// Load the knowledge base named by `settings` (or the built-in one).
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let kb = KnowledgeBase::load(settings.knowledge_base_path.as_deref())?;
        info!(
            topics = kb.len(),
            custom = settings.knowledge_base_path.is_some(),
            "knowledge base loaded"
        );
        Ok(Self::new(kb, settings))
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_settings(Settings::from_env())
    }

    fn policy(&self) -> AdvicePolicy {
        self.settings.advice_policy()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": msg }))).into_response()
            }
            ApiError::Internal(e) => {
                error!(error = %e, "advice generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": INTERNAL_ERROR_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    let static_dir: PathBuf = state.settings.static_dir.clone();
    let debug_routes = state.settings.debug_routes;
    let threshold = state.settings.confidence_threshold;

    let mut app = Router::new()
        .route("/", get(root))
        .route("/advice", post(advice))
        .route("/health", get(health))
        .route("/topics", get(topics))
        .route("/admin/stats", get(admin_stats))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state);

    if debug_routes {
        match Metrics::init(threshold) {
            Ok(m) => app = app.merge(m.router()),
            Err(e) => warn!(error = %e, "metrics route disabled"),
        }
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub text: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_age_group")]
    pub age_group: String,
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

fn default_age_group() -> String {
    "50-60대".to_string()
}

impl AdviceRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let n = self.text.chars().count();
        if n < MIN_QUESTION_CHARS {
            return Err(ApiError::Validation(format!(
                "text must be at least {} characters (got {})",
                MIN_QUESTION_CHARS, n
            )));
        }
        if n > MAX_QUESTION_CHARS {
            return Err(ApiError::Validation(format!(
                "text must be at most {} characters (got {})",
                MAX_QUESTION_CHARS, n
            )));
        }
        Ok(())
    }
}

async fn advice(
    State(state): State<AppState>,
    payload: Result<Json<AdviceRequest>, JsonRejection>,
) -> Result<Json<Advice>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    req.validate()?;

    info!(
        user_id = %req.user_id,
        age_group = %req.age_group,
        question = %question_fingerprint(&req.text),
        "advice request"
    );

    let advice = compose(&state.knowledge, &req.text, &state.policy())
        .map_err(|e| ApiError::Internal(e.into()))?;

    state.history.record(&req.text, &advice);
    metrics::record_advice(&advice);

    Ok(Json(advice))
}

async fn root(State(state): State<AppState>) -> Response {
    let index = state.settings.static_dir.join("index.html");
    if let Ok(html) = tokio::fs::read_to_string(&index).await {
        return Html(html).into_response();
    }

    let s = &state.settings;
    Json(json!({
        "message": format!("{}에 오신 것을 환영합니다!", s.app_name),
        "version": s.version,
        "environment": s.environment,
        "description": "중장년층을 위한 쉬운 금융 조언 서비스",
        "available_endpoints": {
            "POST /advice": "금융 조언 요청",
            "GET /health": "서비스 상태 확인",
            "GET /admin/stats": "시스템 통계",
            "GET /topics": "사용 가능한 금융 주제 목록"
        },
        "usage_example": {
            "endpoint": "POST /advice",
            "request": { "text": "예금 상품 추천해주세요", "user_id": "user123" },
            "description": "예금, 적금, 연금, 투자, 세금, 부동산 등에 대해 질문하세요"
        }
    }))
    .into_response()
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
        "environment": state.settings.environment,
        "version": state.settings.version,
        "services": {
            "knowledge_base": format!("{} topics loaded", state.knowledge.len()),
        },
        "uptime_secs": state.started.elapsed().as_secs(),
    }))
}

/// Serializes topics as a JSON object in knowledge-base order.
struct TopicsView<'a>(&'a KnowledgeBase);

#[derive(Serialize)]
struct TopicSummary<'a> {
    keywords: &'a [String],
    related_topics: &'a [String],
    example_question: String,
}

impl Serialize for TopicsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, rec) in self.0.iter() {
            map.serialize_entry(
                name,
                &TopicSummary {
                    keywords: &rec.keywords,
                    related_topics: &rec.related_topics,
                    example_question: format!("{}에 대해 알려주세요", name),
                },
            )?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct TopicsOut<'a> {
    total_topics: usize,
    topics: TopicsView<'a>,
    usage_tip: &'static str,
}

async fn topics(State(state): State<AppState>) -> Response {
    let out = TopicsOut {
        total_topics: state.knowledge.len(),
        topics: TopicsView(&state.knowledge),
        usage_tip: "위 키워드들을 포함해서 질문하시면 더 정확한 답변을 받으실 수 있습니다.",
    };
    Json(out).into_response()
}

async fn admin_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let kb = &state.knowledge;
    let s = &state.settings;
    let counters = state.history.counters();
    Json(json!({
        "knowledge_base": {
            "total_topics": kb.len(),
            "topics": kb.names(),
            "avg_confidence": kb.average_confidence(),
        },
        "system_info": s.api_info(),
        "performance": {
            "cache_ttl": s.cache_ttl_secs,
            "max_cache_size": s.max_cache_size,
            "max_advice_length": s.max_advice_length,
            "confidence_threshold": s.confidence_threshold,
        },
        "requests": {
            "total": counters.total,
            "fallback": counters.fallback,
            "recent": state.history.snapshot_last_n(10),
        },
        "health_status": "operational",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body;

    async fn body_json(resp: Response) -> (StatusCode, String) {
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err = ApiError::Internal(anyhow::anyhow!("secret: topic table corrupted"));
        let (status, raw) = body_json(err.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let v: serde_json::Value = serde_json::from_str(&raw).expect("json body");
        assert_eq!(v["detail"], INTERNAL_ERROR_MESSAGE);
        assert!(!raw.contains("secret"));
        assert!(!raw.contains("corrupted"));
    }

    #[tokio::test]
    async fn missing_topic_becomes_generic_500() {
        let err = ApiError::Internal(crate::knowledge::KnowledgeError::NotFound("예금".into()).into());
        let (status, raw) = body_json(err.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!raw.contains("topic not found"));
    }

    #[tokio::test]
    async fn validation_errors_keep_their_message() {
        let (status, raw) = body_json(ApiError::Validation("too short".into()).into_response()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(raw.contains("too short"));
    }
}
