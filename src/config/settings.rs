// src/config/settings.rs
use serde::Serialize;
use std::env;
use std::path::PathBuf;

use crate::advice::AdvicePolicy;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime settings, read from the environment (after `dotenvy::dotenv()`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub version: String,
    pub debug: bool,
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Minimum match score for topic-specific advice, in [0,1].
    pub confidence_threshold: f32,
    pub cache_ttl_secs: u64,
    pub max_cache_size: usize,
    pub max_advice_length: usize,
    pub log_level: String,
    pub static_dir: PathBuf,
    /// Mount `/metrics` and other diagnostics.
    pub debug_routes: bool,
    pub knowledge_base_path: Option<PathBuf>,
}

/// Serializable summary for admin endpoints. No secrets.
#[derive(Debug, Clone, Serialize)]
pub struct ApiInfo {
    pub app_name: String,
    pub version: String,
    pub environment: String,
    pub debug_mode: bool,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "중장년층 금융조언 AI".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            cache_ttl_secs: 3600,
            max_cache_size: 100,
            max_advice_length: 500,
            log_level: "info".to_string(),
            static_dir: PathBuf::from("static"),
            debug_routes: false,
            knowledge_base_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build from an arbitrary key lookup; unset or invalid values fall back to defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();

        let debug = get("DEBUG")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(d.debug);

        let debug_routes = debug || get("DEBUG_ROUTES").as_deref() == Some("1");

        Self {
            debug,
            environment: non_empty(get("ENVIRONMENT")).unwrap_or(d.environment),
            host: non_empty(get("HOST")).unwrap_or(d.host),
            port: get("PORT")
                .and_then(|s| s.trim().parse::<u16>().ok())
                .unwrap_or(d.port),
            confidence_threshold: parse_threshold(get("CONFIDENCE_THRESHOLD"))
                .unwrap_or(d.confidence_threshold),
            log_level: non_empty(get("LOG_LEVEL"))
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or(d.log_level),
            static_dir: non_empty(get("STATIC_DIR"))
                .map(PathBuf::from)
                .unwrap_or(d.static_dir),
            debug_routes,
            knowledge_base_path: non_empty(get("KNOWLEDGE_BASE_PATH")).map(PathBuf::from),
            ..d
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn api_info(&self) -> ApiInfo {
        ApiInfo {
            app_name: self.app_name.clone(),
            version: self.version.clone(),
            environment: self.environment.clone(),
            debug_mode: self.debug,
            host: self.host.clone(),
            port: self.port,
        }
    }

    pub fn advice_policy(&self) -> AdvicePolicy {
        AdvicePolicy {
            threshold: self.confidence_threshold,
            ..AdvicePolicy::default()
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// parse optional float and clamp to <0.0..=1.0>
fn parse_threshold(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}
