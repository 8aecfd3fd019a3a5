//! Tracing setup and privacy helpers.
//!
//! Raw question text is never logged; use `question_fingerprint` instead.

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::settings::Settings;

pub const ENV_MATCHER_DEV_LOG: &str = "MATCHER_DEV_LOG";

/// Install the global subscriber. JSON output in production, compact otherwise.
/// No-op if a subscriber is already installed (e.g. by the Shuttle runtime).
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},finance_advisor={},tower_http=info",
            settings.log_level, settings.log_level
        ))
    });

    let res = if settings.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };

    if res.is_err() {
        tracing::debug!("tracing subscriber already installed; keeping it");
    }
}

static DEV_LOG: Lazy<bool> = Lazy::new(|| {
    dev_log_allowed(
        std::env::var(ENV_MATCHER_DEV_LOG).ok().as_deref(),
        std::env::var("ENVIRONMENT").ok().as_deref(),
        cfg!(debug_assertions),
    )
});

/// Matcher diagnostics switch, resolved once per process.
pub(crate) fn dev_logging_enabled() -> bool {
    *DEV_LOG
}

/// `MATCHER_DEV_LOG=1` plus a dev build or a dev-like `ENVIRONMENT`.
fn dev_log_allowed(flag: Option<&str>, environment: Option<&str>, debug_build: bool) -> bool {
    if flag != Some("1") {
        return false;
    }
    debug_build
        || environment.is_some_and(|e| {
            matches!(
                e.to_ascii_lowercase().as_str(),
                "local" | "development" | "dev"
            )
        })
}

/// Short, stable, non-reversible id for a question (first 6 bytes of SHA-256, hex).
pub fn question_fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = question_fingerprint("예금 상품 추천해주세요");
        let b = question_fingerprint("예금 상품 추천해주세요");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, question_fingerprint("적금 상품 추천해주세요"));
    }

    #[test]
    fn dev_log_needs_flag_and_dev_context() {
        assert!(!dev_log_allowed(None, Some("development"), true));
        assert!(!dev_log_allowed(Some("0"), Some("dev"), true));
        assert!(dev_log_allowed(Some("1"), None, true));
        assert!(dev_log_allowed(Some("1"), Some("Local"), false));
        assert!(!dev_log_allowed(Some("1"), Some("production"), false));
        assert!(!dev_log_allowed(Some("1"), None, false));
    }

    #[test]
    fn truncate_caps_length() {
        let v = vec!["a", "b", "c"];
        assert_eq!(truncate_vec(&v, 2), vec!["a".to_string(), "b".to_string()]);
    }
}
