use axum::{routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::advice::Advice;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and publish the configured threshold.
    pub fn init(threshold: f32) -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?
            .clone();

        gauge!("advice_confidence_threshold").set(threshold as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// Record one served advice. No-op until a recorder is installed.
pub fn record_advice(advice: &Advice) {
    counter!("advice_requests_total").increment(1);
    histogram!("advice_confidence").record(advice.confidence as f64);
    match &advice.topic {
        Some(t) => counter!("advice_topic_total", "topic" => t.clone()).increment(1),
        None => counter!("advice_fallback_total").increment(1),
    }
}
