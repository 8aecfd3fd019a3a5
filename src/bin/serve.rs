//! Standalone server bound to HOST:PORT, for hosts without the Shuttle runtime.

use anyhow::Context;
use finance_advisor::config::Settings;
use finance_advisor::telemetry::init_tracing;
use finance_advisor::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env();
    init_tracing(&settings);

    let addr = settings.bind_addr();
    info!(
        app = %settings.app_name,
        environment = %settings.environment,
        debug = settings.debug,
        %addr,
        "starting"
    );

    let state = AppState::from_settings(settings)?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
