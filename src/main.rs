//! Financial Advice Service — Shuttle entrypoint.
//! Boots the Axum router with settings from the environment.

use finance_advisor::config::Settings;
use finance_advisor::telemetry::init_tracing;
use finance_advisor::{router, AppState};
use shuttle_axum::ShuttleAxum;
use tracing::info;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env();
    init_tracing(&settings);

    info!(
        app = %settings.app_name,
        environment = %settings.environment,
        debug = settings.debug,
        "starting"
    );

    let state = AppState::from_settings(settings)?;
    Ok(router(state).into())
}
