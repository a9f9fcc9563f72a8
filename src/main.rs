//! Authenex Trust Engine — Binary Entrypoint
//! Boots the Axum HTTP server around a single shared `TrustEngine`.

use shuttle_axum::ShuttleAxum;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trust_engine::{api, metrics::Metrics, TrustEngine};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - TRUST_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("TRUST_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trust=debug,info"));

    // The deployment runtime may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let engine = TrustEngine::from_env()?;
    info!(
        signals = engine.registry().len(),
        max_factors = engine.config().max_factors,
        "trust engine ready"
    );

    let metrics = Metrics::init()?;
    let router = api::router(api::AppState::new(engine)).merge(metrics.router());

    Ok(router.into())
}
