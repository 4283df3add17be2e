//! Logging setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set `VIVARIUM_LOG_JSON` to any value to emit one JSON object per event.
const JSON_ENV: &str = "VIVARIUM_LOG_JSON";

pub fn init_telemetry() -> Result<()> {
    let json = std::env::var_os(JSON_ENV).is_some();
    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_target(true)))
    } else {
        (Some(fmt::layer().with_target(true)), None)
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vivarium_world=debug".into()),
        )
        .with(plain)
        .with(structured)
        .try_init()?;

    info!(json, "Telemetry initialized");
    Ok(())
}
