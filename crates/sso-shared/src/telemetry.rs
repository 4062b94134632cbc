//! Telemetry setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, TelemetrySettings};
use crate::error::AppError;

/// `RUST_LOG` when set, otherwise the configured level.
pub fn build_env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn init_telemetry(settings: &TelemetrySettings) -> Result<(), AppError> {
    let registry = tracing_subscriber::registry().with(build_env_filter(&settings.level));
    let result = match settings.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };
    result.map_err(|e| AppError::Telemetry(e.to_string()))
}
