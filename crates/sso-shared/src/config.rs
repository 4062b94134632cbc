//! Configuration management

use config::builder::DefaultState;
use std::path::Path;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::constants::{
    DEFAULT_APP_ENV, DEFAULT_APP_NAME, DEFAULT_LOG_LEVEL, DEFAULT_ORGANIZATION_ID,
    ENV_PREFIX_SEPARATOR, LOG_FORMAT_JSON,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub app: AppSettings,
    #[validate(nested)]
    pub telemetry: TelemetrySettings,
    #[validate(nested)]
    pub reconcile: ReconcileSettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppSettings {
    #[validate(length(min = 1, message = "Environment name must not be empty"))]
    pub env: String,
    #[validate(length(min = 1, max = 100, message = "App name must be between 1 and 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct TelemetrySettings {
    /// Default filter directive, used when `RUST_LOG` is not set.
    #[validate(length(min = 1, message = "Log level must not be empty"))]
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Scope used by callers that reconcile group memberships.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ReconcileSettings {
    #[validate(range(min = 1, message = "Organization id must be positive"))]
    pub organization_id: i64,
}

impl AppConfig {
    /// Loads `.env`, `config/default`, `config/{APP_ENV}` and the environment,
    /// in increasing order of precedence.
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_APP_ENV.into());
        Self::load_from(Path::new("."), &env)
    }

    /// Same layering as [`AppConfig::load`], rooted at `base_dir`.
    pub fn load_from(base_dir: &Path, app_env: &str) -> Result<Self, AppError> {
        let dotenv_path = base_dir.join(".env");
        if let Err(e) = dotenvy::from_path(&dotenv_path) {
            debug!("No .env loaded from {}: {}", dotenv_path.display(), e);
        }

        let config_dir = base_dir.join("config");
        let builder = Self::defaults()?
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join(app_env)).required(false))
            .add_source(
                Environment::default()
                    .separator(ENV_PREFIX_SEPARATOR)
                    .try_parsing(true),
            );
        let config = Self::from_builder(builder)?;
        info!(
            "Configuration loaded: env={}, organization_id={}",
            app_env, config.reconcile.organization_id
        );
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, AppError> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", DEFAULT_APP_ENV)?
            .set_default("app.name", DEFAULT_APP_NAME)?
            .set_default("telemetry.level", DEFAULT_LOG_LEVEL)?
            .set_default("telemetry.format", LOG_FORMAT_JSON)?
            .set_default("reconcile.organization_id", DEFAULT_ORGANIZATION_ID)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
