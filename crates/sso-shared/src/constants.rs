//! Application-wide constants

pub const DEFAULT_ORGANIZATION_ID: i64 = 1;
pub const DEFAULT_APP_NAME: &str = "sso-group-sync";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_FORMAT_JSON: &str = "json";
pub const ENV_PREFIX_SEPARATOR: &str = "__";
