use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVICE_ID: &str = "recipe-convert-into-cmweb";
pub const DEFAULT_CONNSTR_URL: &str = "http://127.0.0.1:8006/get-connection-string";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_required(key: &'static str) -> Result<String, ConfigError> {
    env_nonempty(key).ok_or(ConfigError::MissingVar(key))
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_i32(key: &str, default: i32) -> i32 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<i32>().ok())
        .unwrap_or(default)
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Site, user and language codes passed to the receiving procedures when a
/// request does not name its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportDefaults {
    pub code_site: i32,
    pub code_user: i32,
    pub site_language: i32,
}

impl ImportDefaults {
    pub fn from_env() -> Self {
        Self {
            code_site: env_i32("CMWEB_CODE_SITE", 1),
            code_user: env_i32("CMWEB_CODE_USER", 1),
            site_language: env_i32("CMWEB_SITE_LANGUAGE", 1),
        }
    }
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            code_site: 1,
            code_user: 1,
            site_language: 1,
        }
    }
}

/// Runtime configuration of the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_id: String,
    /// Connection string used when a request carries no API key.
    pub connection_string: Option<String>,
    pub connstr_url: String,
    /// API key used for the lookup when a request carries none.
    pub default_api_key: Option<String>,
    pub lookup_timeout: Duration,
    pub connect_timeout: Duration,
    pub statement_timeout: Duration,
    pub pool_size: u32,
    pub import_defaults: ImportDefaults,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            service_id: env_string("SERVICE_ID", DEFAULT_SERVICE_ID),
            connection_string: connection_string_from_env()?,
            connstr_url: env_string("CMWEB_CONNSTR_URL", DEFAULT_CONNSTR_URL),
            default_api_key: env_nonempty("CMWEB_APIKEY"),
            lookup_timeout: env_duration_millis("CMWEB_CONNSTR_TIMEOUT_MS", 15_000),
            connect_timeout: env_duration_millis("DB_CONNECT_TIMEOUT_MS", 15_000),
            statement_timeout: env_duration_millis("DB_STATEMENT_TIMEOUT_MS", 60_000),
            pool_size: env_u32("DB_POOL_SIZE", 5).max(1),
            import_defaults: ImportDefaults::from_env(),
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_id: DEFAULT_SERVICE_ID.to_string(),
            connection_string: None,
            connstr_url: DEFAULT_CONNSTR_URL.to_string(),
            default_api_key: None,
            lookup_timeout: Duration::from_millis(15_000),
            connect_timeout: Duration::from_millis(15_000),
            statement_timeout: Duration::from_millis(60_000),
            pool_size: 5,
            import_defaults: ImportDefaults::default(),
        }
    }
}

/// Full connection string, or one assembled from the split `DB_*` fields.
///
/// Returns `Ok(None)` when neither form is configured; the service then
/// depends on the connection-string lookup.
fn connection_string_from_env() -> Result<Option<String>, ConfigError> {
    if let Some(direct) =
        env_nonempty("DB_CONNECTION_STRING").or_else(|| env_nonempty("CMWEB_CONNECTION_STRING"))
    {
        return Ok(Some(direct));
    }

    let Some(server) = env_nonempty("DB_SERVER") else {
        return Ok(None);
    };

    Ok(Some(build_connection_string(
        &server,
        env_nonempty("DB_PORT").as_deref(),
        &env_required("DB_NAME")?,
        &env_required("DB_USER")?,
        &env_required("DB_PASSWORD")?,
    )))
}

/// `KEY=VALUE;` connection string from its parts.
///
/// A port is appended to the server as `host,port` unless the server
/// already carries one.
pub fn build_connection_string(
    server: &str,
    port: Option<&str>,
    database: &str,
    user: &str,
    password: &str,
) -> String {
    let server = match port {
        Some(port) if !server.contains(',') => format!("{server},{port}"),
        _ => server.to_string(),
    };

    format!("SERVER={server};DATABASE={database};UID={user};PWD={password};")
}
