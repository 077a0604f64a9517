//! Per-request database connections.
//!
//! Requests without an API key share a lazily connected pool built from the
//! configured connection string. Requests with a key get a dedicated
//! connection to their tenant database; the key's connection string is
//! looked up once and cached until a connect attempt with it fails.

use super::conn_str::parse_connection_string;
use super::error::ConnectionError;
use super::lookup::ConnectionStringClient;
use crate::config::ServiceConfig;
use dashmap::DashMap;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgConnection, PgPool, Postgres};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// A connection exclusively owned by one request.
pub enum TenantConnection {
    Pooled(PoolConnection<Postgres>),
    Dedicated(PgConnection),
}

impl Deref for TenantConnection {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            TenantConnection::Pooled(conn) => &**conn,
            TenantConnection::Dedicated(conn) => conn,
        }
    }
}

impl DerefMut for TenantConnection {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            TenantConnection::Pooled(conn) => &mut **conn,
            TenantConnection::Dedicated(conn) => conn,
        }
    }
}

pub struct ConnectionProvider {
    default_pool: Option<PgPool>,
    lookup: Option<ConnectionStringClient>,
    default_api_key: Option<String>,
    cache: DashMap<String, String>,
    connect_timeout: Duration,
}

impl ConnectionProvider {
    pub fn new(
        default_pool: Option<PgPool>,
        lookup: Option<ConnectionStringClient>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            default_pool,
            lookup,
            default_api_key: None,
            cache: DashMap::new(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConnectionError> {
        let default_pool = config
            .connection_string
            .as_deref()
            .map(|conn_str| -> Result<PgPool, ConnectionError> {
                let options = parse_connection_string(conn_str)?;
                Ok(PgPoolOptions::new()
                    .max_connections(config.pool_size)
                    .acquire_timeout(config.connect_timeout)
                    .connect_lazy_with(options))
            })
            .transpose()?;

        let lookup = ConnectionStringClient::new(&config.connstr_url, config.lookup_timeout)?;

        let mut provider = Self::new(default_pool, Some(lookup), config.connect_timeout);
        provider.default_api_key = config.default_api_key.clone();
        Ok(provider)
    }

    /// Provider that serves every request from `pool`.
    pub fn with_pool(pool: PgPool) -> Self {
        Self::new(Some(pool), None, Duration::from_secs(15))
    }

    /// Seed the connection-string cache for `api_key`.
    pub fn remember(&self, api_key: &str, conn_str: &str) {
        self.cache.insert(api_key.to_string(), conn_str.to_string());
    }

    pub fn is_cached(&self, api_key: &str) -> bool {
        self.cache.contains_key(api_key)
    }

    pub fn has_default_pool(&self) -> bool {
        self.default_pool.is_some()
    }

    /// Connection for a request, keyed by its API key if it sent one.
    pub async fn acquire(&self, api_key: Option<&str>) -> Result<TenantConnection, ConnectionError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .or(self.default_api_key.as_deref());

        match api_key {
            Some(key) => self.connect_tenant(key).await.map(TenantConnection::Dedicated),
            None => {
                let pool = self
                    .default_pool
                    .as_ref()
                    .ok_or(ConnectionError::NotConfigured)?;
                pool.acquire()
                    .await
                    .map(TenantConnection::Pooled)
                    .map_err(ConnectionError::Connect)
            }
        }
    }

    /// Open a connection and run `SELECT 1` on it.
    pub async fn validate(&self, api_key: Option<&str>) -> Result<(), ConnectionError> {
        let mut conn = self.acquire(api_key).await?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(ConnectionError::Connect)?;
        Ok(())
    }

    async fn connect_tenant(&self, api_key: &str) -> Result<PgConnection, ConnectionError> {
        let conn_str = self.connection_string_for(api_key).await?;
        let options = parse_connection_string(&conn_str).inspect_err(|_| self.forget(api_key))?;

        match tokio::time::timeout(self.connect_timeout, connect(&options)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(err)) => {
                self.forget(api_key);
                Err(ConnectionError::Connect(err))
            }
            Err(_) => {
                self.forget(api_key);
                Err(ConnectionError::ConnectTimeout(self.connect_timeout))
            }
        }
    }

    async fn connection_string_for(&self, api_key: &str) -> Result<String, ConnectionError> {
        if let Some(cached) = self.cache.get(api_key) {
            return Ok(cached.value().clone());
        }

        let lookup = self.lookup.as_ref().ok_or(ConnectionError::NotConfigured)?;
        let conn_str = lookup.fetch(api_key).await?;
        self.cache.insert(api_key.to_string(), conn_str.clone());
        Ok(conn_str)
    }

    fn forget(&self, api_key: &str) {
        if self.cache.remove(api_key).is_some() {
            log::debug!("evicted cached connection string for API key");
        }
    }
}

async fn connect(options: &PgConnectOptions) -> Result<PgConnection, sqlx::Error> {
    options.connect().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ConnectionProvider {
        ConnectionProvider::new(None, None, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn no_pool_and_no_key_is_not_configured() {
        let result = provider().acquire(None).await;
        assert!(matches!(result, Err(ConnectionError::NotConfigured)));
    }

    #[tokio::test]
    async fn blank_key_falls_back_to_pool() {
        let result = provider().acquire(Some("   ")).await;
        assert!(matches!(result, Err(ConnectionError::NotConfigured)));
    }

    #[tokio::test]
    async fn unknown_key_without_lookup_is_not_configured() {
        let result = provider().acquire(Some("tenant-a")).await;
        assert!(matches!(result, Err(ConnectionError::NotConfigured)));
    }

    #[tokio::test]
    async fn unparsable_cached_string_is_evicted() {
        let provider = provider();
        provider.remember("tenant-a", "not a connection string");

        let result = provider.acquire(Some("tenant-a")).await;
        assert!(matches!(
            result,
            Err(ConnectionError::InvalidConnectionString(_))
        ));
        assert!(!provider.is_cached("tenant-a"));
    }

    #[tokio::test]
    async fn failed_connect_evicts_cached_string() {
        let provider = provider();
        // Port 1 on loopback refuses connections.
        provider.remember(
            "tenant-b",
            "SERVER=127.0.0.1,1;DATABASE=cmweb;UID=import;PWD=secret;",
        );

        let result = provider.acquire(Some("tenant-b")).await;
        assert!(result.is_err());
        assert!(!provider.is_cached("tenant-b"));
    }

    #[tokio::test]
    async fn lookup_failure_is_not_cached() {
        let url = crate::connection::lookup::serve_once("404 Not Found", "unknown key").await;
        let lookup = ConnectionStringClient::new(url, Duration::from_secs(5)).expect("client");
        let provider = ConnectionProvider::new(None, Some(lookup), Duration::from_millis(200));

        let result = provider.acquire(Some("tenant-c")).await;
        assert!(matches!(
            result,
            Err(ConnectionError::LookupStatus { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
        assert!(!provider.is_cached("tenant-c"));
    }
}
