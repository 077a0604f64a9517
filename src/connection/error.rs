use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while resolving or opening a CMWeb database connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("no database connection configured and no API key supplied")]
    NotConfigured,
    #[error("connection-string lookup HTTP error: {0}")]
    Lookup(#[source] reqwest::Error),
    #[error("connection-string lookup returned status {status}: {body}")]
    LookupStatus { status: StatusCode, body: String },
    #[error("connection-string lookup returned an empty string")]
    EmptyConnectionString,
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error("database connect error: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("database connect timed out after {0:?}")]
    ConnectTimeout(Duration),
}

impl ConnectionError {
    pub fn lookup_status(status: StatusCode, body: String) -> Self {
        ConnectionError::LookupStatus { status, body }
    }

    /// The request has to name a tenant before a connection can be opened.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ConnectionError::NotConfigured)
    }
}
