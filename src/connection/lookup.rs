use super::error::ConnectionError;
use std::time::Duration;

/// Client for the service that maps an API key to its tenant's
/// connection string.
#[derive(Clone)]
pub struct ConnectionStringClient {
    http: reqwest::Client,
    url: String,
}

impl ConnectionStringClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ConnectionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("recipe-import/0.1")
            .build()
            .map_err(ConnectionError::Lookup)?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// `GET {url}?apikey=KEY`, returning the cleaned connection string.
    pub async fn fetch(&self, api_key: &str) -> Result<String, ConnectionError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("apikey", api_key)])
            .send()
            .await
            .map_err(ConnectionError::Lookup)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectionError::lookup_status(status, body));
        }

        let body = response.text().await.map_err(ConnectionError::Lookup)?;
        let conn_str = clean_connection_string(&body);
        if conn_str.is_empty() {
            return Err(ConnectionError::EmptyConnectionString);
        }

        log::debug!("resolved connection string via {}", self.url);
        Ok(conn_str.to_string())
    }
}

/// Strip surrounding whitespace, then surrounding double quotes.
pub fn clean_connection_string(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// One-shot HTTP server answering the first request with `status` and `body`.
#[cfg(test)]
pub(crate) async fn serve_once(status: &'static str, body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind lookup server");
    let addr = listener.local_addr().expect("local address");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/get-connection-string")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: String) -> ConnectionStringClient {
        ConnectionStringClient::new(url, Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let url = serve_once("503 Service Unavailable", "lookup offline").await;

        let err = client(url).fetch("tenant-a").await.expect_err("503 must fail");
        match err {
            ConnectionError::LookupStatus { status, body } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "lookup offline");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn quoted_response_is_cleaned() {
        let url = serve_once("200 OK", " \"SERVER=db,5432;DATABASE=cmweb;\"\n").await;

        let conn_str = client(url).fetch("tenant-a").await.expect("lookup succeeds");
        assert_eq!(conn_str, "SERVER=db,5432;DATABASE=cmweb;");
    }

    #[tokio::test]
    async fn blank_response_is_rejected() {
        let url = serve_once("200 OK", "\"\"").await;

        let err = client(url).fetch("tenant-a").await.expect_err("empty string");
        assert!(matches!(err, ConnectionError::EmptyConnectionString));
    }

    #[test]
    fn strips_whitespace_then_quotes() {
        assert_eq!(
            clean_connection_string("  \"SERVER=db;DATABASE=cmweb;\"\n"),
            "SERVER=db;DATABASE=cmweb;"
        );
        assert_eq!(clean_connection_string("SERVER=db;"), "SERVER=db;");
        assert_eq!(clean_connection_string("\"\""), "");
    }
}
