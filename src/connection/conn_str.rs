//! Connection-string parsing.
//!
//! Tenants hand out either a `postgres://` URL or a semicolon separated
//! `KEY=VALUE;` string (`SERVER=host,port;DATABASE=..;UID=..;PWD=..;`).
//! Keys the driver has no use for (`DRIVER`, `TrustServerCertificate`) are
//! ignored.

use super::error::ConnectionError;
use sqlx::postgres::PgConnectOptions;

pub fn parse_connection_string(raw: &str) -> Result<PgConnectOptions, ConnectionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConnectionError::EmptyConnectionString);
    }

    if raw.starts_with("postgres://") || raw.starts_with("postgresql://") {
        return raw
            .parse::<PgConnectOptions>()
            .map_err(|err| ConnectionError::InvalidConnectionString(err.to_string()));
    }

    parse_key_value(raw)
}

fn parse_key_value(raw: &str) -> Result<PgConnectOptions, ConnectionError> {
    let mut host = None;
    let mut port = None;
    let mut options = PgConnectOptions::new();

    for pair in raw.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            ConnectionError::InvalidConnectionString(format!("expected KEY=VALUE, got '{pair}'"))
        })?;
        let value = unbrace(value.trim());

        match key.trim().to_ascii_lowercase().as_str() {
            "server" | "data source" | "address" | "host" => {
                let value = value.strip_prefix("tcp:").unwrap_or(value);
                match value.split_once(',') {
                    Some((name, server_port)) => {
                        host = Some(name.trim().to_string());
                        port = Some(parse_port(server_port)?);
                    }
                    None => host = Some(value.to_string()),
                }
            }
            "port" => port = Some(parse_port(value)?),
            "database" | "initial catalog" | "dbname" => options = options.database(value),
            "uid" | "user id" | "user" | "username" => options = options.username(value),
            "pwd" | "password" => options = options.password(value),
            _ => {}
        }
    }

    let host = host.ok_or_else(|| {
        ConnectionError::InvalidConnectionString("missing SERVER".to_string())
    })?;
    options = options.host(&host);
    if let Some(port) = port {
        options = options.port(port);
    }

    Ok(options)
}

fn parse_port(value: &str) -> Result<u16, ConnectionError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| ConnectionError::InvalidConnectionString(format!("invalid port '{value}'")))
}

fn unbrace(value: &str) -> &str {
    value
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_with_port_on_server() {
        let options = parse_connection_string(
            "DRIVER={ODBC Driver 18};SERVER=db.local,5433;DATABASE=cmweb;UID=import;PWD=secret;TrustServerCertificate=yes;",
        )
        .expect("parses");

        assert_eq!(options.get_host(), "db.local");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("cmweb"));
        assert_eq!(options.get_username(), "import");
    }

    #[test]
    fn keys_are_case_insensitive_and_port_may_be_separate() {
        let options =
            parse_connection_string("server=tcp:db.local; Port=6543; Initial Catalog=cmweb; User Id=sa")
                .expect("parses");

        assert_eq!(options.get_host(), "db.local");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("cmweb"));
        assert_eq!(options.get_username(), "sa");
    }

    #[test]
    fn parses_postgres_urls() {
        let options =
            parse_connection_string("postgres://user:pw@localhost:5432/cmweb").expect("parses");
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_database(), Some("cmweb"));
    }

    #[test]
    fn rejects_missing_server_and_bad_ports() {
        assert!(matches!(
            parse_connection_string("DATABASE=cmweb;UID=sa"),
            Err(ConnectionError::InvalidConnectionString(_))
        ));
        assert!(matches!(
            parse_connection_string("SERVER=db,notaport"),
            Err(ConnectionError::InvalidConnectionString(_))
        ));
        assert!(matches!(
            parse_connection_string("garbage"),
            Err(ConnectionError::InvalidConnectionString(_))
        ));
        assert!(matches!(
            parse_connection_string("   "),
            Err(ConnectionError::EmptyConnectionString)
        ));
    }
}
