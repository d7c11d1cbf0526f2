//! Shared database access layer.
//!
//! Every report routine goes through this module to turn a profile into
//! driver options and open a connection bounded by the fixed timeout.
//! Connections are released on every exit path: dropped on error, closed
//! gracefully on the normal path.

pub mod error;

use std::io;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};

use crate::config::ConnectionProfile;
use crate::constants;

/// Snapshot of the server-side session, from the verification queries.
#[derive(Clone, Debug)]
pub struct ServerInfo {
    pub version: String,
    pub database: String,
    pub user: String,
    pub encoding: String,
}

/// Parse an SSL negotiation mode name.
pub fn parse_ssl_mode(value: &str) -> Option<PgSslMode> {
    match value.to_ascii_lowercase().as_str() {
        "disable" => Some(PgSslMode::Disable),
        "allow" => Some(PgSslMode::Allow),
        "prefer" => Some(PgSslMode::Prefer),
        "require" => Some(PgSslMode::Require),
        "verify-ca" => Some(PgSslMode::VerifyCa),
        "verify-full" => Some(PgSslMode::VerifyFull),
        _ => None,
    }
}

/// Build driver options from a connection profile.
pub fn connect_options(profile: &ConnectionProfile) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&profile.host)
        .port(profile.port)
        .database(&profile.database)
        .username(&profile.user)
        .password(&profile.password)
        .application_name(constants::APP_NAME);

    if let Some(mode) = profile.sslmode.as_deref().and_then(parse_ssl_mode) {
        options = options.ssl_mode(mode);
    }

    options
}

/// Open a connection with the profile's options.
pub async fn connect(profile: &ConnectionProfile) -> Result<PgConnection, sqlx::Error> {
    connect_with(connect_options(profile)).await
}

/// Open a connection, bounding the attempt with the fixed timeout.
pub async fn connect_with(options: PgConnectOptions) -> Result<PgConnection, sqlx::Error> {
    tracing::debug!("opening connection");
    match tokio::time::timeout(constants::CONNECT_TIMEOUT, PgConnection::connect_with(&options))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            "connection attempt timed out",
        ))),
    }
}

/// Run the trivial verification queries and collect the session snapshot.
pub async fn server_info(conn: &mut PgConnection) -> Result<ServerInfo, sqlx::Error> {
    let version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(&mut *conn)
        .await?;
    let database: String = sqlx::query_scalar("SELECT current_database()")
        .fetch_one(&mut *conn)
        .await?;
    let user: String = sqlx::query_scalar("SELECT current_user")
        .fetch_one(&mut *conn)
        .await?;
    let encoding: String = sqlx::query_scalar("SELECT current_setting('server_encoding')")
        .fetch_one(&mut *conn)
        .await?;

    Ok(ServerInfo {
        version,
        database,
        user,
        encoding,
    })
}

/// Resolve "today" on the server as a `YYYYMMDD` string.
///
/// The visit tables store dates in this encoding, so the comparison value
/// must come from the same formatter the server used to write them.
pub async fn current_date_compact(conn: &mut PgConnection) -> Result<String, sqlx::Error> {
    sqlx::query_scalar("SELECT TO_CHAR(CURRENT_DATE, 'YYYYMMDD')")
        .fetch_one(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssl_mode() {
        assert!(matches!(parse_ssl_mode("disable"), Some(PgSslMode::Disable)));
        assert!(matches!(parse_ssl_mode("PREFER"), Some(PgSslMode::Prefer)));
        assert!(matches!(
            parse_ssl_mode("verify-full"),
            Some(PgSslMode::VerifyFull)
        ));
        assert!(parse_ssl_mode("tls").is_none());
    }
}
