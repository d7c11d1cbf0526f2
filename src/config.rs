//! Configuration loading.
//!
//! Connection parameters live in `config.toml` under the platform config
//! directory instead of in source. A missing file, or any missing key, falls
//! back to the stock Web ORCA defaults; a malformed file is reported and
//! ignored.

use std::path::PathBuf;

use serde::Deserialize;

use crate::constants;

/// One set of connection parameters for the database server.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ConnectionProfile {
    /// Database server host.
    pub host: String,
    /// Database server port.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Optional SSL negotiation mode (`disable`, `allow`, `prefer`,
    /// `require`, `verify-ca`, `verify-full`).
    pub sslmode: Option<String>,
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            database: constants::DEFAULT_DATABASE.to_string(),
            user: constants::DEFAULT_USER.to_string(),
            password: constants::DEFAULT_PASSWORD.to_string(),
            sslmode: None,
        }
    }
}

impl ConnectionProfile {
    /// Same server, different credentials.
    pub fn with_credentials(&self, set: &CredentialSet) -> Self {
        Self {
            database: set.database.clone(),
            user: set.user.clone(),
            password: set.password.clone(),
            ..self.clone()
        }
    }

    /// `database@host:port as user`, for report headers.
    pub fn target(&self) -> String {
        format!(
            "{}@{}:{} as {}",
            self.database, self.host, self.port, self.user
        )
    }
}

/// An alternative database/user/password triple tried against the same
/// server when the primary profile fails.
#[derive(Clone, Debug, Deserialize)]
pub struct CredentialSet {
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
}

/// Typed view of `config.toml`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Primary connection profile.
    pub connection: ConnectionProfile,
    /// Alternative credential sets, tried in order after the primary.
    #[serde(rename = "fallback")]
    pub fallbacks: Vec<CredentialSet>,
    /// Facility identifier scoping all patient/visit queries.
    pub facility: i32,
    /// Caller's address for generated pg_hba.conf rules.
    pub client_ip: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionProfile::default(),
            fallbacks: default_fallbacks(),
            facility: constants::DEFAULT_FACILITY,
            client_ip: None,
        }
    }
}

fn default_fallbacks() -> Vec<CredentialSet> {
    constants::FALLBACK_CREDENTIALS
        .iter()
        .map(|(database, user, password)| CredentialSet {
            database: (*database).to_string(),
            user: (*user).to_string(),
            password: (*password).to_string(),
        })
        .collect()
}

impl Config {
    /// Primary profile followed by every fallback credential set, all
    /// pointed at the same server.
    pub fn profiles(&self) -> Vec<ConnectionProfile> {
        let mut profiles = vec![self.connection.clone()];
        profiles.extend(
            self.fallbacks
                .iter()
                .map(|set| self.connection.with_credentials(set)),
        );
        profiles
    }

    /// Caller address used in generated access rules.
    pub fn client_address(&self) -> &str {
        self.client_ip
            .as_deref()
            .unwrap_or(constants::CLIENT_IP_PLACEHOLDER)
    }
}

/// Location of the config file, when a platform config dir exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME)
    })
}

/// Load the configuration, falling back to defaults on any problem.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(text) => match toml::from_str(&text) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                config
            }
            Err(err) => {
                eprintln!("Ignoring malformed {}: {err}", path.display());
                Config::default()
            }
        },
        Err(_) => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 5432);
        assert_eq!(config.connection.database, "orca");
        assert_eq!(config.facility, 1);
        assert_eq!(config.fallbacks.len(), 3);
        assert_eq!(config.fallbacks[2].user, "postgres");
        assert_eq!(config.fallbacks[2].password, "");
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"
            facility = 2
            client_ip = "203.0.113.7"

            [connection]
            host = "db.clinic.example"
            port = 5433
            database = "orca_prod"
            user = "reporter"
            password = "secret"
            sslmode = "require"

            [[fallback]]
            database = "receipt"
            user = "receipt"
            password = "receipt"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.connection.host, "db.clinic.example");
        assert_eq!(config.connection.port, 5433);
        assert_eq!(config.connection.sslmode.as_deref(), Some("require"));
        assert_eq!(config.facility, 2);
        assert_eq!(config.client_address(), "203.0.113.7");
        assert_eq!(config.fallbacks.len(), 1);
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let config: Config = toml::from_str("[connection]\nhost = \"remote\"\n").unwrap();
        assert_eq!(config.connection.host, "remote");
        assert_eq!(config.connection.database, "orca");
        assert_eq!(config.facility, 1);
        // fallback sets default to the stock trial list
        assert_eq!(config.fallbacks.len(), 3);
    }

    #[test]
    fn test_fallback_password_optional() {
        let config: Config =
            toml::from_str("[[fallback]]\ndatabase = \"postgres\"\nuser = \"postgres\"\n").unwrap();
        assert_eq!(config.fallbacks[0].password, "");
    }

    #[test]
    fn test_profiles_share_server() {
        let mut config = Config::default();
        config.connection.host = "10.0.0.9".to_string();
        let profiles = config.profiles();
        assert_eq!(profiles.len(), 4);
        assert!(profiles.iter().all(|p| p.host == "10.0.0.9"));
        assert_eq!(profiles[1].database, "receipt");
    }

    #[test]
    fn test_client_address_placeholder() {
        let config = Config::default();
        assert_eq!(config.client_address(), "<CLIENT_IP>");
    }

    #[test]
    fn test_target_format() {
        let profile = ConnectionProfile::default();
        assert_eq!(profile.target(), "orca@localhost:5432 as orca");
    }
}
