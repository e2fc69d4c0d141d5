//! Server configuration loading from file and environment variables.

use frontdesk_notify::SmsConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Reminder sweep settings.
    #[serde(default)]
    pub reminder: ReminderSettings,

    /// SMS provider credentials. When absent, notifications go to the
    /// log sink instead of a carrier.
    #[serde(default)]
    pub sms: Option<SmsConfig>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the ops HTTP endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Reminder sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderSettings {
    /// Seconds between sweeps.
    #[serde(default = "default_reminder_interval_seconds")]
    pub interval_seconds: u64,

    /// Lookahead window in minutes: a sweep selects appointments due
    /// within this long from now.
    #[serde(default = "default_reminder_window_minutes")]
    pub window_minutes: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "frontdesk_booking=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "frontdesk.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_reminder_interval_seconds() -> u64 {
    60
}

fn default_reminder_window_minutes() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            interval_seconds: default_reminder_interval_seconds(),
            window_minutes: default_reminder_window_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `FRONTDESK_HOST` overrides `server.host`
/// - `FRONTDESK_PORT` overrides `server.port`
/// - `FRONTDESK_DB_PATH` overrides `database.path`
/// - `FRONTDESK_REMINDER_INTERVAL_SECONDS` overrides `reminder.interval_seconds`
/// - `FRONTDESK_LOG_LEVEL` overrides `logging.level`
/// - `FRONTDESK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `EXOTEL_ACCOUNT_SID`, `EXOTEL_API_KEY`, `EXOTEL_API_TOKEN`,
///   `EXOTEL_SENDER_ID` together configure the SMS provider when all four
///   are present
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("FRONTDESK_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("FRONTDESK_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(db_path) = std::env::var("FRONTDESK_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(interval) = std::env::var("FRONTDESK_REMINDER_INTERVAL_SECONDS") {
        if let Ok(parsed) = interval.parse() {
            config.reminder.interval_seconds = parsed;
        }
    }
    if let Ok(level) = std::env::var("FRONTDESK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("FRONTDESK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    if config.sms.is_none() {
        config.sms = sms_config_from_env();
    }

    Ok(config)
}

/// Builds SMS settings from the provider's conventional environment
/// variables, if all of them are set.
fn sms_config_from_env() -> Option<SmsConfig> {
    let account_sid = std::env::var("EXOTEL_ACCOUNT_SID").ok()?;
    let api_key = std::env::var("EXOTEL_API_KEY").ok()?;
    let api_token = std::env::var("EXOTEL_API_TOKEN").ok()?;
    let sender_id = std::env::var("EXOTEL_SENDER_ID").ok()?;
    Some(SmsConfig {
        account_sid,
        api_key,
        api_token,
        sender_id,
        base_url: "https://api.exotel.com".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_missing() {
        let config = load_config(Some("/nonexistent/frontdesk.toml"))
            .expect("missing file should fall back to defaults");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "frontdesk.db");
        assert_eq!(config.reminder.interval_seconds, 60);
        assert_eq!(config.reminder.window_minutes, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_values_are_loaded() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        write!(
            file,
            r#"
[server]
port = 8200

[database]
path = "/var/lib/frontdesk/clinic.db"
pool_max_size = 4

[reminder]
interval_seconds = 30
window_minutes = 120

[sms]
account_sid = "clinic1"
api_key = "key"
api_token = "token"
sender_id = "CLINIC"
"#
        )
        .expect("should write config");

        let config = load_config(file.path().to_str()).expect("config should load");
        assert_eq!(config.server.port, 8200);
        assert_eq!(config.database.path, "/var/lib/frontdesk/clinic.db");
        assert_eq!(config.database.pool_max_size, 4);
        assert_eq!(config.reminder.interval_seconds, 30);
        assert_eq!(config.reminder.window_minutes, 120);
        let sms = config.sms.expect("sms section should be present");
        assert_eq!(sms.account_sid, "clinic1");
        assert_eq!(sms.base_url, "https://api.exotel.com");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        write!(file, "this is not toml [[[").expect("should write config");

        let err = load_config(file.path().to_str()).expect_err("should fail to parse");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
