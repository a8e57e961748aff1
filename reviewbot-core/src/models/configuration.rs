//! Configuration data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Practicum API OAuth token.
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the destination chat id.
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org/bot";

/// Errors raised while loading or checking configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Отсутствуют обязательные переменные окружения: {}", .0.join(", "))]
    MissingTokens(Vec<&'static str>),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Logging level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "debug")]
    #[default]
    Debug,
    #[serde(rename = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Non-secret settings, loaded from TOML. Tokens never live here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Homework statuses endpoint
    pub endpoint: String,
    /// Telegram Bot API base, the bot token is appended to it
    pub telegram_api_base: String,
    /// Pause between poll iterations
    pub retry_interval_secs: u64,
    /// Timeout for a single API request (0 = transport default)
    pub request_timeout_secs: u64,
    /// Move the cursor to `current_date` after a successful iteration
    pub advance_cursor: bool,
    /// Logging verbosity level
    pub log_level: LogLevel,
    /// Log file path (None = stdout only)
    pub log_file: Option<PathBuf>,
    /// Size at which the log file is rotated
    pub log_max_bytes: u64,
    /// Number of rotated log files kept
    pub log_backups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            retry_interval_secs: 600,
            request_timeout_secs: 30,
            advance_cursor: true,
            log_level: LogLevel::Debug,
            log_file: Some(PathBuf::from("reviewbot.log")),
            log_max_bytes: 50_000_000,
            log_backups: 5,
        }
    }
}

impl Settings {
    /// Load settings from file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            // Return defaults if file doesn't exist
            Ok(Settings::default())
        }
    }

    /// Get the XDG config directory path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reviewbot").join("config.toml"))
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = parse_http_url(&self.endpoint) {
            errors.push(format!("endpoint is not a valid http(s) URL: {}", e));
        }
        if let Err(e) = parse_http_url(&self.telegram_api_base) {
            errors.push(format!("telegram_api_base is not a valid http(s) URL: {}", e));
        }

        if self.retry_interval_secs == 0 {
            errors.push("retry_interval_secs must be at least 1".to_string());
        }
        if self.retry_interval_secs > 86_400 {
            errors.push("retry_interval_secs cannot exceed 86400 (1 day)".to_string());
        }

        if self.request_timeout_secs > 300 {
            errors.push("request_timeout_secs cannot exceed 300".to_string());
        }

        if self.log_backups > 100 {
            errors.push("log_backups cannot exceed 100".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn parse_http_url(raw: &str) -> Result<url::Url, String> {
    let parsed = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

/// The three secrets the bot needs. Loaded once, immutable afterwards.
#[derive(Clone, Default)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Read credentials from the process environment. Absent variables become empty strings.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).unwrap_or_default().trim().to_string();
        Self {
            practicum_token: read(PRACTICUM_TOKEN_VAR),
            telegram_token: read(TELEGRAM_TOKEN_VAR),
            telegram_chat_id: read(TELEGRAM_CHAT_ID_VAR),
        }
    }

    /// Names of the variables that are absent or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN_VAR, &self.practicum_token),
            (TELEGRAM_TOKEN_VAR, &self.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print token values
        let mask = |value: &str| if value.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("Credentials")
            .field("practicum_token", &mask(&self.practicum_token))
            .field("telegram_token", &mask(&self.telegram_token))
            .field("telegram_chat_id", &mask(&self.telegram_chat_id))
            .finish()
    }
}

/// Fail if any credential is missing. Each absent variable is logged by name.
pub fn check_tokens(credentials: &Credentials) -> Result<(), ConfigError> {
    let missing = credentials.missing();
    if missing.is_empty() {
        return Ok(());
    }
    for name in &missing {
        tracing::error!(
            severity = "critical",
            variable = *name,
            "Missing required environment variable"
        );
    }
    Err(ConfigError::MissingTokens(missing))
}
