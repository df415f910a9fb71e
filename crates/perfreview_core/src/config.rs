//! Deployment configuration.
//!
//! # Responsibility
//! - Describe the two required store values (endpoint and key).
//! - Carry the closed allow-list of authorized email addresses.
//! - Parse configuration from a JSON document or from the environment.
//!
//! # Invariants
//! - `store.url` and `store.key` are non-empty after trimming.
//! - Allow-list entries are valid, lowercase, deduplicated email addresses.

use crate::access::DEFAULT_ALLOWED_EMAILS;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable holding the store endpoint.
pub const ENV_STORE_URL: &str = "PERFREVIEW_STORE_URL";
/// Environment variable holding the store key.
pub const ENV_STORE_KEY: &str = "PERFREVIEW_STORE_KEY";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Store endpoint and deployment key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite file path, or `:memory:`.
    pub url: String,
    /// Deployment key bound to the store on first open.
    pub key: String,
}

/// Validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    /// Lowercase email addresses allowed to use the application.
    pub allowed_emails: Vec<String>,
    /// Optional log level override (`trace|debug|info|warn|error`).
    pub log_level: Option<String>,
    /// Optional absolute log directory.
    pub log_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    store_url: Option<String>,
    store_key: Option<String>,
    #[serde(default)]
    allowed_emails: Option<Vec<String>>,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    log_dir: Option<String>,
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Config document is not valid JSON for the expected shape.
    Parse(serde_json::Error),
    /// Required value is absent or blank.
    MissingValue(&'static str),
    /// Allow-list entry is not an email address.
    InvalidEmail(String),
    /// Allow-list contains no entries.
    EmptyAllowList,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::MissingValue(name) => write!(f, "missing required config value `{name}`"),
            Self::InvalidEmail(value) => write!(f, "invalid allow-list email: `{value}`"),
            Self::EmptyAllowList => write!(f, "allow-list must contain at least one email"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// `allowed_emails` falls back to the built-in allow-list when omitted.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(document).map_err(ConfigError::Parse)?;
        let allowed = match raw.allowed_emails {
            Some(values) => values,
            None => default_allow_list(),
        };
        Self::build(raw.store_url, raw.store_key, allowed, raw.log_level, raw.log_dir)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&document)
    }

    /// Builds configuration from `PERFREVIEW_STORE_URL` / `PERFREVIEW_STORE_KEY`
    /// and the built-in allow-list.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::build(
            lookup(ENV_STORE_URL),
            lookup(ENV_STORE_KEY),
            default_allow_list(),
            None,
            None,
        )
    }

    fn build(
        store_url: Option<String>,
        store_key: Option<String>,
        allowed_emails: Vec<String>,
        log_level: Option<String>,
        log_dir: Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = required(store_url, "store_url")?;
        let key = required(store_key, "store_key")?;
        let allowed_emails = normalize_allow_list(&allowed_emails)?;

        Ok(Self {
            store: StoreConfig { url, key },
            allowed_emails,
            log_level: log_level.filter(|value| !value.trim().is_empty()),
            log_dir: log_dir.filter(|value| !value.trim().is_empty()),
        })
    }
}

/// Validates, lowercases and deduplicates allow-list entries.
pub fn normalize_allow_list(values: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut unique = BTreeSet::new();
    for value in values {
        let normalized = value.trim().to_lowercase();
        if !EMAIL_RE.is_match(&normalized) {
            return Err(ConfigError::InvalidEmail(value.clone()));
        }
        unique.insert(normalized);
    }
    if unique.is_empty() {
        return Err(ConfigError::EmptyAllowList);
    }
    Ok(unique.into_iter().collect())
}

fn default_allow_list() -> Vec<String> {
    DEFAULT_ALLOWED_EMAILS
        .iter()
        .map(|value| (*value).to_string())
        .collect()
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingValue(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_STORE_KEY, ENV_STORE_URL};

    #[test]
    fn parses_full_document_and_normalizes_emails() {
        let config = AppConfig::from_json_str(
            r#"{
                "store_url": " /var/lib/perfreview/store.db ",
                "store_key": "pk_live_123",
                "allowed_emails": ["Lead@Example.com", "lead@example.com", "other@example.org"],
                "log_level": "debug"
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.store.url, "/var/lib/perfreview/store.db");
        assert_eq!(config.store.key, "pk_live_123");
        assert_eq!(
            config.allowed_emails,
            vec!["lead@example.com".to_string(), "other@example.org".to_string()]
        );
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn omitted_allow_list_uses_builtin_entry() {
        let config =
            AppConfig::from_json_str(r#"{"store_url": ":memory:", "store_key": "k"}"#).unwrap();
        assert_eq!(config.allowed_emails, vec!["ammonlarson@gmail.com".to_string()]);
    }

    #[test]
    fn rejects_blank_store_key() {
        let err = AppConfig::from_json_str(r#"{"store_url": ":memory:", "store_key": "  "}"#)
            .expect_err("blank key must fail");
        assert!(matches!(err, ConfigError::MissingValue("store_key")));
    }

    #[test]
    fn rejects_invalid_and_empty_allow_lists() {
        let err = AppConfig::from_json_str(
            r#"{"store_url": "x.db", "store_key": "k", "allowed_emails": ["not-an-email"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEmail(_)));

        let err = AppConfig::from_json_str(
            r#"{"store_url": "x.db", "store_key": "k", "allowed_emails": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyAllowList));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = AppConfig::from_json_str(
            r#"{"store_url": "x.db", "store_key": "k", "admin_table": "users"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn lookup_reads_both_store_variables() {
        let config = AppConfig::from_lookup(|name| match name {
            ENV_STORE_URL => Some(":memory:".to_string()),
            ENV_STORE_KEY => Some("anon-key".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.store.url, ":memory:");
        assert_eq!(config.store.key, "anon-key");

        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue("store_url")));
    }
}
