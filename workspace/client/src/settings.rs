//! Client settings: defaults, then an optional `wealthwise.toml`, then
//! `VITE_API_BASE_URL`, then `WEALTHWISE_*` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::forms;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5000;

const ENV_PREFIX: &str = "WEALTHWISE";
/// Base URL variable the web frontend was configured with.
const BASE_URL_ALIAS: &str = "VITE_API_BASE_URL";
const DEFAULT_FILE: &str = "wealthwise";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// `localhost:8000` parses as a URL with scheme `localhost`, so `url` alone is not enough.
fn http_scheme(value: &str) -> Result<(), ValidationError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ValidationError::new("scheme")
            .with_message(Cow::from("must start with http:// or https://")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct ClientSettings {
    /// Backend base URL, without a trailing slash.
    #[validate(
        url(message = "must be an absolute URL"),
        custom(function = "http_scheme")
    )]
    pub api_base_url: String,

    /// Reconciler polling period.
    #[validate(range(min = 100, message = "must be at least 100 ms"))]
    pub poll_interval_ms: u64,

    /// How long a toast stays visible.
    pub toast_duration_ms: u64,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            log_level: "info".to_string(),
        }
    }
}

impl ClientSettings {
    /// Loads from the process environment and `file` (or `./wealthwise.toml` if present).
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_from(file, std::env::vars().collect())
    }

    /// Same as [`ClientSettings::load`] with an explicit environment.
    pub fn load_from(
        file: Option<&Path>,
        env: HashMap<String, String>,
    ) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("poll_interval_ms", defaults.poll_interval_ms)?
            .set_default("toast_duration_ms", defaults.toast_duration_ms)?
            .set_default("log_level", defaults.log_level)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
        };

        let alias: HashMap<String, String> = env
            .get(BASE_URL_ALIAS)
            .map(|url| HashMap::from([("API_BASE_URL".to_string(), url.clone())]))
            .unwrap_or_default();

        let settings: Self = builder
            .add_source(Environment::default().source(Some(alias)))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .build()?
            .try_deserialize()?;

        let settings = settings.checked()?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Replaces the base URL, e.g. from a command-line flag, and validates again.
    pub fn with_api_base_url(self, url: &str) -> Result<Self, SettingsError> {
        Self {
            api_base_url: url.to_string(),
            ..self
        }
        .checked()
    }

    fn checked(self) -> Result<Self, SettingsError> {
        self.validate()
            .map_err(|errors| SettingsError::Invalid(forms::describe(&errors)))?;

        Ok(Self {
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            ..self
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(ClientSettings::load_from(Some(&missing), HashMap::new()).is_err());

        let settings = ClientSettings::load_from(None, HashMap::new()).unwrap();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.toast_duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides_file_and_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wealthwise.toml");
        fs::write(
            &path,
            "api_base_url = \"http://file.local:8000/\"\npoll_interval_ms = 2000\n",
        )
        .unwrap();

        let from_file = ClientSettings::load_from(Some(&path), HashMap::new()).unwrap();
        assert_eq!(from_file.api_base_url, "http://file.local:8000");
        assert_eq!(from_file.poll_interval_ms, 2000);

        let aliased = ClientSettings::load_from(
            Some(&path),
            env(&[("VITE_API_BASE_URL", "http://vite.local:9000")]),
        )
        .unwrap();
        assert_eq!(aliased.api_base_url, "http://vite.local:9000");

        let explicit = ClientSettings::load_from(
            Some(&path),
            env(&[
                ("VITE_API_BASE_URL", "http://vite.local:9000"),
                ("WEALTHWISE_API_BASE_URL", "http://env.local:7000"),
                ("WEALTHWISE_POLL_INTERVAL_MS", "750"),
            ]),
        )
        .unwrap();
        assert_eq!(explicit.api_base_url, "http://env.local:7000");
        assert_eq!(explicit.poll_interval_ms, 750);
    }

    #[test]
    fn test_rejects_nonsense_values() {
        let error = ClientSettings::load_from(
            None,
            env(&[("WEALTHWISE_POLL_INTERVAL_MS", "5")]),
        )
        .unwrap_err();
        assert!(matches!(error, SettingsError::Invalid(_)));

        let error = ClientSettings::load_from(
            None,
            env(&[("WEALTHWISE_API_BASE_URL", "not a url")]),
        )
        .unwrap_err();
        assert!(matches!(error, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_overridden_base_url_is_validated() {
        let settings = ClientSettings::default()
            .with_api_base_url("http://flag.local:9000/")
            .unwrap();
        assert_eq!(settings.api_base_url, "http://flag.local:9000");

        for url in ["localhost:8000", "ftp://files.local", "not a url"] {
            let error = ClientSettings::default().with_api_base_url(url).unwrap_err();
            assert!(matches!(error, SettingsError::Invalid(_)), "{}", url);
        }
    }
}
