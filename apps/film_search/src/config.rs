use std::{fs, io, path::Path, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use client_core::RetryPolicy;
use serde::Deserialize;
use shared::domain::SearchQuery;

pub const DEFAULT_CONFIG_FILE: &str = "film_search.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub default_term: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://www.omdbapi.com/".into(),
            api_key: String::new(),
            default_term: "star wars".into(),
            max_retries: 0,
            retry_backoff_ms: 500,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    base_url: Option<String>,
    api_key: Option<String>,
    default_term: Option<String>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Builds the one query the session will run, `term` overriding the default.
    pub fn search_query(&self, term: Option<&str>) -> anyhow::Result<SearchQuery> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            bail!(
                "no OMDb API key configured; set OMDB_API_KEY, `api_key` in {DEFAULT_CONFIG_FILE} or pass --api-key"
            );
        }

        let term = term.unwrap_or(&self.default_term);
        SearchQuery::parse(&self.base_url, api_key, term).context("invalid search configuration")
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.api_key {
            self.api_key = v;
        }
        if let Some(v) = file.default_term {
            self.default_term = v;
        }
        if let Some(v) = file.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = file.retry_backoff_ms {
            self.retry_backoff_ms = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
    }
}

/// Reads the config file (if any) and environment overrides.
///
/// A missing default config file is not an error; a missing explicitly
/// requested one is.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let raw = match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == io::ErrorKind::NotFound && config_path.is_none() => None,
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };

    resolve_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

pub fn resolve_settings(
    raw_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        let file: FileSettings = toml::from_str(raw).context("failed to parse config file")?;
        settings.apply_file(file);
    }

    if let Some(v) = env("OMDB_API_KEY") {
        settings.api_key = v;
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = v;
    }

    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("APP__DEFAULT_TERM") {
        settings.default_term = v;
    }

    if let Some(v) = parse_env(&env, "APP__MAX_RETRIES")? {
        settings.max_retries = v;
    }
    if let Some(v) = parse_env(&env, "APP__RETRY_BACKOFF_MS")? {
        settings.retry_backoff_ms = v;
    }
    if let Some(v) = parse_env(&env, "APP__REQUEST_TIMEOUT_SECS")? {
        settings.request_timeout_secs = Some(v);
    }

    Ok(settings)
}

fn parse_env<T>(env: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value '{raw}' for {key}"))
        })
        .transpose()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
