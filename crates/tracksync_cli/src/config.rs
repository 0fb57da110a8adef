//! Configuration file support for tracksync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `TRACKSYNC_`)
//! 3. Config file (./tracksync.toml, then ~/.config/tracksync/config.toml)
//! 4. Built-in defaults
//!
//! Nested keys use a double underscore (`TRACKSYNC_HTTP__TIMEOUT_SECS`). The
//! common GitHub settings also have flat aliases: `TRACKSYNC_GITHUB_TOKEN`,
//! `TRACKSYNC_GITHUB_API_URL` and `TRACKSYNC_GITHUB_WEB_HOST`.
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use TRACKSYNC_GITHUB_TOKEN env var
//! api_url = "https://api.github.com"
//! web_host = "github.com"
//!
//! [http]
//! timeout_secs = 30
//! user_agent = "tracksync"
//!
//! [sync]
//! per_page = 100
//!
//! [retry]
//! max_retries = 5
//! min_delay_ms = 1000
//! max_delay_ms = 60000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use tracksync::github::request::{DEFAULT_API_URL, DEFAULT_USER_AGENT, MAX_PER_PAGE};
use tracksync::repo_ref::DEFAULT_WEB_HOST;
use tracksync::retry::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES};
use tracksync::{GitHubClient, RepoResolver, RequestBuilder, RetryConfig};

/// Flat environment aliases and the keys they set.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("TRACKSYNC_GITHUB_TOKEN", "github.token"),
    ("TRACKSYNC_GITHUB_API_URL", "github.api_url"),
    ("TRACKSYNC_GITHUB_WEB_HOST", "github.web_host"),
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub http: HttpConfig,
    pub sync: SyncConfig,
    pub retry: RetrySettings,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API token. Can also be set via TRACKSYNC_GITHUB_TOKEN.
    pub token: Option<String>,
    /// REST API base (`https://<host>/api/v3` for GitHub Enterprise).
    pub api_url: String,
    /// Host that repository URLs must point at.
    pub web_host: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            web_host: DEFAULT_WEB_HOST.to_string(),
        }
    }
}

/// Transport settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Records per page (1-100).
    pub per_page: u8,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
        }
    }
}

/// Backoff applied by `sync` and `repos search`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            min_delay_ms: INITIAL_BACKOFF_MS,
            max_delay_ms: MAX_BACKOFF_MS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Falls back to defaults (with a warning) when a source is unreadable.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("tracksync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./tracksync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g. TRACKSYNC_HTTP__TIMEOUT_SECS -> http.timeout_secs
        builder = builder.add_source(
            Environment::with_prefix("TRACKSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let built = apply_env_aliases(builder, |name| std::env::var(name).ok())
            .and_then(|b| b.build())
            .and_then(|settings| settings.try_deserialize::<Config>());

        match built {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tracksync").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            Duration::from_millis(self.retry.min_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
            self.retry.max_retries,
        )
    }

    /// Request builder for the configured API, token and page size.
    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(&self.github.api_url)
            .with_token(self.github.token.clone())
            .with_user_agent(self.http.user_agent.clone())
            .with_per_page(self.sync.per_page)
    }

    /// Build a live client from this configuration.
    pub fn client(&self) -> tracksync::Result<GitHubClient> {
        if self.github.token.is_none() {
            tracing::debug!("No GitHub token configured; requests are anonymous");
        }
        GitHubClient::new(
            self.request_builder(),
            RepoResolver::new(&self.github.web_host),
            self.timeout(),
        )
    }
}

/// Map the flat `TRACKSYNC_GITHUB_*` aliases onto their nested keys.
fn apply_env_aliases<F>(
    mut builder: config::ConfigBuilder<config::builder::DefaultState>,
    lookup: F,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_ALIASES {
        builder = builder.set_override_option(*key, lookup(var))?;
    }
    Ok(builder)
}
