//! Configuration for policy-reviewers.
//!
//! Settings are read from `reviewers.toml` in the project directory and
//! layered as file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [github]
//! api_url = "https://api.github.com"
//! token_env = "GITHUB_TOKEN"
//! user_agent = "policy-reviewers"
//!
//! [selection]
//! seed = 42
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pull::github::GitHubSettings;

pub const CONFIG_FILE_NAME: &str = "reviewers.toml";

/// Environment variable overriding `selection.seed`.
pub const SEED_ENV: &str = "POLICY_REVIEWERS_SEED";

/// Environment variable overriding `github.api_url`.
pub const API_URL_ENV: &str = "GITHUB_API_URL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unknown log format '{}'. Valid options: text, json", s),
        }
    }
}

/// GitHub connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSection {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_user_agent() -> String {
    "policy-reviewers".to_string()
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
        }
    }
}

/// Reviewer selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSection {
    /// Fixed seed for reproducible selection; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`; anything else is reported by `validate` and logs as text
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    LogFormat::Text.to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSection {
    /// The configured format, or `None` when it is not recognized.
    pub fn log_format(&self) -> Option<LogFormat> {
        self.format.parse().ok()
    }
}

/// The complete reviewers.toml configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewersToml {
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub selection: SelectionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ReviewersToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse reviewers.toml")
    }

    /// Load `reviewers.toml` from `project_dir`, or defaults if it is absent.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let config_path = config_path(project_dir);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize reviewers.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.github.api_url.starts_with("https://") {
            warnings.push(format!(
                "github.api_url '{}' is not https; tokens will be sent in clear text",
                self.github.api_url
            ));
        }

        if self.github.token_env.trim().is_empty() {
            warnings.push("github.token_env is empty; requests will be unauthenticated".into());
        }

        if self
            .logging
            .level
            .parse::<tracing_subscriber::filter::LevelFilter>()
            .is_err()
        {
            warnings.push(format!(
                "logging.level '{}' is not a valid level (trace, debug, info, warn, error, off)",
                self.logging.level
            ));
        }

        if self.logging.log_format().is_none() {
            warnings.push(format!(
                "logging.format '{}' is not a valid format (text, json); falling back to text",
                self.logging.format
            ));
        }

        warnings
    }
}

pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE_NAME)
}

/// Effective configuration after applying environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct ReviewersConfig {
    pub project_dir: PathBuf,
    pub toml: ReviewersToml,
    pub seed: Option<u64>,
    pub api_url: String,
    pub token: Option<String>,
}

impl ReviewersConfig {
    /// Load from `project_dir` and resolve against the process environment.
    pub fn new(project_dir: PathBuf, cli_seed: Option<u64>) -> Result<Self> {
        let toml = ReviewersToml::load_or_default(&project_dir)?;
        Self::resolve(project_dir, toml, cli_seed, |key| std::env::var(key).ok())
    }

    /// Resolve overrides using `env` as the environment lookup.
    pub fn resolve(
        project_dir: PathBuf,
        toml: ReviewersToml,
        cli_seed: Option<u64>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env_seed = match env(SEED_ENV) {
            Some(raw) => Some(raw.trim().parse::<u64>().with_context(|| {
                format!("{} must be an unsigned integer, got '{}'", SEED_ENV, raw)
            })?),
            None => None,
        };
        let seed = cli_seed.or(env_seed).or(toml.selection.seed);

        let api_url = env(API_URL_ENV).unwrap_or_else(|| toml.github.api_url.clone());
        let token = env(&toml.github.token_env).filter(|t| !t.trim().is_empty());

        Ok(Self {
            project_dir,
            toml,
            seed,
            api_url,
            token,
        })
    }

    pub fn github_settings(&self) -> GitHubSettings {
        GitHubSettings {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            user_agent: self.toml.github.user_agent.clone(),
        }
    }
}
