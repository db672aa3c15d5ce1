use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    #[serde(default = "default_subreddit")]
    pub subreddit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub reddit: RedditConfig,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_console_logging")]
    pub console_logging: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default)]
    pub include_comments: bool,
    #[serde(default)]
    pub symbol_allow_list: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_subreddit() -> String {
    "wallstreetbets".into()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("graphs")
}

fn default_max_posts() -> usize {
    10
}

fn default_log_level() -> String {
    "info".into()
}

fn default_console_logging() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_fetch_timeout_seconds() -> u64 {
    30
}

fn default_fetch_concurrency() -> usize {
    1
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_posts == 0 {
            return Err(ConfigError::Invalid("max_posts must be at least 1".into()));
        }
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid("fetch_concurrency must be at least 1".into()));
        }
        if self.fetch_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_seconds must be at least 1".into()));
        }
        if tracing::Level::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Invalid(format!("unknown log_level '{}'", self.log_level)));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
