use std::path::PathBuf;
use std::time::Duration;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Telegram refuses messages longer than this many UTF-16 code units.
pub const TRANSPORT_MESSAGE_LIMIT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Docker Engine API over the local socket.
    Api,
    /// The `docker` executable.
    Cli,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bot_token: String,
    pub allowed_user_id: i64,
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_fragment_len")]
    pub max_fragment_len: usize,
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,
    #[serde(default = "default_logs_timeout_secs")]
    pub logs_timeout_secs: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_docker_bin")]
    pub docker_bin: String,
}

fn default_backend() -> BackendKind {
    BackendKind::Api
}

fn default_page_size() -> usize {
    100
}

fn default_max_fragment_len() -> usize {
    4000
}

fn default_action_timeout_secs() -> u64 {
    10
}

fn default_logs_timeout_secs() -> u64 {
    30
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_docker_bin() -> String {
    "docker".to_string()
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &"<redacted>")
            .field("allowed_user_id", &self.allowed_user_id)
            .field("backend", &self.backend)
            .field("page_size", &self.page_size)
            .field("max_fragment_len", &self.max_fragment_len)
            .field("action_timeout_secs", &self.action_timeout_secs)
            .field("logs_timeout_secs", &self.logs_timeout_secs)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("api_base_url", &self.api_base_url)
            .field("docker_bin", &self.docker_bin)
            .finish()
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            bail!("bot_token must not be empty");
        }
        if self.page_size == 0 {
            bail!("page_size must be greater than zero");
        }
        if self.max_fragment_len == 0 || self.max_fragment_len > TRANSPORT_MESSAGE_LIMIT {
            bail!("max_fragment_len must be between 1 and {}", TRANSPORT_MESSAGE_LIMIT);
        }
        if self.action_timeout_secs == 0 || self.logs_timeout_secs == 0 {
            bail!("backend timeouts must be greater than zero");
        }
        Ok(())
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }

    pub fn logs_timeout(&self) -> Duration {
        Duration::from_secs(self.logs_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

/// `$DOCKBOT_CONFIG`, else `config.toml` in the platform config directory.
pub fn get_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DOCKBOT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("com", "dockbot", "dockbot").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads configuration from the optional file, `DOCKBOT_*` variables and
/// the `BOT_TOKEN` / `ALLOWED_USER_ID` variables, later sources winning.
pub fn load_config() -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = get_config_path() {
        builder = builder.add_source(File::from(path).required(false));
    }

    let settings = builder
        .add_source(Environment::with_prefix("DOCKBOT").try_parsing(true))
        .set_override_option("bot_token", std::env::var("BOT_TOKEN").ok())?
        .set_override_option("allowed_user_id", std::env::var("ALLOWED_USER_ID").ok())?
        .build()
        .context("Failed to read configuration")?;

    let config = settings
        .try_deserialize::<AppConfig>()
        .context("Failed to parse configuration (bot_token and allowed_user_id are required)")?;
    config.validate()?;
    Ok(config)
}
