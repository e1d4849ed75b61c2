//! Layered application configuration (TOML file + `FUNDSYNC__*` env vars).

use crate::Result;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/default";
const ENV_PREFIX: &str = "FUNDSYNC";

/// Run mode: `prod` aligns cycles to the clock, `dev` enables debug logging
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Dev,
    Test,
    Prod,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Dev => "dev",
            RunMode::Test => "test",
            RunMode::Prod => "prod",
        }
    }
}

/// Full application configuration, loaded once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: RunMode,
    pub login: LoginConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fixed login credentials (phone/email + one-time code)
#[derive(Clone, Deserialize)]
pub struct LoginConfig {
    pub phone_or_email: String,
    pub code: String,
}

// Keep the one-time code out of debug output
impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("phone_or_email", &self.phone_or_email)
            .field("code", &"***")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub db_name: String,
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("db_name", &self.db_name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimerConfig {
    /// Run the first cycle of each loop immediately, even in prod mode
    #[serde(default)]
    pub skip_first_delay: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Upper bound on listing pages requested per cycle
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and the environment
    ///
    /// The file path comes from `FUNDSYNC_CONFIG` (default `config/default.*`).
    /// An explicitly named file must exist; the default one is optional.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match std::env::var("FUNDSYNC_CONFIG") {
            Ok(path) => config::File::with_name(&path).required(true),
            Err(_) => config::File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        Self::from_source(file)
    }

    /// Build from a single file source layered under the environment
    pub fn from_source<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Clock alignment is only enabled in prod
    pub fn should_delay(&self) -> bool {
        self.mode == RunMode::Prod
    }

    /// Default tracing filter for this run mode
    pub fn log_filter(&self) -> &'static str {
        match self.mode {
            RunMode::Dev => "fundsync=debug",
            _ => "fundsync=info",
        }
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_base_url() -> String {
    "https://api.valuescan.io".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_pages() -> u32 {
    50
}
