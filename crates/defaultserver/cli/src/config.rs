//! Configuration for the default server host

use defaultserver_policy::POLICY_FILE_NAME;
use defaultserver_storage::sqlite::{SqliteStoreConfig, DATABASE_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Private data directory holding the database and policy file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageSettings,

    /// Policy file configuration
    #[serde(default)]
    pub policy: PolicySettings,

    /// Proxy stand-in configuration
    #[serde(default)]
    pub proxy: ProxySettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: StorageSettings::default(),
            policy: PolicySettings::default(),
            proxy: ProxySettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Preference database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Database file name inside the data directory
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Maximum connections in pool
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,

    /// Pool acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// SQLite busy timeout in seconds
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    /// Upper bound for one storage operation in seconds
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            max_connections: default_pool_size(),
            acquire_timeout_secs: default_acquire_timeout(),
            busy_timeout_secs: default_busy_timeout(),
            operation_timeout_secs: default_operation_timeout(),
        }
    }
}

/// Policy document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySettings {
    /// Policy file name inside the data directory
    #[serde(default = "default_policy_file")]
    pub file_name: String,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            file_name: default_policy_file(),
        }
    }
}

/// Servers the stand-in proxy knows about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Registered backend servers; empty means every server is reachable
    #[serde(default)]
    pub registered_servers: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_data_dir() -> PathBuf {
    PathBuf::from("plugins").join("defaultserver")
}

fn default_database_file() -> String {
    DATABASE_FILE_NAME.to_string()
}

fn default_pool_size() -> u32 {
    4
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_busy_timeout() -> u64 {
    5
}

fn default_operation_timeout() -> u64 {
    10
}

fn default_policy_file() -> String {
    POLICY_FILE_NAME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // DEFAULTSERVER_STORAGE__MAX_CONNECTIONS=8 style overrides
        builder = builder.add_source(
            config::Environment::with_prefix("DEFAULTSERVER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.database_file)
    }

    pub fn policy_path(&self) -> PathBuf {
        self.data_dir.join(&self.policy.file_name)
    }

    pub fn sqlite(&self) -> SqliteStoreConfig {
        let mut sqlite = SqliteStoreConfig::new(self.database_path());
        sqlite.max_connections = self.storage.max_connections;
        sqlite.acquire_timeout = Duration::from_secs(self.storage.acquire_timeout_secs);
        sqlite.busy_timeout = Duration::from_secs(self.storage.busy_timeout_secs);
        sqlite.operation_timeout = Duration::from_secs(self.storage.operation_timeout_secs);
        sqlite
    }
}
