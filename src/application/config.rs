use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::services::aggregator::CountingMode;

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Which store adapter backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

/// External store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    #[serde(default = "default_store_addr")]
    pub addr: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

/// Background ingestion pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Serialize window updates per metric name.
    #[serde(default = "default_true")]
    pub serialize_per_metric: bool,
    #[serde(default)]
    pub counting: CountingMode,
}

/// Prediction oracle selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Value returned by the `fixed` provider.
    #[serde(default)]
    pub fixed_value: f64,
}

// --- Defaults ---

fn default_listen_addr() -> String {
    "0.0.0.0:8080".into()
}

const fn default_backend() -> StoreBackend {
    StoreBackend::Redis
}

fn default_store_addr() -> String {
    "localhost:6379".into()
}

const fn default_pool_size() -> usize {
    10
}

const fn default_queue_capacity() -> usize {
    1024
}

const fn default_workers() -> usize {
    4
}

const fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "random".into()
}

// --- Default impls ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            addr: default_store_addr(),
            password: String::new(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            workers: default_workers(),
            serialize_per_metric: default_true(),
            counting: CountingMode::default(),
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            fixed_value: 0.0,
        }
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Resolve configuration once at startup.
    ///
    /// Reads `path` if given, otherwise the default config file if it exists,
    /// otherwise built-in defaults. Environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::config_path() {
                Some(default_path) if default_path.exists() => Self::load_from(&default_path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML content is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Apply `REDIS_ADDR`, `REDIS_PASS`, `LISTEN_ADDR` and `PORT` overrides.
    ///
    /// Empty values are ignored. `PORT` wins over `LISTEN_ADDR` and binds
    /// on all interfaces.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(addr) = non_empty("REDIS_ADDR") {
            self.store.addr = addr;
        }
        if let Some(password) = non_empty("REDIS_PASS") {
            self.store.password = password;
        }
        if let Some(addr) = non_empty("LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Some(port) = non_empty("PORT") {
            self.server.listen_addr = format!("0.0.0.0:{port}");
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pulse").join("config.toml"))
    }
}
