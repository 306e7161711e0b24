//! Configuration for the Unarya model server.
//!
//! Settings come from a TOML file, then environment overrides, then
//! validation. Every field has a serde default, so an empty file (or no
//! file at all) yields a working configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, UnaryaError};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "UNARYA_CONFIG";
/// Config file read from the working directory when `UNARYA_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "unarya.toml";

const ADDRESS_ENV: &str = "UNARYA_ADDRESS";
const WORKERS_ENV: &str = "UNARYA_WORKERS";
const CACHE_TTL_ENV: &str = "UNARYA_CACHE_TTL_SECS";
const MODEL_DIR_ENV: &str = "UNARYA_MODEL_DIR";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address to bind the gRPC server to.
    #[serde(default = "default_address")]
    pub address: SocketAddr,
    /// Number of dispatcher calls allowed to run in parallel.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 50051))
}

fn default_workers() -> usize {
    4
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: default_address(), workers: default_workers() }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Seconds a cached result stays visible.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    120
}

impl CacheSettings {
    /// The TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_secs: default_ttl_secs() }
    }
}

/// Model loading configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory label models are read from.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// Models loaded at startup.
    #[serde(default)]
    pub preload: Vec<String>,
    /// Label model used by the language classifier. Built-in labels if unset.
    #[serde(default)]
    pub language_model: Option<String>,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self { model_dir: default_model_dir(), preload: Vec::new(), language_model: None }
    }
}

/// Root configuration for Unarya.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Model configuration.
    #[serde(default)]
    pub models: ModelsConfig,
}

impl Config {
    /// Load configuration from the config file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, an
    /// override is malformed, or the result fails validation.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Like [`Config::load`], reading variables through `lookup`.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::load_from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, without overrides or validation.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(UnaryaError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `UNARYA_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup(ADDRESS_ENV) {
            self.server.address = address.trim().parse()?;
        }
        if let Some(workers) = lookup(WORKERS_ENV) {
            self.server.workers = parse_number(WORKERS_ENV, &workers)?;
        }
        if let Some(ttl) = lookup(CACHE_TTL_ENV) {
            self.cache.ttl_secs = parse_number(CACHE_TTL_ENV, &ttl)?;
        }
        if let Some(dir) = lookup(MODEL_DIR_ENV) {
            self.models.model_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.server.workers == 0 {
            return Err(UnaryaError::Config("server.workers must be at least 1".to_string()));
        }
        if self.cache.ttl_secs == 0 {
            return Err(UnaryaError::Config("cache.ttl_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| UnaryaError::Config(format!("{name} must be a non-negative integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:50051".parse().unwrap());
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.cache.ttl(), Duration::from_secs(120));
        assert_eq!(config.models.model_dir, PathBuf::from("models"));
        assert!(config.models.preload.is_empty());
        assert_eq!(config.models.language_model, None);
    }

    #[test]
    fn test_config_deserialize_minimal() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.address, "127.0.0.1:50051".parse().unwrap());
        assert_eq!(config.cache.ttl_secs, 120);
    }

    #[test]
    fn test_config_deserialize_full() {
        let config: Config = toml::from_str(
            r#"
            [server]
            address = "0.0.0.0:6000"
            workers = 8

            [cache]
            ttl_secs = 30

            [models]
            model_dir = "/opt/models"
            preload = ["language"]
            language_model = "language"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.address, "0.0.0.0:6000".parse().unwrap());
        assert_eq!(config.server.workers, 8);
        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.models.model_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.models.preload, vec!["language"]);
        assert_eq!(config.models.language_model.as_deref(), Some("language"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("UNARYA_ADDRESS", "127.0.0.1:7000"),
                ("UNARYA_WORKERS", "2"),
                ("UNARYA_CACHE_TTL_SECS", "5"),
                ("UNARYA_MODEL_DIR", "/tmp/models"),
            ]))
            .unwrap();
        assert_eq!(config.server.address, "127.0.0.1:7000".parse().unwrap());
        assert_eq!(config.server.workers, 2);
        assert_eq!(config.cache.ttl_secs, 5);
        assert_eq!(config.models.model_dir, PathBuf::from("/tmp/models"));
    }

    #[test]
    fn test_apply_overrides_rejects_malformed_values() {
        let mut config = Config::default();
        let err = config.apply_overrides(env(&[("UNARYA_ADDRESS", "nowhere")])).unwrap_err();
        assert!(matches!(err, UnaryaError::InvalidAddress(_)));

        let err = config.apply_overrides(env(&[("UNARYA_WORKERS", "many")])).unwrap_err();
        assert!(err.to_string().contains("UNARYA_WORKERS"));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.server.workers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        assert!(config.validate().unwrap_err().to_string().contains("ttl_secs"));
    }

    #[test]
    fn test_load_with_config_file_and_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("unarya.toml");
        std::fs::write(&path, "[server]\nworkers = 3\n\n[cache]\nttl_secs = 60\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let config = Config::load_with(env(&[
            ("UNARYA_CONFIG", path_str.as_str()),
            ("UNARYA_CACHE_TTL_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.server.workers, 3);
        assert_eq!(config.cache.ttl_secs, 10);
    }

    #[test]
    fn test_load_with_missing_file() {
        let err = Config::load_with(env(&[("UNARYA_CONFIG", "/nonexistent/unarya.toml")]))
            .unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }

    #[test]
    fn test_load_with_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        std::fs::write(&path, "[server\nworkers = ").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let err = Config::load_with(env(&[("UNARYA_CONFIG", path_str.as_str())])).unwrap_err();
        assert!(matches!(err, UnaryaError::TomlParse(_)));
    }

    #[test]
    fn test_load_with_rejects_invalid_result() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("zero.toml");
        std::fs::write(&path, "[server]\nworkers = 0\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        assert!(Config::load_with(env(&[("UNARYA_CONFIG", path_str.as_str())])).is_err());
    }
}
