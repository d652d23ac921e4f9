use std::path::Path;

use redlilium_core::memory::DEFAULT_POOL_CAPACITY;
use serde::Deserialize;

use crate::error::IoError;
use crate::worker::{WorkerConfig, DEFAULT_WORKER_NAME, DEFAULT_WORKER_STACK_SIZE};

/// Largest accepted `block_pool_capacity`.
///
/// Slot bookkeeping for the whole pool is allocated when the pool is created.
pub const MAX_BLOCK_POOL_CAPACITY: usize = 1 << 20;

/// Disk I/O settings, usually loaded from a TOML file.
///
/// Every field is optional in the file:
///
/// ```toml
/// root_uri = "/home/player/.local/share/game"
/// assets_dir = "assets"
/// block_pool_capacity = 256
/// worker_name = "redlilium-io"
/// worker_stack_size = 131072
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IoDriverConfig {
    /// Root directory for `Relative` paths. Empty means the working directory.
    pub root_uri: String,
    /// Directory under the root holding `Assets` paths.
    pub assets_dir: String,
    /// Maximum number of memory blocks alive at once.
    pub block_pool_capacity: usize,
    pub worker_name: String,
    pub worker_stack_size: usize,
}

impl Default for IoDriverConfig {
    fn default() -> Self {
        Self {
            root_uri: String::new(),
            assets_dir: "assets".into(),
            block_pool_capacity: DEFAULT_POOL_CAPACITY,
            worker_name: DEFAULT_WORKER_NAME.into(),
            worker_stack_size: DEFAULT_WORKER_STACK_SIZE,
        }
    }
}

impl IoDriverConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, IoError> {
        let config: Self =
            toml::from_str(content).map_err(|e| IoError::Config(format!("failed to parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IoError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), IoError> {
        if self.block_pool_capacity == 0 {
            return Err(IoError::Config("block_pool_capacity must be positive".into()));
        }
        if self.block_pool_capacity > MAX_BLOCK_POOL_CAPACITY {
            return Err(IoError::Config(format!(
                "block_pool_capacity {} exceeds the limit of {MAX_BLOCK_POOL_CAPACITY}",
                self.block_pool_capacity
            )));
        }
        if self.assets_dir.is_empty() {
            return Err(IoError::Config("assets_dir must not be empty".into()));
        }
        if self.worker_stack_size == 0 {
            return Err(IoError::Config("worker_stack_size must be positive".into()));
        }
        Ok(())
    }

    pub fn worker(&self) -> WorkerConfig {
        WorkerConfig {
            name: self.worker_name.clone(),
            stack_size: self.worker_stack_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IoDriverConfig::default();
        assert_eq!(config.assets_dir, "assets");
        assert_eq!(config.block_pool_capacity, 256);
        assert_eq!(config.worker_stack_size, 128 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = IoDriverConfig::from_toml_str(
            r#"
            root_uri = "/srv/game"
            block_pool_capacity = 32
            "#,
        )
        .unwrap();
        assert_eq!(config.root_uri, "/srv/game");
        assert_eq!(config.block_pool_capacity, 32);
        assert_eq!(config.assets_dir, "assets");
        assert_eq!(config.worker().name, "redlilium-io");
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            IoDriverConfig::from_toml_str("").unwrap(),
            IoDriverConfig::default()
        );
    }

    #[test]
    fn rejects_invalid_values() {
        for content in [
            "block_pool_capacity = 0",
            "block_pool_capacity = 4000000000",
            "assets_dir = \"\"",
            "worker_stack_size = 0",
        ] {
            let err = IoDriverConfig::from_toml_str(content).unwrap_err();
            assert!(matches!(err, IoError::Config(_)), "{content}");
        }
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = IoDriverConfig::from_toml_str("block_pool_capacity = \"many\"").unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("io.toml");
        std::fs::write(&path, "worker_name = \"loader\"\n").unwrap();
        assert_eq!(IoDriverConfig::load(&path).unwrap().worker_name, "loader");
        assert!(IoDriverConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
