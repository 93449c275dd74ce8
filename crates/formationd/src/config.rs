//! formationd.toml configuration parser.
//!
//! Every section is optional; command-line flags override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use formation_core::Capacity;

pub const DEFAULT_PORT: u16 = 8443;
pub const DEFAULT_DATA_DIR: &str = "/var/lib/formationd";
pub const DEFAULT_INSTANCE_CPU: i64 = 1024;
pub const DEFAULT_INSTANCE_MEMORY: i64 = 2048;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub server: Option<ServerConfig>,
    pub capacity: Option<CapacityConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
}

/// Per-node ceilings used to validate formation changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub instance_cpu: Option<i64>,
    pub instance_memory: Option<i64>,
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.server
            .as_ref()
            .and_then(|s| s.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn capacity(&self) -> Capacity {
        let section = self.capacity.clone().unwrap_or_default();
        Capacity {
            instance_cpu: section.instance_cpu.unwrap_or(DEFAULT_INSTANCE_CPU),
            instance_memory: section.instance_memory.unwrap_or(DEFAULT_INSTANCE_MEMORY),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        instance_cpu: Option<i64>,
        instance_memory: Option<i64>,
    ) -> Self {
        let server = self.server.get_or_insert_with(ServerConfig::default);
        if port.is_some() {
            server.port = port;
        }
        if data_dir.is_some() {
            server.data_dir = data_dir;
        }

        let capacity = self.capacity.get_or_insert_with(CapacityConfig::default);
        if instance_cpu.is_some() {
            capacity.instance_cpu = instance_cpu;
        }
        if instance_memory.is_some() {
            capacity.instance_memory = instance_memory;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(
            config.capacity(),
            Capacity {
                instance_cpu: DEFAULT_INSTANCE_CPU,
                instance_memory: DEFAULT_INSTANCE_MEMORY,
            }
        );
    }

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
[server]
port = 9000
data_dir = "/tmp/formation"

[capacity]
instance_cpu = 2048
instance_memory = 8192
"#;
        let config: DaemonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.port(), 9000);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/formation"));
        assert_eq!(config.capacity().instance_cpu, 2048);
        assert_eq!(config.capacity().instance_memory, 8192);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: DaemonConfig = toml::from_str("[capacity]\ninstance_cpu = 512\n").unwrap();
        assert_eq!(config.capacity().instance_cpu, 512);
        assert_eq!(config.capacity().instance_memory, DEFAULT_INSTANCE_MEMORY);
        assert_eq!(config.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_overrides_win() {
        let config: DaemonConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        let config = config.with_overrides(Some(7000), None, None, Some(4096));
        assert_eq!(config.port(), 7000);
        assert_eq!(config.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.capacity().instance_memory, 4096);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formationd.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let config = DaemonConfig::from_file(&path).unwrap();
        assert_eq!(config.port(), 8080);
        assert!(DaemonConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
