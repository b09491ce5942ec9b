use anyhow::{Context, Result};
use std::net::SocketAddr;

use crate::storage::StorageConfig;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Process-level settings, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub storage: StorageConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = raw
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid BIND_ADDRESS: {raw}"))?;

        Ok(Self {
            bind_address,
            storage: StorageConfig::from_lookup(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert!(matches!(config.storage, StorageConfig::Local { .. }));
    }

    #[test]
    fn test_bind_address_override() {
        let config = ServerConfig::from_lookup(|key| match key {
            "BIND_ADDRESS" => Some("127.0.0.1:8888".to_string()),
            "STORAGE_BACKEND" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8888");
        assert!(matches!(config.storage, StorageConfig::Memory));
    }

    #[test]
    fn test_invalid_bind_address() {
        let result = ServerConfig::from_lookup(|key| {
            (key == "BIND_ADDRESS").then(|| "not-an-address".to_string())
        });
        assert!(result.unwrap_err().to_string().contains("BIND_ADDRESS"));
    }
}
