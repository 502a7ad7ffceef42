use std::time::Duration;

use serde::Deserialize;

use crate::error::{MilvusError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:19121";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Read `MILVUS_URL` and `MILVUS_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("MILVUS_URL") {
            config.base_url = url;
        }
        if let Some(raw) = lookup("MILVUS_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                MilvusError::Config(format!("MILVUS_TIMEOUT_SECS is not a number: {}", raw))
            })?;
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://milvus:19121"}"#).unwrap();
        assert_eq!(config.base_url, "http://milvus:19121");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            [("MILVUS_URL", "http://db:19121"), ("MILVUS_TIMEOUT_SECS", " 5 ")].into();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, "http://db:19121");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let result = ClientConfig::from_lookup(|k| {
            (k == "MILVUS_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(MilvusError::Config(_))));
    }
}
