//! Configuration for the ARL backend connection

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default base URL of a local ARL install.
pub const DEFAULT_ARL_URL: &str = "https://127.0.0.1:5192";

/// Connection settings for the ARL backend.
///
/// ARL installs typically ship a self-signed certificate, so certificate
/// validation is off unless `verify_tls` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArlConfig {
    pub base_url: String,
    pub token: String,
    #[serde(default)]
    pub verify_tls: bool,
}

/// On-disk shape of the config file; everything optional so the
/// environment can fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    verify_tls: Option<bool>,
}

impl FileConfig {
    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl ArlConfig {
    /// Build a config directly, mainly for tests and embedding.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            verify_tls: false,
        }
    }

    /// Load configuration with cascade:
    /// 1. explicit `--config` path (if given)
    /// 2. ./arlmcp.toml
    /// 3. ~/.arlmcp/config.toml
    /// then apply `ARL_URL` / `ARL_TOKEN` / `ARL_VERIFY_TLS` overrides.
    ///
    /// A missing token is fatal: no tool can authenticate without it.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = Self::locate_file(explicit)?;
        Self::resolve(file)
    }

    fn locate_file(explicit: Option<&Path>) -> Result<FileConfig> {
        if let Some(path) = explicit {
            // An explicitly named file that fails to load is a hard error.
            return FileConfig::from_file(path);
        }
        if let Ok(file) = FileConfig::from_file("arlmcp.toml") {
            return Ok(file);
        }
        if let Some(global) = Self::global_config_path() {
            if let Ok(file) = FileConfig::from_file(&global) {
                return Ok(file);
            }
        }
        Ok(FileConfig::default())
    }

    fn resolve(file: FileConfig) -> Result<Self> {
        let base_url = std::env::var("ARL_URL")
            .ok()
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_ARL_URL.to_string());

        let token = std::env::var("ARL_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or(file.token)
            .ok_or_else(|| {
                Error::Config(
                    "ARL_TOKEN is not set; export it or add `token` to arlmcp.toml".to_string(),
                )
            })?;

        let verify_tls = match std::env::var("ARL_VERIFY_TLS") {
            Ok(v) => matches!(v.as_str(), "1" | "true" | "yes"),
            Err(_) => file.verify_tls.unwrap_or(false),
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            verify_tls,
        })
    }

    /// Path of the global config file, if a home directory exists.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".arlmcp").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requires_token() {
        std::env::remove_var("ARL_TOKEN");
        let result = ArlConfig::resolve(FileConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_defaults() {
        std::env::remove_var("ARL_URL");
        std::env::remove_var("ARL_VERIFY_TLS");
        let file = FileConfig {
            url: None,
            token: Some("secret".to_string()),
            verify_tls: None,
        };
        let config = ArlConfig::resolve(file).unwrap();
        assert_eq!(config.base_url, DEFAULT_ARL_URL);
        assert_eq!(config.token, "secret");
        assert!(!config.verify_tls);
    }

    #[test]
    fn test_resolve_trims_trailing_slash() {
        let file = FileConfig {
            url: Some("https://arl.example.com/".to_string()),
            token: Some("secret".to_string()),
            verify_tls: Some(true),
        };
        std::env::remove_var("ARL_URL");
        std::env::remove_var("ARL_VERIFY_TLS");
        let config = ArlConfig::resolve(file).unwrap();
        assert_eq!(config.base_url, "https://arl.example.com");
        assert!(config.verify_tls);
    }

    #[test]
    fn test_parse_config_file() {
        let toml = r#"
url = "https://10.0.0.5:5192"
token = "abc123"
verify_tls = false
"#;
        let file: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(file.url.as_deref(), Some("https://10.0.0.5:5192"));
        assert_eq!(file.token.as_deref(), Some("abc123"));
        assert_eq!(file.verify_tls, Some(false));
    }
}
