//! # Storefront Configuration
//!
//! Global settings shared by every page.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AppConfig::default()                                                │
//! │  2. storefront.toml (explicit path, or the platform config dir)        │
//! │  3. ZHISHENG_* environment variables                                    │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example storefront.toml
//! ```toml
//! name = "芝生药局"
//! version = "1.0.0"
//!
//! [api]
//! base_url = "/api"
//! timeout_ms = 10000
//!
//! [storage]
//! prefix = "zhisheng_"
//! cart_key = "cart"
//!
//! [ui]
//! toast_duration_ms = 2000
//! ```
//!
//! The `[api]` section is carried for page scripts; nothing in this crate
//! issues requests.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use zhisheng_core::Money;

/// Backend endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "/api".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Storage namespace and the keys the storefront owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub prefix: String,
    pub cart_key: String,
    pub user_key: String,
    pub token_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            prefix: zhisheng_storage::DEFAULT_PREFIX.to_string(),
            cart_key: "cart".to_string(),
            user_key: "user_info".to_string(),
            token_key: "auth_token".to_string(),
        }
    }
}

/// Widget defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub toast_duration_ms: u64,
    pub currency_symbol: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            toast_duration_ms: 2000,
            currency_symbol: zhisheng_core::CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl UiConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

/// Complete storefront configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,

    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,

    /// Where the file-backed store lives. `None` → platform data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            name: "芝生药局".to_string(),
            version: "1.0.0".to_string(),
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            ui: UiConfig::default(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// # Errors
    ///
    /// Unreadable or malformed TOML, or values failing [`AppConfig::validate`].
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.storage.prefix.is_empty() {
            return Err(AppError::InvalidConfig(
                "storage.prefix must not be empty".into(),
            ));
        }

        let keys = [
            ("cart_key", &self.storage.cart_key),
            ("user_key", &self.storage.user_key),
            ("token_key", &self.storage.token_key),
        ];
        for (name, key) in keys {
            if key.is_empty() {
                return Err(AppError::InvalidConfig(format!(
                    "storage.{} must not be empty",
                    name
                )));
            }
        }
        if keys[0].1 == keys[1].1 || keys[0].1 == keys[2].1 || keys[1].1 == keys[2].1 {
            return Err(AppError::InvalidConfig(
                "storage keys must be distinct".into(),
            ));
        }

        let base = &self.api.base_url;
        if !(base.starts_with('/') || base.starts_with("http://") || base.starts_with("https://"))
        {
            return Err(AppError::InvalidConfig(format!(
                "api.base_url must be a path or http(s) URL, got: {}",
                base
            )));
        }

        if self.api.timeout_ms == 0 {
            return Err(AppError::InvalidConfig(
                "api.timeout_ms must be greater than 0".into(),
            ));
        }

        if self.ui.toast_duration_ms == 0 {
            return Err(AppError::InvalidConfig(
                "ui.toast_duration_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `ZHISHENG_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("ZHISHENG_STORAGE_PREFIX") {
            debug!(prefix = %prefix, "Overriding storage prefix from environment");
            self.storage.prefix = prefix;
        }

        if let Some(url) = lookup("ZHISHENG_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("ZHISHENG_API_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.api.timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric ZHISHENG_API_TIMEOUT_MS"),
            }
        }

        if let Some(duration) = lookup("ZHISHENG_TOAST_DURATION_MS") {
            match duration.parse::<u64>() {
                Ok(ms) => self.ui.toast_duration_ms = ms,
                Err(_) => {
                    warn!(value = %duration, "Ignoring non-numeric ZHISHENG_TOAST_DURATION_MS")
                }
            }
        }

        if let Some(dir) = lookup("ZHISHENG_DATA_DIR") {
            debug!(dir = %dir, "Overriding data directory from environment");
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// `storefront.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "zhisheng", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    /// Path of the JSON file backing persistent storage.
    ///
    /// ## Platform-Specific Defaults
    /// - Linux: ~/.local/share/storefront/storage.json
    /// - macOS: ~/Library/Application Support/com.zhisheng.storefront/storage.json
    /// - Windows: %APPDATA%/zhisheng/storefront/data/storage.json
    pub fn data_file_path(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("com", "zhisheng", "storefront")
                    .map(|dirs| dirs.data_dir().to_path_buf())
            })
            .map(|dir| dir.join("storage.json"))
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with(&self.ui.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.name, "芝生药局");
        assert_eq!(config.api.base_url, "/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.storage.prefix, "zhisheng_");
        assert_eq!(config.storage.cart_key, "cart");
        assert_eq!(config.ui.toast_duration(), Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.storage.prefix.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.user_key = "cart".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ui.toast_duration_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [storage]
            prefix = "test_"

            [ui]
            toast_duration_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.prefix, "test_");
        assert_eq!(config.storage.cart_key, "cart");
        assert_eq!(config.ui.toast_duration_ms, 1500);
        assert_eq!(config.api.timeout_ms, 10_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(&path, "name = \"测试药局\"\n[api]\nbase_url = \"https://shop.example.com/api\"\n")
            .unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.name, "测试药局");
        assert_eq!(config.api.base_url, "https://shop.example.com/api");
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let err = AppConfig::load(Some(path.clone())).unwrap_err();
        assert!(matches!(err, AppError::ConfigLoadFailed(_)));
        assert_eq!(AppConfig::load_or_default(Some(path)), AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ZHISHENG_STORAGE_PREFIX", "qa_"),
            ("ZHISHENG_API_TIMEOUT_MS", "2500"),
            ("ZHISHENG_TOAST_DURATION_MS", "soon"),
            ("ZHISHENG_DATA_DIR", "/tmp/zhisheng"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.prefix, "qa_");
        assert_eq!(config.api.timeout_ms, 2500);
        assert_eq!(config.ui.toast_duration_ms, 2000);
        assert_eq!(
            config.data_file_path(),
            Some(PathBuf::from("/tmp/zhisheng/storage.json"))
        );
    }

    #[test]
    fn test_format_currency() {
        let mut config = AppConfig::default();
        assert_eq!(config.format_currency(Money::from_fen(1099)), "¥10.99");
        config.ui.currency_symbol = "RMB ".into();
        assert_eq!(config.format_currency(Money::from_fen(900)), "RMB 9.00");
    }
}
