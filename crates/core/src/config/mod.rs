//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (RENTCACHE_*)
//! 2. TOML config file (if RENTCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! List-valued settings take figment's array syntax in the environment,
//! e.g. `RENTCACHE_REFRESH_ENDPOINTS='["/api/brands"]'`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::CacheConfig;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding every cache generation.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Origin of the storefront pages the worker controls.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// The one remote API host whose requests are intercepted despite being
    /// cross-origin.
    #[serde(default)]
    pub api_host: Option<String>,

    /// Base URL that relative refresh endpoints resolve against. Defaults to `origin`.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Current cache generation. Bump on every deploy that changes cached assets.
    #[serde(default = "default_generation_id")]
    pub generation_id: String,

    /// Prefix of every store name; the store is `{store_prefix}-{generation_id}`.
    #[serde(default = "default_store_prefix")]
    pub store_prefix: String,

    /// Regexes matched against the full path and query of API requests.
    #[serde(default = "default_api_patterns")]
    pub api_patterns: Vec<String>,

    /// File extensions (without dot) treated as media.
    #[serde(default = "default_media_extensions")]
    pub media_extensions: Vec<String>,

    /// Path prefix of uploaded media.
    #[serde(default = "default_media_storage_prefix")]
    pub media_storage_prefix: String,

    /// Assets fetched into the store at install time.
    #[serde(default = "default_precache_assets")]
    pub precache_assets: Vec<String>,

    /// Document served to failed navigations.
    #[serde(default = "default_offline_document")]
    pub offline_document: String,

    /// Endpoints re-fetched on the periodic sync signal.
    #[serde(default = "default_refresh_endpoints")]
    pub refresh_endpoints: Vec<String>,

    /// Tag of the one-shot "connectivity restored" sync.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Tag of the recurring content sync.
    #[serde(default = "default_periodic_sync_tag")]
    pub periodic_sync_tag: String,

    /// Route opened by the "view products" notification action.
    #[serde(default = "default_products_route")]
    pub products_route: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./rentcache.sqlite")
}

fn default_user_agent() -> String {
    "rentcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_generation_id() -> String {
    "v1".into()
}

fn default_store_prefix() -> String {
    "rental-storefront".into()
}

fn default_api_patterns() -> Vec<String> {
    vec![
        r"^/api/categories$".into(),
        r"^/api/brands$".into(),
        r"^/api/products(\?.*)?$".into(),
        r"^/api/products/[^/?]+$".into(),
    ]
}

fn default_media_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "svg", "gif", "webp", "avif"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_media_storage_prefix() -> String {
    "/storage/".into()
}

fn default_precache_assets() -> Vec<String> {
    vec!["/".into(), "/offline.html".into(), "/manifest.json".into(), "/images/logo.png".into()]
}

fn default_offline_document() -> String {
    "/offline.html".into()
}

fn default_refresh_endpoints() -> Vec<String> {
    vec!["/api/categories".into(), "/api/brands".into(), "/api/products?featured=true".into()]
}

fn default_sync_tag() -> String {
    "offline-actions".into()
}

fn default_periodic_sync_tag() -> String {
    "content-refresh".into()
}

fn default_products_route() -> String {
    "/products".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            origin: default_origin(),
            api_host: None,
            api_base: None,
            generation_id: default_generation_id(),
            store_prefix: default_store_prefix(),
            api_patterns: default_api_patterns(),
            media_extensions: default_media_extensions(),
            media_storage_prefix: default_media_storage_prefix(),
            precache_assets: default_precache_assets(),
            offline_document: default_offline_document(),
            refresh_endpoints: default_refresh_endpoints(),
            sync_tag: default_sync_tag(),
            periodic_sync_tag: default_periodic_sync_tag(),
            products_route: default_products_route(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The generation this process serves.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(&self.store_prefix, self.generation_id.clone())
    }

    /// Parsed page origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme {scheme}") }),
        }
    }

    /// Base for refresh endpoints: `api_base` when set, the page origin otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the chosen base does not parse.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        match &self.api_base {
            Some(base) => Url::parse(base)
                .map_err(|e| ConfigError::Invalid { field: "api_base".into(), reason: e.to_string() }),
            None => self.origin_url(),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `RENTCACHE_`
    /// 2. TOML file from `RENTCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("RENTCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("RENTCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./rentcache.sqlite"));
        assert_eq!(config.user_agent, "rentcache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.generation_id, "v1");
        assert!(config.api_host.is_none());
        assert_eq!(config.api_patterns.len(), 4);
        assert_eq!(config.media_extensions.len(), 7);
        assert!(config.precache_assets.contains(&config.offline_document));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_cache_config_from_generation() {
        let config = AppConfig { generation_id: "2026-10-19".into(), ..Default::default() };
        let cache = config.cache_config();
        assert_eq!(cache.generation_id, "2026-10-19");
        assert_eq!(cache.store_name, "rental-storefront-2026-10-19");
    }

    #[test]
    fn test_api_base_defaults_to_origin() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url().unwrap(), config.origin_url().unwrap());

        let config = AppConfig { api_base: Some("https://api.rental.test".into()), ..Default::default() };
        assert_eq!(config.api_base_url().unwrap().host_str(), Some("api.rental.test"));
    }

    #[test]
    fn test_origin_rejects_non_http() {
        let config = AppConfig { origin: "file:///srv/www".into(), ..Default::default() };
        assert!(matches!(config.origin_url(), Err(ConfigError::Invalid { field, .. }) if field == "origin"));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "rentcache.toml",
                r#"
                generation_id = "v2"
                api_host = "api.rental.test"
                "#,
            )?;
            jail.set_env("RENTCACHE_CONFIG_FILE", "rentcache.toml");
            jail.set_env("RENTCACHE_TIMEOUT_MS", "5000");
            jail.set_env("RENTCACHE_GENERATION_ID", "v3");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.generation_id, "v3");
            assert_eq!(config.api_host.as_deref(), Some("api.rental.test"));
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.sync_tag, "offline-actions");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RENTCACHE_GENERATION_ID", "v 1");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "generation_id"));
            Ok(())
        });
    }
}
