//! Translator configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime flags consulted by the backend loader on every load.
pub trait ConfigProvider: Send + Sync {
    /// Development mode: bypass the long-lived cache so edits show up live.
    fn debug_mode(&self) -> bool;

    /// Force caching even in debug mode.
    fn minimal_mode(&self) -> bool;

    /// Serve file lines when the database has none for a group.
    fn file_fallback_enabled(&self) -> bool;
}

/// Translator configuration.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Locale used when a lookup does not name one (default: en).
    pub locale: String,

    /// Locale tried after the primary one (default: en).
    pub fallback_locale: Option<String>,

    /// Debug mode (APP_DEBUG, default: false).
    pub debug: bool,

    /// Minimal mode (TRANSLATION_DB_MINIMAL, default: false).
    pub minimal: bool,

    /// File fallback (TRANSLATION_DB_FILE_FALLBACK, default: false).
    pub file_fallback: bool,

    /// Root of the language files (default: ./lang).
    pub lang_path: PathBuf,

    /// PostgreSQL connection URL for the translation store.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Redis connection URL for the shared cache tier.
    pub redis_url: Option<String>,

    /// Groups held by the in-process cache before the least used are
    /// evicted (TRANSLATION_CACHE_CAPACITY, default: 10000).
    pub cache_capacity: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            fallback_locale: Some("en".to_string()),
            debug: false,
            minimal: false,
            file_fallback: false,
            lang_path: PathBuf::from("./lang"),
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
            cache_capacity: 10_000,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let locale = var("APP_LOCALE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.locale);

        let fallback_locale = match var("APP_FALLBACK_LOCALE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => defaults.fallback_locale,
        };

        let debug = parse_flag(var("APP_DEBUG"), false).context("APP_DEBUG must be a boolean")?;

        let minimal = parse_flag(var("TRANSLATION_DB_MINIMAL"), false)
            .context("TRANSLATION_DB_MINIMAL must be a boolean")?;

        let file_fallback = parse_flag(var("TRANSLATION_DB_FILE_FALLBACK"), false)
            .context("TRANSLATION_DB_FILE_FALLBACK must be a boolean")?;

        let lang_path = var("LANG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.lang_path);

        let database_url = var("DATABASE_URL").filter(|v| !v.is_empty());

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let redis_url = var("REDIS_URL").filter(|v| !v.is_empty());

        let cache_capacity = match var("TRANSLATION_CACHE_CAPACITY") {
            Some(v) => v
                .trim()
                .parse()
                .context("TRANSLATION_CACHE_CAPACITY must be a valid u64")?,
            None => defaults.cache_capacity,
        };

        Ok(Self {
            locale,
            fallback_locale,
            debug,
            minimal,
            file_fallback,
            lang_path,
            database_url,
            database_max_connections,
            redis_url,
            cache_capacity,
        })
    }
}

impl ConfigProvider for TranslatorConfig {
    fn debug_mode(&self) -> bool {
        self.debug
    }

    fn minimal_mode(&self) -> bool {
        self.minimal
    }

    fn file_fallback_enabled(&self) -> bool {
        self.file_fallback
    }
}

fn parse_flag(value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean '{other}'"),
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<TranslatorConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TranslatorConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.locale, "en");
        assert_eq!(config.fallback_locale.as_deref(), Some("en"));
        assert!(!config.debug_mode());
        assert!(!config.minimal_mode());
        assert!(!config.file_fallback_enabled());
        assert_eq!(config.lang_path, PathBuf::from("./lang"));
        assert_eq!(config.database_max_connections, 10);
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.cache_capacity, 10_000);
    }

    #[test]
    fn flags_and_locales() {
        let config = load(&[
            ("APP_LOCALE", "nl"),
            ("APP_FALLBACK_LOCALE", "de"),
            ("APP_DEBUG", "true"),
            ("TRANSLATION_DB_MINIMAL", "1"),
            ("TRANSLATION_DB_FILE_FALLBACK", "On"),
            ("LANG_PATH", "/srv/lang"),
            ("DATABASE_URL", "postgres://localhost/app"),
        ])
        .unwrap();

        assert_eq!(config.locale, "nl");
        assert_eq!(config.fallback_locale.as_deref(), Some("de"));
        assert!(config.debug_mode());
        assert!(config.minimal_mode());
        assert!(config.file_fallback_enabled());
        assert_eq!(config.lang_path, PathBuf::from("/srv/lang"));
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/app")
        );
    }

    #[test]
    fn empty_fallback_disables_it() {
        let config = load(&[("APP_FALLBACK_LOCALE", "")]).unwrap();
        assert_eq!(config.fallback_locale, None);
    }

    #[test]
    fn invalid_flag_is_an_error() {
        let err = load(&[("APP_DEBUG", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("APP_DEBUG"));
    }

    #[test]
    fn cache_capacity_is_configurable() {
        let config = load(&[("TRANSLATION_CACHE_CAPACITY", "250")]).unwrap();
        assert_eq!(config.cache_capacity, 250);
        assert!(load(&[("TRANSLATION_CACHE_CAPACITY", "-1")]).is_err());
    }

    #[test]
    fn invalid_pool_size_is_an_error() {
        assert!(load(&[("DATABASE_MAX_CONNECTIONS", "lots")]).is_err());
    }
}
