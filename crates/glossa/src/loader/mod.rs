//! Translation backends and the loader that chooses between them.
//!
//! Namespaced groups always come from files. Default-namespace groups come
//! from the database, optionally through the long-lived cache, and fall back
//! to files when the database has nothing and file fallback is enabled.

mod database;
mod file;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

pub use database::{MissingTranslation, PgTranslationStore};
pub use file::LocalFileLoader;

use crate::cache::{CacheStore, ComputeLines, cache_key};
use crate::config::ConfigProvider;
use crate::error::{TranslationError, TranslationResult};
use crate::key::is_namespaced;
use crate::lines::LoadedLines;

/// File-based translation source.
#[async_trait]
pub trait FileLoader: Send + Sync {
    /// Load the lines of a group.
    ///
    /// Returns empty lines, not an error, when no file exists.
    async fn load(&self, locale: &str, group: &str, namespace: Option<&str>)
    -> Result<LoadedLines>;
}

/// Database-backed translation source and missing-key sink.
#[async_trait]
pub trait DatabaseStore: Send + Sync {
    /// Load the translated lines of a group. Unknown groups yield empty lines.
    async fn load(&self, locale: &str, group: &str, namespace: Option<&str>)
    -> Result<LoadedLines>;

    /// Register a key that has no translation yet.
    ///
    /// Must tolerate keys it has never seen and repeated registrations.
    async fn add_translation(&self, locale: &str, group: &str, key: &str) -> Result<()>;
}

/// Picks the backend for a (namespace, group, locale) and applies caching.
#[derive(Clone)]
pub struct BackendLoader {
    files: Arc<dyn FileLoader>,
    database: Arc<dyn DatabaseStore>,
    cache: Arc<dyn CacheStore>,
    config: Arc<dyn ConfigProvider>,
}

impl BackendLoader {
    pub fn new(
        files: Arc<dyn FileLoader>,
        database: Arc<dyn DatabaseStore>,
        cache: Arc<dyn CacheStore>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            files,
            database,
            cache,
            config,
        }
    }

    /// Load the lines for one (namespace, group, locale).
    pub async fn load(
        &self,
        namespace: Option<&str>,
        group: &str,
        locale: &str,
    ) -> TranslationResult<LoadedLines> {
        if is_namespaced(namespace) {
            debug!(namespace = ?namespace, group = %group, locale = %locale, "loading namespaced group from files");
            return self.load_from_files(namespace, group, locale).await;
        }

        if !self.uses_cache() {
            debug!(group = %group, locale = %locale, "loading group from database (uncached)");
            return self.load_from_database(namespace, group, locale).await;
        }

        let key = cache_key(locale, group);
        let compute: ComputeLines<'_> = Box::pin(async move {
            self.load_from_database(namespace, group, locale)
                .await
                .map_err(anyhow::Error::new)
        });

        self.cache
            .remember_forever(&key, compute)
            .await
            .map_err(|e| match e.downcast::<TranslationError>() {
                Ok(backend) => backend,
                Err(e) => TranslationError::cache(locale, group, e),
            })
    }

    /// Drop the cached lines of a default-namespace group.
    pub async fn forget(&self, locale: &str, group: &str) -> TranslationResult<()> {
        self.cache
            .forget(&cache_key(locale, group))
            .await
            .map_err(|e| TranslationError::cache(locale, group, e))
    }

    /// Caching applies outside debug mode, or always in minimal mode.
    fn uses_cache(&self) -> bool {
        !self.config.debug_mode() || self.config.minimal_mode()
    }

    async fn load_from_database(
        &self,
        namespace: Option<&str>,
        group: &str,
        locale: &str,
    ) -> TranslationResult<LoadedLines> {
        let lines = self
            .database
            .load(locale, group, namespace)
            .await
            .map_err(|e| TranslationError::database(locale, group, e))?;

        if lines.is_empty() && self.config.file_fallback_enabled() {
            debug!(group = %group, locale = %locale, "database has no lines, falling back to files");
            return self.load_from_files(namespace, group, locale).await;
        }

        Ok(lines)
    }

    async fn load_from_files(
        &self,
        namespace: Option<&str>,
        group: &str,
        locale: &str,
    ) -> TranslationResult<LoadedLines> {
        self.files
            .load(locale, group, namespace)
            .await
            .map_err(|e| TranslationError::file_loader(locale, group, e))
    }
}

impl std::fmt::Debug for BackendLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendLoader")
            .field("uses_cache", &self.uses_cache())
            .finish()
    }
}
