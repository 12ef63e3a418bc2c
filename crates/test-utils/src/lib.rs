//! Glossa test utilities.
//!
//! Helpers for integration testing: recording fakes for every translator
//! collaborator, configuration and language-directory fixtures, and a
//! tracing setup for test output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use glossa::cache::ComputeLines;
use glossa::{
    CacheStore, DatabaseStore, FileLoader, LoadedLines, MemoryCache, Translator, TranslatorConfig,
};
use parking_lot::Mutex;

/// Initialize tracing for a test binary, honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// One backend load observed by a recording fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCall {
    pub locale: String,
    pub group: String,
    pub namespace: Option<String>,
}

/// One missing-key registration observed by [`RecordingDatabase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCall {
    pub locale: String,
    pub group: String,
    pub key: String,
}

impl MissingCall {
    pub fn new(locale: &str, group: &str, key: &str) -> Self {
        Self {
            locale: locale.to_string(),
            group: group.to_string(),
            key: key.to_string(),
        }
    }
}

type LinesKey = (Option<String>, String, String);

fn lines_key(namespace: Option<&str>, group: &str, locale: &str) -> LinesKey {
    (
        namespace.filter(|ns| *ns != "*").map(str::to_string),
        group.to_string(),
        locale.to_string(),
    )
}

/// Canned lines plus a log of every load.
#[derive(Debug, Default)]
struct Recorded {
    lines: HashMap<LinesKey, LoadedLines>,
    loads: Mutex<Vec<LoadCall>>,
    fail_loads: bool,
}

impl Recorded {
    fn load(&self, locale: &str, group: &str, namespace: Option<&str>) -> Result<LoadedLines> {
        self.loads.lock().push(LoadCall {
            locale: locale.to_string(),
            group: group.to_string(),
            namespace: namespace.map(str::to_string),
        });

        if self.fail_loads {
            anyhow::bail!("backend unavailable");
        }

        Ok(self
            .lines
            .get(&lines_key(namespace, group, locale))
            .cloned()
            .unwrap_or_default())
    }

    fn insert(&mut self, namespace: Option<&str>, locale: &str, group: &str, pairs: &[(&str, &str)]) {
        self.lines
            .entry(lines_key(namespace, group, locale))
            .or_default()
            .merge(LoadedLines::from_pairs(pairs.iter().copied()));
    }

    fn loads(&self) -> Vec<LoadCall> {
        self.loads.lock().clone()
    }

    fn loads_of(&self, locale: &str, group: &str) -> usize {
        self.loads
            .lock()
            .iter()
            .filter(|call| call.locale == locale && call.group == group)
            .count()
    }
}

/// In-memory [`FileLoader`] that records every load.
#[derive(Debug, Default)]
pub struct RecordingFileLoader {
    inner: Recorded,
}

impl RecordingFileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add default-namespace lines.
    pub fn with_lines(mut self, locale: &str, group: &str, pairs: &[(&str, &str)]) -> Self {
        self.inner.insert(None, locale, group, pairs);
        self
    }

    /// Add lines for a named namespace.
    pub fn with_namespaced(
        mut self,
        namespace: &str,
        locale: &str,
        group: &str,
        pairs: &[(&str, &str)],
    ) -> Self {
        self.inner.insert(Some(namespace), locale, group, pairs);
        self
    }

    /// Fail every load.
    pub fn failing(mut self) -> Self {
        self.inner.fail_loads = true;
        self
    }

    /// Every load so far, in order.
    pub fn loads(&self) -> Vec<LoadCall> {
        self.inner.loads()
    }

    /// Number of loads so far.
    pub fn load_count(&self) -> usize {
        self.inner.loads.lock().len()
    }

    /// Number of loads of one (locale, group).
    pub fn loads_of(&self, locale: &str, group: &str) -> usize {
        self.inner.loads_of(locale, group)
    }
}

#[async_trait]
impl FileLoader for RecordingFileLoader {
    async fn load(&self, locale: &str, group: &str, namespace: Option<&str>) -> Result<LoadedLines> {
        self.inner.load(locale, group, namespace)
    }
}

/// In-memory [`DatabaseStore`] that records loads and missing keys.
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    inner: Recorded,
    missing: Mutex<Vec<MissingCall>>,
    fail_writes: bool,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add lines for a locale and group.
    pub fn with_lines(mut self, locale: &str, group: &str, pairs: &[(&str, &str)]) -> Self {
        self.inner.insert(None, locale, group, pairs);
        self
    }

    /// Fail every load.
    pub fn failing(mut self) -> Self {
        self.inner.fail_loads = true;
        self
    }

    /// Fail every missing-key registration.
    pub fn read_only(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn loads(&self) -> Vec<LoadCall> {
        self.inner.loads()
    }

    pub fn load_count(&self) -> usize {
        self.inner.loads.lock().len()
    }

    pub fn loads_of(&self, locale: &str, group: &str) -> usize {
        self.inner.loads_of(locale, group)
    }

    /// Every missing-key registration so far, in order.
    pub fn missing(&self) -> Vec<MissingCall> {
        self.missing.lock().clone()
    }
}

#[async_trait]
impl DatabaseStore for RecordingDatabase {
    async fn load(&self, locale: &str, group: &str, namespace: Option<&str>) -> Result<LoadedLines> {
        self.inner.load(locale, group, namespace)
    }

    async fn add_translation(&self, locale: &str, group: &str, key: &str) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("translation table is read-only");
        }
        self.missing.lock().push(MissingCall::new(locale, group, key));
        Ok(())
    }
}

/// [`MemoryCache`] wrapper counting computes and forgets.
#[derive(Debug, Default)]
pub struct RecordingCache {
    cache: MemoryCache,
    computes: Arc<AtomicUsize>,
    forgets: AtomicUsize,
    fail: bool,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call without computing.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of misses that ran the compute future.
    pub fn computes(&self) -> usize {
        self.computes.load(Ordering::SeqCst)
    }

    pub fn forgets(&self) -> usize {
        self.forgets.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.cache.contains(key).await
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn remember_forever<'a>(
        &self,
        key: &str,
        compute: ComputeLines<'a>,
    ) -> Result<LoadedLines> {
        if self.fail {
            anyhow::bail!("cache backend unavailable");
        }

        let computes = Arc::clone(&self.computes);
        let counted: ComputeLines<'a> = Box::pin(async move {
            computes.fetch_add(1, Ordering::SeqCst);
            compute.await
        });
        self.cache.remember_forever(key, counted).await
    }

    async fn forget(&self, key: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("cache backend unavailable");
        }
        self.forgets.fetch_add(1, Ordering::SeqCst);
        self.cache.forget(key).await
    }
}

/// Create a production-mode test configuration.
pub fn test_config() -> TestConfig {
    TestConfig {
        config: TranslatorConfig::default(),
    }
}

/// A configuration builder for translator fixtures.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub config: TranslatorConfig,
}

impl TestConfig {
    /// Set the current locale.
    pub fn with_locale(mut self, locale: &str) -> Self {
        self.config.locale = locale.to_string();
        self
    }

    /// Set the fallback locale.
    pub fn with_fallback(mut self, fallback: &str) -> Self {
        self.config.fallback_locale = Some(fallback.to_string());
        self
    }

    /// Remove the fallback locale.
    pub fn without_fallback(mut self) -> Self {
        self.config.fallback_locale = None;
        self
    }

    /// Enable debug mode.
    pub fn debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    /// Enable minimal mode.
    pub fn minimal(mut self) -> Self {
        self.config.minimal = true;
        self
    }

    /// Enable file fallback.
    pub fn with_file_fallback(mut self) -> Self {
        self.config.file_fallback = true;
        self
    }

    pub fn build(self) -> Arc<TranslatorConfig> {
        Arc::new(self.config)
    }
}

/// A translator over recording fakes, with handles to inspect them.
pub struct TestTranslator {
    pub translator: Translator,
    pub files: Arc<RecordingFileLoader>,
    pub database: Arc<RecordingDatabase>,
    pub cache: Arc<RecordingCache>,
}

impl TestTranslator {
    pub fn new(
        files: RecordingFileLoader,
        database: RecordingDatabase,
        cache: RecordingCache,
        config: TestConfig,
    ) -> Self {
        let files = Arc::new(files);
        let database = Arc::new(database);
        let cache = Arc::new(cache);
        let translator = Translator::from_config(
            files.clone(),
            database.clone(),
            cache.clone(),
            config.build(),
        );

        Self {
            translator,
            files,
            database,
            cache,
        }
    }
}

/// A temporary language directory.
///
/// Fixture writes panic on I/O failure.
pub struct LangDir {
    dir: tempfile::TempDir,
}

#[allow(clippy::expect_used)]
impl LangDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp language directory"),
        }
    }

    /// Root of the language directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `{locale}/{group}.json` from a JSON value.
    pub fn with_json(self, locale: &str, group: &str, lines: serde_json::Value) -> Self {
        let content = serde_json::to_string_pretty(&lines).expect("encode fixture lines");
        self.with_file(&format!("{locale}/{group}.json"), &content)
    }

    /// Write `{locale}/{group}.yaml` verbatim.
    pub fn with_yaml(self, locale: &str, group: &str, content: &str) -> Self {
        self.with_file(&format!("{locale}/{group}.yaml"), content)
    }

    /// Write a namespace override under `vendor/{namespace}`.
    pub fn with_vendor(
        self,
        namespace: &str,
        locale: &str,
        group: &str,
        lines: serde_json::Value,
    ) -> Self {
        let content = serde_json::to_string_pretty(&lines).expect("encode fixture lines");
        self.with_file(&format!("vendor/{namespace}/{locale}/{group}.json"), &content)
    }

    /// Write any file relative to the root.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture directory");
        }
        std::fs::write(&path, content).expect("write fixture file");
        self
    }

    /// Absolute path of a subdirectory, for namespace hints.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

impl Default for LangDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_file_loader_serves_and_logs() {
        let files = RecordingFileLoader::new()
            .with_lines("en", "messages", &[("hi", "Hi")])
            .with_namespaced("billing", "en", "invoices", &[("title", "Invoices")]);

        let lines = files.load("en", "messages", Some("*")).await.unwrap();
        assert_eq!(lines.text("hi"), Some("Hi"));

        let lines = files.load("en", "invoices", Some("billing")).await.unwrap();
        assert_eq!(lines.text("title"), Some("Invoices"));

        assert!(files.load("fr", "messages", None).await.unwrap().is_empty());
        assert_eq!(files.load_count(), 3);
        assert_eq!(files.loads_of("en", "messages"), 1);
    }

    #[tokio::test]
    async fn recording_database_logs_missing_keys() {
        let database = RecordingDatabase::new();
        database.add_translation("de", "messages", "messages.hi").await.unwrap();

        assert_eq!(database.missing(), vec![MissingCall::new("de", "messages", "messages.hi")]);

        let read_only = RecordingDatabase::new().read_only();
        assert!(read_only.add_translation("de", "messages", "messages.hi").await.is_err());
    }

    #[tokio::test]
    async fn recording_cache_counts_computes() {
        let cache = RecordingCache::new();
        for _ in 0..2 {
            cache
                .remember_forever(
                    "translations.en.messages",
                    Box::pin(async { Ok::<_, anyhow::Error>(LoadedLines::new()) }),
                )
                .await
                .unwrap();
        }
        assert_eq!(cache.computes(), 1);

        cache.forget("translations.en.messages").await.unwrap();
        assert_eq!(cache.forgets(), 1);
        assert!(!cache.contains("translations.en.messages").await);
    }

    #[test]
    fn test_config_builder() {
        let config = test_config().debug().with_file_fallback().without_fallback().build();
        assert!(config.debug);
        assert!(!config.minimal);
        assert!(config.file_fallback);
        assert_eq!(config.fallback_locale, None);
    }

    #[test]
    fn lang_dir_writes_files() {
        let dir = LangDir::new()
            .with_json("en", "messages", serde_json::json!({"hi": "Hi"}))
            .with_vendor("billing", "en", "invoices", serde_json::json!({"title": "Bills"}));

        assert!(dir.path().join("en/messages.json").exists());
        assert!(dir.join("vendor/billing/en/invoices.json").exists());
    }
}
