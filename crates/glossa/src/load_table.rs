//! Per-process memoization of loaded groups.
//!
//! Each (namespace, group, locale) is loaded from its backend at most once
//! for the lifetime of the table, even under concurrent lookups. Later
//! changes in the backend are not picked up.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::TranslationResult;
use crate::key::is_namespaced;
use crate::lines::LoadedLines;

/// Composite key of the load table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub namespace: Option<String>,
    pub group: String,
    pub locale: String,
}

impl LoadKey {
    pub fn new(namespace: Option<&str>, group: &str, locale: &str) -> Self {
        Self {
            namespace: namespace
                .filter(|ns| is_namespaced(Some(ns)))
                .map(str::to_string),
            group: group.to_string(),
            locale: locale.to_string(),
        }
    }
}

type Slot = Arc<OnceCell<Arc<LoadedLines>>>;

/// Memoization table of loaded groups.
#[derive(Default)]
pub struct LoadTable {
    entries: DashMap<LoadKey, Slot>,
}

impl LoadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the group has been loaded.
    pub fn is_loaded(&self, key: &LoadKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|slot| slot.initialized())
    }

    /// Loaded lines of a group, if any.
    pub fn lines(&self, key: &LoadKey) -> Option<Arc<LoadedLines>> {
        self.entries.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Record lines for a group, merging over anything already loaded.
    pub fn record_loaded(&self, key: LoadKey, lines: LoadedLines) {
        let mut entry = self.entries.entry(key).or_default();
        let merged = match entry.value().get() {
            Some(existing) => {
                let mut merged = LoadedLines::clone(existing);
                merged.merge(lines);
                merged
            }
            None => lines,
        };
        *entry = Arc::new(OnceCell::new_with(Some(Arc::new(merged))));
    }

    /// Return the loaded lines, running `load` only if the group was never
    /// loaded.
    ///
    /// Concurrent callers for the same key wait on a single load. A failed
    /// load leaves the group unloaded so the next call retries.
    pub async fn get_or_load<F, Fut>(&self, key: LoadKey, load: F) -> TranslationResult<Arc<LoadedLines>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TranslationResult<LoadedLines>>,
    {
        // Clone the slot out so no map guard is held across the await.
        let slot: Slot = Arc::clone(self.entries.entry(key).or_default().value());

        let lines = slot
            .get_or_try_init(|| async move { load().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(lines))
    }

    /// Number of groups with a slot, loaded or in flight.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for LoadTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadTable")
            .field("groups", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::TranslationError;

    fn key(group: &str, locale: &str) -> LoadKey {
        LoadKey::new(None, group, locale)
    }

    fn unavailable() -> TranslationError {
        TranslationError::database("en", "messages", anyhow::anyhow!("down"))
    }

    #[test]
    fn default_namespace_keys_are_normalized() {
        assert_eq!(LoadKey::new(Some("*"), "messages", "en"), key("messages", "en"));
        assert_ne!(LoadKey::new(Some("pkg"), "messages", "en"), key("messages", "en"));
    }

    #[tokio::test]
    async fn loads_once_per_key() {
        let table = LoadTable::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let lines = table
                .get_or_load(key("messages", "en"), || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TranslationError>(LoadedLines::from_pairs([("hi", "Hi")]))
                })
                .await
                .unwrap();
            assert_eq!(lines.text("hi"), Some("Hi"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(table.is_loaded(&key("messages", "en")));
        assert!(!table.is_loaded(&key("messages", "fr")));
        assert!(table.lines(&key("messages", "fr")).is_none());
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_call() {
        let table = Arc::new(LoadTable::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let table = Arc::clone(&table);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                table
                    .get_or_load(key("messages", "en"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, TranslationError>(LoadedLines::from_pairs([("hi", "Hi")]))
                    })
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        let table = LoadTable::new();

        let err = table
            .get_or_load(key("messages", "en"), || async {
                Err::<LoadedLines, _>(unavailable())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::Database { .. }));
        assert!(!table.is_loaded(&key("messages", "en")));

        let lines = table
            .get_or_load(key("messages", "en"), || async {
                Ok::<_, TranslationError>(LoadedLines::from_pairs([("hi", "Hi")]))
            })
            .await
            .unwrap();
        assert_eq!(lines.text("hi"), Some("Hi"));
    }

    #[tokio::test]
    async fn recorded_lines_count_as_loaded() {
        let table = LoadTable::new();
        table.record_loaded(key("messages", "en"), LoadedLines::from_pairs([("a", "A")]));
        table.record_loaded(key("messages", "en"), LoadedLines::from_pairs([("b", "B")]));

        assert!(table.is_loaded(&key("messages", "en")));

        // A reload would fail; the recorded lines must be served instead.
        let lines = table
            .get_or_load(key("messages", "en"), || async {
                Err::<LoadedLines, _>(unavailable())
            })
            .await
            .unwrap();
        assert_eq!(lines.text("a"), Some("A"));
        assert_eq!(lines.text("b"), Some("B"));
        assert_eq!(table.len(), 1);
    }
}
