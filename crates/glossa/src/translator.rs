//! Translation lookup.
//!
//! The [`Translator`] resolves a key through the locale chain, loading each
//! (namespace, group, locale) at most once and recording default-namespace
//! misses so they can be translated later.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cache::CacheStore;
use crate::config::{ConfigProvider, TranslatorConfig};
use crate::error::TranslationResult;
use crate::key::TranslationKey;
use crate::lines::{LoadedLines, Replacements, make_replacements};
use crate::load_table::{LoadKey, LoadTable};
use crate::loader::{BackendLoader, DatabaseStore, FileLoader};
use crate::locale::LocaleChain;
use crate::missing::MissingKeyRecorder;
use crate::plural::MessageSelector;

/// Database-backed translator with file fallback.
pub struct Translator {
    loader: BackendLoader,
    recorder: MissingKeyRecorder,
    loaded: LoadTable,

    /// Locale used when a lookup names none.
    locale: RwLock<String>,

    /// Locale tried after the primary one.
    fallback: RwLock<Option<String>>,

    /// When set, `trans` records every resolved string.
    editing: AtomicBool,
    edited: Mutex<BTreeMap<String, String>>,
}

impl Translator {
    pub fn new(
        files: Arc<dyn FileLoader>,
        database: Arc<dyn DatabaseStore>,
        cache: Arc<dyn CacheStore>,
        config: Arc<dyn ConfigProvider>,
        locale: impl Into<String>,
    ) -> Self {
        let recorder = MissingKeyRecorder::new(Arc::clone(&database));
        Self {
            loader: BackendLoader::new(files, database, cache, config),
            recorder,
            loaded: LoadTable::new(),
            locale: RwLock::new(locale.into()),
            fallback: RwLock::new(None),
            editing: AtomicBool::new(false),
            edited: Mutex::new(BTreeMap::new()),
        }
    }

    /// Build a translator whose locales come from the configuration.
    pub fn from_config(
        files: Arc<dyn FileLoader>,
        database: Arc<dyn DatabaseStore>,
        cache: Arc<dyn CacheStore>,
        config: Arc<TranslatorConfig>,
    ) -> Self {
        let locale = config.locale.clone();
        let fallback = config.fallback_locale.clone();
        let translator = Self::new(files, database, cache, config, locale);
        *translator.fallback.write() = fallback;
        translator
    }

    /// Set the fallback locale.
    pub fn with_fallback(self, fallback: impl Into<String>) -> Self {
        *self.fallback.write() = Some(fallback.into());
        self
    }

    /// Resolve a key to its line with placeholders replaced.
    ///
    /// `locale` overrides the current locale for this lookup. With
    /// `fallback` the fallback locale is tried after it. Returns the key
    /// itself when no candidate locale has a line.
    pub async fn get(
        &self,
        key: &str,
        replacements: &Replacements<'_>,
        locale: Option<&str>,
        fallback: bool,
    ) -> TranslationResult<String> {
        match self.resolve(key, locale, fallback).await? {
            Some((_, line)) => Ok(make_replacements(&line, replacements)),
            None => Ok(key.to_string()),
        }
    }

    /// Like [`get`](Self::get) with the fallback locale, recording the
    /// result while editing mode is on.
    pub async fn trans(
        &self,
        key: &str,
        replacements: &Replacements<'_>,
        locale: Option<&str>,
    ) -> TranslationResult<String> {
        let line = self.get(key, replacements, locale, true).await?;
        self.record_edited(key, &line);
        Ok(line)
    }

    /// Resolve a pluralized key for `count`.
    ///
    /// The variant is chosen under the plural rules of the locale whose line
    /// matched, then placeholders are replaced with `{count}` available.
    pub async fn choice(
        &self,
        key: &str,
        count: i64,
        replacements: &Replacements<'_>,
        locale: Option<&str>,
    ) -> TranslationResult<String> {
        let Some((matched, line)) = self.resolve(key, locale, true).await? else {
            return Ok(key.to_string());
        };

        let selected = MessageSelector::choose(&line, count, &matched);

        let count = count.to_string();
        let mut with_count = replacements.to_vec();
        with_count.push(("count", count.as_str()));
        Ok(make_replacements(&selected, &with_count))
    }

    /// Like [`choice`](Self::choice), recording the result while editing
    /// mode is on.
    pub async fn trans_choice(
        &self,
        key: &str,
        count: i64,
        replacements: &Replacements<'_>,
        locale: Option<&str>,
    ) -> TranslationResult<String> {
        let line = self.choice(key, count, replacements, locale).await?;
        self.record_edited(key, &line);
        Ok(line)
    }

    /// Whether any candidate locale has a line for the key.
    ///
    /// Misses are recorded the same way as for [`get`](Self::get).
    pub async fn has(&self, key: &str, locale: Option<&str>, fallback: bool) -> TranslationResult<bool> {
        Ok(self.resolve(key, locale, fallback).await?.is_some())
    }

    /// Load a group, consulting the backend only the first time.
    pub async fn load(
        &self,
        namespace: Option<&str>,
        group: &str,
        locale: &str,
    ) -> TranslationResult<Arc<LoadedLines>> {
        let key = LoadKey::new(namespace, group, locale);
        self.loaded
            .get_or_load(key, || self.loader.load(namespace, group, locale))
            .await
    }

    /// Whether a group has been loaded in this process.
    pub fn is_loaded(&self, namespace: Option<&str>, group: &str, locale: &str) -> bool {
        self.loaded.is_loaded(&LoadKey::new(namespace, group, locale))
    }

    /// Add `group.item → text` lines for a locale.
    ///
    /// The affected groups count as loaded afterwards; keys without a group
    /// are skipped.
    pub fn add_lines(&self, lines: &[(&str, &str)], locale: &str, namespace: Option<&str>) {
        let mut groups: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for &(key, text) in lines {
            match key.split_once('.') {
                Some((group, item)) if !group.is_empty() && !item.is_empty() => {
                    groups.entry(group).or_default().push((item, text));
                }
                _ => debug!(key = %key, "skipping line without a group"),
            }
        }

        for (group, pairs) in groups {
            self.loaded.record_loaded(
                LoadKey::new(namespace, group, locale),
                LoadedLines::from_pairs(pairs),
            );
        }
    }

    /// Drop the cached lines of a default-namespace group.
    ///
    /// Lines already loaded in this process are kept.
    pub async fn forget_cached(&self, locale: &str, group: &str) -> TranslationResult<()> {
        self.loader.forget(locale, group).await
    }

    /// The current locale.
    pub fn locale(&self) -> String {
        self.locale.read().clone()
    }

    pub fn set_locale(&self, locale: impl Into<String>) {
        *self.locale.write() = locale.into();
    }

    /// The fallback locale.
    pub fn fallback(&self) -> Option<String> {
        self.fallback.read().clone()
    }

    pub fn set_fallback(&self, fallback: Option<String>) {
        *self.fallback.write() = fallback;
    }

    /// Turn recording of resolved strings on or off.
    pub fn set_editing(&self, editing: bool) {
        self.editing.store(editing, Ordering::Relaxed);
    }

    pub fn is_editing(&self) -> bool {
        self.editing.load(Ordering::Relaxed)
    }

    /// Strings resolved while editing mode was on, by key.
    pub fn edited_strings(&self) -> BTreeMap<String, String> {
        self.edited.lock().clone()
    }

    /// Find the raw line for a key across the locale chain, with the locale
    /// it was found in.
    ///
    /// Malformed keys are looked up like any other and simply miss.
    async fn resolve(
        &self,
        key: &str,
        locale: Option<&str>,
        fallback: bool,
    ) -> TranslationResult<Option<(String, String)>> {
        let parsed = TranslationKey::parse(key);

        let chain = self.locale_chain(locale, fallback);
        for candidate in chain.iter() {
            let lines = self
                .load(parsed.namespace.as_deref(), &parsed.group, candidate)
                .await?;

            if let Some(line) = lines.text(&parsed.item) {
                return Ok(Some((candidate.to_string(), line.to_string())));
            }

            if !parsed.is_namespaced() {
                self.recorder.record(candidate, &parsed.group, key).await?;
            }
        }

        Ok(None)
    }

    fn locale_chain(&self, locale: Option<&str>, fallback: bool) -> LocaleChain {
        let current = self.locale.read();
        let fallback_locale = self.fallback.read();
        LocaleChain::resolve(locale, &current, fallback_locale.as_deref(), fallback)
    }

    fn record_edited(&self, key: &str, line: &str) {
        if self.is_editing() {
            self.edited.lock().insert(key.to_string(), line.to_string());
        }
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("locale", &*self.locale.read())
            .field("fallback", &*self.fallback.read())
            .field("loaded", &self.loaded)
            .field("editing", &self.is_editing())
            .finish()
    }
}
