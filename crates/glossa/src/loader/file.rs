//! Language files on the local filesystem.
//!
//! Layout:
//!
//! ```text
//! {lang_path}/{locale}/{group}.json                       default namespace
//! {hint}/{locale}/{group}.json                            registered namespace
//! {lang_path}/vendor/{namespace}/{locale}/{group}.json    namespace overrides
//! ```
//!
//! `.yaml` and `.yml` files are read when no `.json` file exists.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs;
use tracing::{debug, warn};

use super::FileLoader;
use crate::key::is_namespaced;
use crate::lines::LoadedLines;

/// Extensions tried in order; the first existing file wins.
const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Reads translation groups from a language directory.
pub struct LocalFileLoader {
    /// Root language directory.
    path: PathBuf,

    /// Namespace → directory holding that namespace's locales.
    hints: RwLock<HashMap<String, PathBuf>>,
}

impl LocalFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hints: RwLock::new(HashMap::new()),
        }
    }

    /// Register the directory of a namespace.
    pub fn add_namespace(&self, namespace: impl Into<String>, hint: impl Into<PathBuf>) {
        self.hints.write().insert(namespace.into(), hint.into());
    }

    /// Registered namespaces and their directories.
    pub fn namespaces(&self) -> HashMap<String, PathBuf> {
        self.hints.read().clone()
    }

    async fn load_namespaced(
        &self,
        locale: &str,
        group: &str,
        namespace: &str,
    ) -> Result<LoadedLines> {
        let hint = self.hints.read().get(namespace).cloned();
        let Some(hint) = hint else {
            debug!(namespace = %namespace, "no directory registered for namespace");
            return Ok(LoadedLines::new());
        };

        let mut lines = load_group(&hint, locale, group).await?;

        if is_safe_segment(namespace) {
            let vendor = self.path.join("vendor").join(namespace);
            let overrides = load_group(&vendor, locale, group).await?;
            lines.merge(overrides);
        }

        Ok(lines)
    }
}

#[async_trait]
impl FileLoader for LocalFileLoader {
    async fn load(
        &self,
        locale: &str,
        group: &str,
        namespace: Option<&str>,
    ) -> Result<LoadedLines> {
        match namespace {
            Some(ns) if is_namespaced(Some(ns)) => self.load_namespaced(locale, group, ns).await,
            _ => load_group(&self.path, locale, group).await,
        }
    }
}

/// Load `{base}/{locale}/{group}.{ext}`.
///
/// A missing file yields empty lines. An unreadable or malformed file is
/// an error.
async fn load_group(base: &Path, locale: &str, group: &str) -> Result<LoadedLines> {
    if !is_safe_segment(locale) || !is_safe_segment(group) {
        warn!(locale = %locale, group = %group, "refusing to load translation file outside language directory");
        return Ok(LoadedLines::new());
    }

    let dir = base.join(locale);
    for ext in EXTENSIONS {
        let path = dir.join(format!("{group}.{ext}"));
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read translation file {}", path.display()));
            }
        };

        let document: serde_json::Value = if *ext == "json" {
            serde_json::from_str(&content)
                .with_context(|| format!("malformed translation file {}", path.display()))?
        } else {
            serde_yml::from_str(&content)
                .with_context(|| format!("malformed translation file {}", path.display()))?
        };

        let lines = LoadedLines::from_json(document);
        debug!(path = ?path, lines = lines.len(), "translation file loaded");
        return Ok(lines);
    }

    Ok(LoadedLines::new())
}

/// A single path component with no separators or parent references.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

impl std::fmt::Debug for LocalFileLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFileLoader")
            .field("path", &self.path)
            .field("namespaces", &self.hints.read().len())
            .finish()
    }
}
