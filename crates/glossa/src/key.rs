//! Translation key parsing.
//!
//! Keys follow the `namespace::group.item` convention. The namespace is
//! optional; keys without one belong to the default, database-backed
//! namespace.

/// Sentinel namespace that means "default" when written explicitly.
pub const DEFAULT_NAMESPACE: &str = "*";

/// Separator between the namespace and the rest of the key.
const NAMESPACE_SEPARATOR: &str = "::";

/// A parsed translation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    /// `None` for the default namespace.
    pub namespace: Option<String>,

    /// Translation group (e.g. "validation", "messages").
    pub group: String,

    /// Leaf item within the group; may be a dotted path into nested lines.
    pub item: String,
}

impl TranslationKey {
    /// Parse a raw key.
    ///
    /// Never fails: missing parts come back as empty strings so the lookup
    /// simply misses and the raw key is shown in the UI.
    pub fn parse(key: &str) -> Self {
        let (namespace, rest) = match key.split_once(NAMESPACE_SEPARATOR) {
            Some((ns, rest)) => (normalize_namespace(ns), rest),
            None => (None, key),
        };

        let (group, item) = rest.split_once('.').unwrap_or((rest, ""));

        Self {
            namespace,
            group: group.to_string(),
            item: item.to_string(),
        }
    }

    /// Whether this key is routed to the file backend.
    pub fn is_namespaced(&self) -> bool {
        is_namespaced(self.namespace.as_deref())
    }
}

/// Whether a namespace refers to a named (file-backed) source.
///
/// `None` and `"*"` are the default namespace.
pub fn is_namespaced(namespace: Option<&str>) -> bool {
    !matches!(namespace, None | Some(DEFAULT_NAMESPACE) | Some(""))
}

fn normalize_namespace(ns: &str) -> Option<String> {
    let ns = ns.trim();
    if is_namespaced(Some(ns)) {
        Some(ns.to_string())
    } else {
        None
    }
}
