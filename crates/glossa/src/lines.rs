//! Loaded translation lines and placeholder replacement.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// `{name}` placeholder tokens.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex literal"));

/// Placeholder name → value pairs applied to a resolved line.
pub type Replacements<'a> = [(&'a str, &'a str)];

/// A single translation entry: either text or a nested group of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Line {
    Text(String),
    Group(BTreeMap<String, Line>),
}

impl Line {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Line::Text(text) => Some(text),
            Line::Group(_) => None,
        }
    }
}

/// All lines for one (namespace, group, locale).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadedLines(BTreeMap<String, Line>);

impl LoadedLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Build from flat `item → text` pairs; dotted items become nested groups.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut lines = Self::new();
        for (item, text) in pairs {
            lines.insert(item.as_ref(), text);
        }
        lines
    }

    /// Convert an arbitrary JSON document into lines.
    ///
    /// Scalars are stringified, nulls and arrays are skipped. A non-object
    /// document yields no lines.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self(json_object_to_group(map)),
            _ => Self::new(),
        }
    }

    /// Insert a text line, creating nested groups for dotted items.
    ///
    /// An existing text line on the path is replaced by a group.
    pub fn insert(&mut self, item: &str, text: impl Into<String>) {
        let mut segments = item.split('.').peekable();
        let mut current = &mut self.0;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), Line::Text(text.into()));
                return;
            }

            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Line::Group(BTreeMap::new()));
            if let Line::Text(_) = entry {
                *entry = Line::Group(BTreeMap::new());
            }
            current = match entry {
                Line::Group(group) => group,
                Line::Text(_) => return,
            };
        }
    }

    /// Look up an item, walking nested groups for dotted paths.
    ///
    /// An exact flat match takes precedence over the nested walk.
    pub fn get(&self, item: &str) -> Option<&Line> {
        if item.is_empty() {
            return None;
        }
        if let Some(line) = self.0.get(item) {
            return Some(line);
        }

        let mut segments = item.split('.');
        let first = segments.next()?;
        let mut line = self.0.get(first)?;
        for segment in segments {
            line = match line {
                Line::Group(group) => group.get(segment)?,
                Line::Text(_) => return None,
            };
        }
        Some(line)
    }

    /// Text for an item; groups are not text.
    pub fn text(&self, item: &str) -> Option<&str> {
        self.get(item).and_then(Line::as_text)
    }

    /// Overlay `other` onto these lines, merging nested groups.
    pub fn merge(&mut self, other: LoadedLines) {
        merge_groups(&mut self.0, other.0);
    }
}

fn json_object_to_group(map: serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, Line> {
    let mut group = BTreeMap::new();
    for (key, value) in map {
        let line = match value {
            serde_json::Value::String(s) => Line::Text(s),
            serde_json::Value::Number(n) => Line::Text(n.to_string()),
            serde_json::Value::Bool(b) => Line::Text(b.to_string()),
            serde_json::Value::Object(inner) => Line::Group(json_object_to_group(inner)),
            serde_json::Value::Null | serde_json::Value::Array(_) => continue,
        };
        group.insert(key, line);
    }
    group
}

fn merge_groups(base: &mut BTreeMap<String, Line>, overlay: BTreeMap<String, Line>) {
    for (key, line) in overlay {
        match (base.get_mut(&key), line) {
            (Some(Line::Group(existing)), Line::Group(incoming)) => {
                merge_groups(existing, incoming);
            }
            (_, line) => {
                base.insert(key, line);
            }
        }
    }
}

/// Substitute `{name}` placeholders in a line.
///
/// `{Name}` capitalizes the value and `{NAME}` upper-cases it. Tokens with
/// no matching replacement are left verbatim.
pub fn make_replacements(line: &str, replacements: &Replacements<'_>) -> String {
    if replacements.is_empty() || !line.contains('{') {
        return line.to_string();
    }

    PLACEHOLDER
        .replace_all(line, |caps: &Captures<'_>| {
            let token = &caps[1];
            replacement_for(token, replacements).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn replacement_for(token: &str, replacements: &Replacements<'_>) -> Option<String> {
    if let Some((_, value)) = replacements.iter().find(|(name, _)| *name == token) {
        return Some((*value).to_string());
    }

    replacements.iter().find_map(|(name, value)| {
        if token == name.to_uppercase() && token.chars().any(char::is_alphabetic) {
            Some(value.to_uppercase())
        } else if token == capitalize(name) {
            Some(capitalize(value))
        } else {
            None
        }
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn dotted_items_nest() {
        let lines = LoadedLines::from_pairs([
            ("welcome", "Welcome"),
            ("between.numeric", "Between {min} and {max}"),
            ("between.string", "Between {min} and {max} characters"),
        ]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines.text("welcome"), Some("Welcome"));
        assert_eq!(lines.text("between.numeric"), Some("Between {min} and {max}"));
        assert!(matches!(lines.get("between"), Some(Line::Group(_))));
        assert_eq!(lines.text("between"), None);
        assert_eq!(lines.text("between.numeric.deeper"), None);
    }

    #[test]
    fn empty_item_misses() {
        let lines = LoadedLines::from_pairs([("a", "A")]);
        assert_eq!(lines.get(""), None);
    }

    #[test]
    fn from_json_is_lenient() {
        let lines = LoadedLines::from_json(serde_json::json!({
            "title": "Invoices",
            "count": 3,
            "flag": true,
            "skip": null,
            "list": ["a"],
            "nested": { "deep": "Deep" }
        }));

        assert_eq!(lines.text("title"), Some("Invoices"));
        assert_eq!(lines.text("count"), Some("3"));
        assert_eq!(lines.text("flag"), Some("true"));
        assert_eq!(lines.get("skip"), None);
        assert_eq!(lines.get("list"), None);
        assert_eq!(lines.text("nested.deep"), Some("Deep"));

        assert!(LoadedLines::from_json(serde_json::json!("scalar")).is_empty());
    }

    #[test]
    fn merge_overlays_nested() {
        let mut base = LoadedLines::from_pairs([("a.x", "ax"), ("a.y", "ay"), ("b", "b")]);
        base.merge(LoadedLines::from_pairs([("a.y", "AY"), ("c", "c")]));

        assert_eq!(base.text("a.x"), Some("ax"));
        assert_eq!(base.text("a.y"), Some("AY"));
        assert_eq!(base.text("b"), Some("b"));
        assert_eq!(base.text("c"), Some("c"));
    }

    #[test]
    fn serde_shape_is_plain_map() {
        let lines = LoadedLines::from_pairs([("a.b", "ab"), ("c", "c")]);
        let json = serde_json::to_string(&lines).unwrap();
        assert_eq!(json, r#"{"a":{"b":"ab"},"c":"c"}"#);

        let back: LoadedLines = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lines);
    }

    #[test]
    fn replaces_placeholders() {
        assert_eq!(
            make_replacements("Hello, {name}!", &[("name", "Ada")]),
            "Hello, Ada!"
        );
    }

    #[test]
    fn unmatched_placeholders_left_verbatim() {
        assert_eq!(
            make_replacements("{greeting}, {name}!", &[("name", "Ada")]),
            "{greeting}, Ada!"
        );
        assert_eq!(make_replacements("{name}", &[]), "{name}");
    }

    #[test]
    fn case_variants() {
        let r = [("name", "ada lovelace")];
        assert_eq!(make_replacements("{Name}", &r), "Ada lovelace");
        assert_eq!(make_replacements("{NAME}", &r), "ADA LOVELACE");
    }
}
