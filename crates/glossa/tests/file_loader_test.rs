//! Integration tests for LocalFileLoader.
//!
//! Tests language directories on disk, alone and behind a Translator.

use std::sync::Arc;

use glossa::{FileLoader, LocalFileLoader, TranslationError, Translator};
use glossa_test_utils::{LangDir, RecordingCache, RecordingDatabase, init_test_tracing, test_config};
use serde_json::json;

/// Nested JSON objects resolve through dotted items.
#[tokio::test]
async fn json_groups_with_nesting() {
    let dir = LangDir::new().with_json(
        "en",
        "validation",
        json!({"required": "Required", "between": {"numeric": "Between {min} and {max}"}}),
    );

    let loader = LocalFileLoader::new(dir.path());
    let lines = loader
        .load("en", "validation", None)
        .await
        .expect("failed to load group");

    assert_eq!(lines.text("required"), Some("Required"));
    assert_eq!(lines.text("between.numeric"), Some("Between {min} and {max}"));
    assert_eq!(lines.text("between"), None);
}

/// YAML files are read when no JSON file exists.
#[tokio::test]
async fn yaml_groups() {
    let dir = LangDir::new().with_yaml("de", "messages", "hi: Hallo\nnav:\n  home: Startseite\n");

    let loader = LocalFileLoader::new(dir.path());
    let lines = loader
        .load("de", "messages", None)
        .await
        .expect("failed to load group");

    assert_eq!(lines.text("hi"), Some("Hallo"));
    assert_eq!(lines.text("nav.home"), Some("Startseite"));
}

/// JSON takes precedence over YAML for the same group.
#[tokio::test]
async fn json_wins_over_yaml() {
    let dir = LangDir::new()
        .with_json("en", "messages", json!({"hi": "from json"}))
        .with_yaml("en", "messages", "hi: from yaml\n");

    let loader = LocalFileLoader::new(dir.path());
    let lines = loader.load("en", "messages", None).await.expect("failed to load group");
    assert_eq!(lines.text("hi"), Some("from json"));
}

/// Registered namespaces read from their hint directory, with vendor overrides on top.
#[tokio::test]
async fn namespace_hints_and_vendor_overrides() {
    let dir = LangDir::new()
        .with_file(
            "packages/billing/en/invoices.json",
            r#"{"title": "Invoices", "due": "Due"}"#,
        )
        .with_vendor("billing", "en", "invoices", json!({"title": "Bills"}));

    let loader = LocalFileLoader::new(dir.path());
    loader.add_namespace("billing", dir.join("packages/billing"));
    assert!(loader.namespaces().contains_key("billing"));

    let lines = loader
        .load("en", "invoices", Some("billing"))
        .await
        .expect("failed to load group");
    assert_eq!(lines.text("title"), Some("Bills"));
    assert_eq!(lines.text("due"), Some("Due"));

    let unknown = loader
        .load("en", "invoices", Some("shipping"))
        .await
        .expect("unregistered namespace should be empty");
    assert!(unknown.is_empty());
}

/// Malformed files are errors, not empty groups.
#[tokio::test]
async fn malformed_file_is_an_error() {
    let dir = LangDir::new().with_file("en/messages.json", "{ not json");

    let loader = LocalFileLoader::new(dir.path());
    let err = loader
        .load("en", "messages", None)
        .await
        .expect_err("expected malformed file error");
    assert!(format!("{err:#}").contains("malformed translation file"));
}

/// Path traversal in locale or group never leaves the language directory.
#[tokio::test]
async fn traversal_is_refused() {
    let dir = LangDir::new().with_file("secret.json", r#"{"key": "value"}"#);
    let loader = LocalFileLoader::new(dir.join("lang"));

    assert!(loader.load("..", "secret", None).await.expect("load failed").is_empty());
    assert!(loader.load("en", "../secret", None).await.expect("load failed").is_empty());
}

/// A translator over real files: namespaced keys and database fallback.
#[tokio::test]
async fn translator_over_language_directory() {
    init_test_tracing();
    let dir = LangDir::new()
        .with_json("en", "messages", json!({"welcome": "Welcome, {name}"}))
        .with_file("packages/billing/fr/invoices.json", r#"{"title": "Factures"}"#);

    let files = Arc::new(LocalFileLoader::new(dir.path()));
    files.add_namespace("billing", dir.join("packages/billing"));
    let database = Arc::new(RecordingDatabase::new());

    let translator = Translator::from_config(
        files,
        database.clone(),
        Arc::new(RecordingCache::new()),
        test_config().with_locale("fr").with_fallback("en").with_file_fallback().build(),
    );

    let line = translator
        .get("messages.welcome", &[("name", "Ada")], None, true)
        .await
        .expect("lookup failed");
    assert_eq!(line, "Welcome, Ada");

    let line = translator
        .get("billing::invoices.title", &[], None, true)
        .await
        .expect("lookup failed");
    assert_eq!(line, "Factures");

    // fr missed in both database and files before en matched.
    assert_eq!(database.missing().len(), 1);
}

/// A malformed fallback file fails the lookup.
#[tokio::test]
async fn translator_surfaces_malformed_files() {
    let dir = LangDir::new().with_file("en/messages.yaml", "hi: [unclosed\n");

    let translator = Translator::from_config(
        Arc::new(LocalFileLoader::new(dir.path())),
        Arc::new(RecordingDatabase::new()),
        Arc::new(RecordingCache::new()),
        test_config().with_file_fallback().build(),
    );

    let err = translator
        .get("messages.hi", &[], None, true)
        .await
        .expect_err("expected file loader error");
    assert!(matches!(err, TranslationError::FileLoader { .. }), "got {err:?}");
}
