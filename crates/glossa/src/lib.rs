//! Glossa translation library
//!
//! Database-backed translation lookup with a long-lived cache and legacy
//! language-file fallback. The entry point is [`Translator`]; storage is
//! reached through the [`FileLoader`], [`DatabaseStore`] and [`CacheStore`]
//! traits, with local-file, PostgreSQL, Moka and Redis adapters included.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod key;
pub mod lines;
pub mod load_table;
pub mod loader;
pub mod locale;
pub mod missing;
pub mod plural;
pub mod translator;

pub use cache::{CacheStore, MemoryCache, TieredCache};
pub use config::{ConfigProvider, TranslatorConfig};
pub use error::{TranslationError, TranslationResult};
pub use key::TranslationKey;
pub use lines::{Line, LoadedLines, Replacements};
pub use load_table::{LoadKey, LoadTable};
pub use loader::{BackendLoader, DatabaseStore, FileLoader, LocalFileLoader, PgTranslationStore};
pub use locale::LocaleChain;
pub use missing::MissingKeyRecorder;
pub use plural::{MessageSelector, PluralRule};
pub use translator::Translator;
