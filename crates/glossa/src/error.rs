//! Translator error types.
//!
//! Missing data is never an error: absent lines resolve to the raw key.
//! These variants cover collaborators that could not be reached or read.

use thiserror::Error;

/// Errors surfaced by the translator.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("file loader failed for {locale}/{group}")]
    FileLoader {
        locale: String,
        group: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("translation database failed for {locale}/{group}")]
    Database {
        locale: String,
        group: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("translation cache failed for {locale}/{group}")]
    Cache {
        locale: String,
        group: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to record missing key {key} for {locale}")]
    MissingKeyRecorder {
        locale: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl TranslationError {
    pub(crate) fn file_loader(locale: &str, group: &str, source: anyhow::Error) -> Self {
        Self::FileLoader {
            locale: locale.to_string(),
            group: group.to_string(),
            source,
        }
    }

    pub(crate) fn database(locale: &str, group: &str, source: anyhow::Error) -> Self {
        Self::Database {
            locale: locale.to_string(),
            group: group.to_string(),
            source,
        }
    }

    pub(crate) fn cache(locale: &str, group: &str, source: anyhow::Error) -> Self {
        Self::Cache {
            locale: locale.to_string(),
            group: group.to_string(),
            source,
        }
    }
}

/// Result type alias using TranslationError.
pub type TranslationResult<T> = Result<T, TranslationError>;
