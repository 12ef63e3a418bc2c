//! Missing-key registration.

use std::sync::Arc;

use tracing::debug;

use crate::error::{TranslationError, TranslationResult};
use crate::loader::DatabaseStore;

/// Registers default-namespace keys that resolved to nothing for a locale,
/// so translators can fill them in later.
///
/// Every miss is forwarded; deduplication is the store's concern.
#[derive(Clone)]
pub struct MissingKeyRecorder {
    database: Arc<dyn DatabaseStore>,
}

impl MissingKeyRecorder {
    pub fn new(database: Arc<dyn DatabaseStore>) -> Self {
        Self { database }
    }

    pub async fn record(&self, locale: &str, group: &str, key: &str) -> TranslationResult<()> {
        debug!(locale = %locale, group = %group, key = %key, "translation missing");

        self.database
            .add_translation(locale, group, key)
            .await
            .map_err(|source| TranslationError::MissingKeyRecorder {
                locale: locale.to_string(),
                key: key.to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for MissingKeyRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissingKeyRecorder").finish()
    }
}
