//! PostgreSQL translation store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use super::DatabaseStore;
use crate::key::DEFAULT_NAMESPACE;
use crate::lines::LoadedLines;

/// A key registered for translation that has no text yet.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MissingTranslation {
    pub locale: String,
    pub group: String,
    pub item: String,
}

/// Translation store over the `translation` table.
#[derive(Clone)]
pub struct PgTranslationStore {
    pool: PgPool,
}

impl PgTranslationStore {
    /// Create a new translation store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the text of one item.
    pub async fn save(&self, locale: &str, group: &str, item: &str, text: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO translation (locale, "group", namespace, item, text)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (locale, "group", namespace, item) DO UPDATE SET
                text = $5,
                changed = EXTRACT(EPOCH FROM NOW())::BIGINT
            "#,
        )
        .bind(locale)
        .bind(group)
        .bind(DEFAULT_NAMESPACE)
        .bind(item)
        .bind(text)
        .execute(&self.pool)
        .await
        .context("failed to save translation")?;

        Ok(())
    }

    /// List keys registered for a locale that still have no text.
    pub async fn missing(&self, locale: &str) -> Result<Vec<MissingTranslation>> {
        let rows = sqlx::query_as::<_, MissingTranslation>(
            r#"
            SELECT locale, "group", item
            FROM translation
            WHERE locale = $1 AND (text IS NULL OR text = '')
            ORDER BY "group", item
            "#,
        )
        .bind(locale)
        .fetch_all(&self.pool)
        .await
        .context("failed to list missing translations")?;

        Ok(rows)
    }
}

#[async_trait]
impl DatabaseStore for PgTranslationStore {
    async fn load(
        &self,
        locale: &str,
        group: &str,
        namespace: Option<&str>,
    ) -> Result<LoadedLines> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT item, text
            FROM translation
            WHERE locale = $1 AND "group" = $2 AND namespace = $3
              AND text IS NOT NULL AND text <> ''
            ORDER BY item
            "#,
        )
        .bind(locale)
        .bind(group)
        .bind(namespace.unwrap_or(DEFAULT_NAMESPACE))
        .fetch_all(&self.pool)
        .await
        .context("failed to load translations")?;

        debug!(locale = %locale, group = %group, count = rows.len(), "loaded translations from database");
        Ok(LoadedLines::from_pairs(rows))
    }

    async fn add_translation(&self, locale: &str, group: &str, key: &str) -> Result<()> {
        let item = item_from_key(group, key);
        if item.is_empty() {
            debug!(locale = %locale, key = %key, "not registering key without an item");
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO translation (locale, "group", namespace, item, text)
            VALUES ($1, $2, $3, $4, NULL)
            ON CONFLICT (locale, "group", namespace, item) DO NOTHING
            "#,
        )
        .bind(locale)
        .bind(group)
        .bind(DEFAULT_NAMESPACE)
        .bind(item)
        .execute(&self.pool)
        .await
        .context("failed to register missing translation")?;

        if result.rows_affected() > 0 {
            info!(locale = %locale, group = %group, item = %item, "registered missing translation");
        }
        Ok(())
    }
}

/// Strip the group (and any explicit or empty default namespace) from a full key.
fn item_from_key<'a>(group: &str, key: &'a str) -> &'a str {
    let key = key
        .strip_prefix(DEFAULT_NAMESPACE)
        .and_then(|k| k.strip_prefix("::"))
        .or_else(|| key.strip_prefix("::"))
        .unwrap_or(key);

    match key.strip_prefix(group) {
        Some(rest) => rest.strip_prefix('.').unwrap_or(""),
        None => key,
    }
}

impl std::fmt::Debug for PgTranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTranslationStore").finish()
    }
}
