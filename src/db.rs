use crate::record::{NewTranslation, TranslationRecord};
use crate::store::TranslationStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::info;

#[derive(Debug, FromRow)]
struct TranslationRow {
    name: String,
    source_name: String,
    target_name: String,
    language: String,
    context: Option<String>,
    status: Option<String>,
    contributed_translation_doctype_name: Option<String>,
    modified: DateTime<Utc>,
}

impl From<TranslationRow> for TranslationRecord {
    fn from(row: TranslationRow) -> Self {
        Self {
            name: row.name,
            source_name: row.source_name,
            target_name: row.target_name,
            language: row.language,
            context: row.context,
            status: row.status,
            contributed_translation_doctype_name: row.contributed_translation_doctype_name,
            modified: row.modified,
        }
    }
}

const SELECT_COLUMNS: &str = "name, source_name, target_name, language, context, status, \
     contributed_translation_doctype_name, modified";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create the translations table if needed
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS translations (
                name TEXT PRIMARY KEY DEFAULT ('tr-' || substr(md5(random()::text || clock_timestamp()::text), 1, 10)),
                source_name TEXT NOT NULL,
                target_name TEXT NOT NULL,
                language TEXT NOT NULL,
                context TEXT,
                status TEXT,
                contributed_translation_doctype_name TEXT,
                modified TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create translations table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_translations_source_context
             ON translations (source_name, context)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create translations source index")?;

        info!("Database migrations complete");
        Ok(())
    }
}

#[async_trait]
impl TranslationStore for Database {
    async fn get(&self, name: &str) -> Result<Option<TranslationRecord>> {
        let row: Option<TranslationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM translations WHERE name = $1",
            SELECT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch translation")?;

        Ok(row.map(TranslationRecord::from))
    }

    async fn find_by_source(
        &self,
        source_name: &str,
        context: Option<&str>,
    ) -> Result<Option<String>> {
        // IS NOT DISTINCT FROM so a NULL context matches NULL
        let name: Option<String> = sqlx::query_scalar(
            "SELECT name FROM translations
             WHERE source_name = $1 AND context IS NOT DISTINCT FROM $2
             ORDER BY modified
             LIMIT 1",
        )
        .bind(source_name)
        .bind(context)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up translation by source")?;

        Ok(name)
    }

    async fn insert(&self, new: NewTranslation) -> Result<TranslationRecord> {
        let row: TranslationRow = sqlx::query_as(&format!(
            "INSERT INTO translations (source_name, target_name, language, context)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(&new.source_name)
        .bind(&new.target_name)
        .bind(&new.language)
        .bind(new.context.as_deref().filter(|c| !c.is_empty()))
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert translation")?;

        Ok(row.into())
    }

    async fn update(&self, record: &TranslationRecord) -> Result<Option<TranslationRecord>> {
        let row: Option<TranslationRow> = sqlx::query_as(&format!(
            "UPDATE translations
             SET source_name = $2, target_name = $3, language = $4, context = $5,
                 status = $6, contributed_translation_doctype_name = $7, modified = NOW()
             WHERE name = $1
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(&record.name)
        .bind(&record.source_name)
        .bind(&record.target_name)
        .bind(&record.language)
        .bind(&record.context)
        .bind(&record.status)
        .bind(&record.contributed_translation_doctype_name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update translation")?;

        Ok(row.map(TranslationRecord::from))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM translations WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to delete translation")?;

        Ok(result.rows_affected() > 0)
    }
}
