use crate::error::Result;
use crate::models::FavoriteRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Durable keyed storage for favorites. One row per favorite, keyed by the
/// catalog id; writes are single statements, so they fully apply or fully
/// fail.
pub struct FavoritesStore {
    pub pool: SqlitePool,
}

impl FavoritesStore {
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self> {
        info!("Opening favorites store: {}", database_url);

        // Extract directory path from database URL
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            let path = std::path::Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Create the schema if absent, so a fresh store lists empty instead of
    /// erroring.
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                poster_url TEXT,
                user_note TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or fully replace the record for `record.id`. Idempotent.
    pub async fn upsert(&self, record: &FavoriteRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO favorites (id, title, description, poster_url, user_note)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.poster_url)
        .bind(&record.user_note)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete the record if present; absent ids are a no-op, not an error.
    pub async fn remove(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM favorites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<FavoriteRecord>> {
        let records = sqlx::query_as::<_, FavoriteRecord>(
            "SELECT id, title, description, poster_url, user_note FROM favorites ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<FavoriteRecord>> {
        let record = sqlx::query_as::<_, FavoriteRecord>(
            "SELECT id, title, description, poster_url, user_note FROM favorites WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
