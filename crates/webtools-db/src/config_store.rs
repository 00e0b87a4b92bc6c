//! Key/value settings (`config`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use webtools_common::ConfigEntry;

use crate::error::Result;

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ConfigEntry>>;
    /// Insert or replace.
    async fn set(&self, key: &str, value: &Value) -> Result<ConfigEntry>;
}

#[derive(Clone)]
pub struct PgConfigRepository {
    pool: PgPool,
}

impl PgConfigRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ConfigRepository for PgConfigRepository {
    async fn get(&self, key: &str) -> Result<Option<ConfigEntry>> {
        let row: Option<(String, Value, DateTime<Utc>)> =
            sqlx::query_as("SELECT key, value, updated_at FROM config WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(key, value, updated_at)| ConfigEntry { key, value, updated_at }))
    }

    async fn set(&self, key: &str, value: &Value) -> Result<ConfigEntry> {
        let (key, value, updated_at): (String, Value, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO config (key, value, updated_at) VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(ConfigEntry { key, value, updated_at })
    }
}
