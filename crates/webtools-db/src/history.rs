//! Server-side tool history (`tool_history`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use webtools_common::{NewToolHistory, ToolHistory};

use crate::error::{DbError, Result};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn save(&self, entry: &NewToolHistory) -> Result<ToolHistory>;

    /// Newest first. A non-positive `limit` means [`DEFAULT_HISTORY_LIMIT`].
    async fn list(&self, tool_name: &str, limit: i64) -> Result<Vec<ToolHistory>>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// Remove every entry for `tool_name`; returns the number removed.
    async fn clear(&self, tool_name: &str) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

pub(crate) fn effective_limit(limit: i64, default: i64) -> i64 {
    if limit <= 0 { default } else { limit }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn save(&self, entry: &NewToolHistory) -> Result<ToolHistory> {
        let row = sqlx::query_as::<_, ToolHistoryRow>(
            r#"
            INSERT INTO tool_history (tool_name, input_data, output_data)
            VALUES ($1, $2, $3)
            RETURNING id, tool_name, input_data, output_data, created_at
            "#,
        )
        .bind(&entry.tool_name)
        .bind(&entry.input_data)
        .bind(&entry.output_data)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self, tool_name: &str, limit: i64) -> Result<Vec<ToolHistory>> {
        let rows = sqlx::query_as::<_, ToolHistoryRow>(
            r#"
            SELECT id, tool_name, input_data, output_data, created_at
            FROM tool_history
            WHERE tool_name = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(tool_name)
        .bind(effective_limit(limit, DEFAULT_HISTORY_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ToolHistory::from).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tool_history WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("history entry {id}")));
        }
        Ok(())
    }

    async fn clear(&self, tool_name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tool_history WHERE tool_name = $1")
            .bind(tool_name)
            .execute(&self.pool)
            .await?;
        tracing::debug!(tool_name, removed = result.rows_affected(), "Cleared history");
        Ok(result.rows_affected())
    }
}

// ── Internal sqlx row mapping ────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ToolHistoryRow {
    id: i64,
    tool_name: String,
    input_data: Value,
    output_data: Value,
    created_at: DateTime<Utc>,
}

impl From<ToolHistoryRow> for ToolHistory {
    fn from(r: ToolHistoryRow) -> Self {
        ToolHistory {
            id: r.id,
            tool_name: r.tool_name,
            input_data: r.input_data,
            output_data: r.output_data,
            created_at: r.created_at,
        }
    }
}
