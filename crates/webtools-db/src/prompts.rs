//! Prompt library (`prompts`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use webtools_common::{NewPrompt, Prompt};

use crate::error::{DbError, Result};
use crate::history::effective_limit;

pub const DEFAULT_PROMPT_LIMIT: i64 = 100;

const PROMPT_COLUMNS: &str = "id, title, content, tags, use_count, created_at, updated_at";

/// Filters for [`PromptRepository::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptQuery {
    /// Case-insensitive substring of title or content.
    pub search: Option<String>,
    /// Matches prompts sharing at least one tag.
    pub tags: Vec<String>,
    pub limit: i64,
}

impl PromptQuery {
    /// Parse a comma-separated tag list as sent by the UI (`tags=a,b`).
    pub fn split_tags(raw: Option<&str>) -> Vec<String> {
        raw.map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }
}

#[async_trait]
pub trait PromptRepository: Send + Sync {
    async fn create(&self, prompt: &NewPrompt) -> Result<Prompt>;
    async fn list(&self, query: &PromptQuery) -> Result<Vec<Prompt>>;
    async fn get(&self, id: i64) -> Result<Prompt>;
    async fn update(&self, id: i64, prompt: &NewPrompt) -> Result<Prompt>;
    async fn delete(&self, id: i64) -> Result<()>;
    /// Returns the new use count.
    async fn increment_use(&self, id: i64) -> Result<i32>;
    /// Every distinct tag, sorted.
    async fn tags(&self) -> Result<Vec<String>>;
}

#[derive(Clone)]
pub struct PgPromptRepository {
    pool: PgPool,
}

impl PgPromptRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound(format!("prompt {id}"))
}

#[async_trait]
impl PromptRepository for PgPromptRepository {
    async fn create(&self, prompt: &NewPrompt) -> Result<Prompt> {
        let row = sqlx::query_as::<_, PromptRow>(&format!(
            "INSERT INTO prompts (title, content, tags) VALUES ($1, $2, $3) RETURNING {PROMPT_COLUMNS}"
        ))
        .bind(&prompt.title)
        .bind(&prompt.content)
        .bind(&prompt.tags)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list(&self, query: &PromptQuery) -> Result<Vec<Prompt>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE 1=1"));

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR content ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if !query.tags.is_empty() {
            qb.push(" AND tags && ").push_bind(query.tags.clone());
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(effective_limit(query.limit, DEFAULT_PROMPT_LIMIT));

        let rows = qb.build_query_as::<PromptRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Prompt::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Prompt> {
        sqlx::query_as::<_, PromptRow>(&format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Prompt::from)
            .ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: i64, prompt: &NewPrompt) -> Result<Prompt> {
        sqlx::query_as::<_, PromptRow>(&format!(
            r#"
            UPDATE prompts
            SET title = $1, content = $2, tags = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {PROMPT_COLUMNS}
            "#
        ))
        .bind(&prompt.title)
        .bind(&prompt.content)
        .bind(&prompt.tags)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Prompt::from)
        .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn increment_use(&self, id: i64) -> Result<i32> {
        sqlx::query_scalar("UPDATE prompts SET use_count = use_count + 1 WHERE id = $1 RETURNING use_count")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn tags(&self) -> Result<Vec<String>> {
        let tags = sqlx::query_scalar("SELECT DISTINCT unnest(tags) AS tag FROM prompts ORDER BY tag")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }
}

// ── Internal sqlx row mapping ────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct PromptRow {
    id: i64,
    title: String,
    content: String,
    tags: Vec<String>,
    use_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PromptRow> for Prompt {
    fn from(r: PromptRow) -> Self {
        Prompt {
            id: r.id,
            title: r.title,
            content: r.content,
            tags: r.tags,
            use_count: r.use_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
