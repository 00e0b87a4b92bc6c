//! Persistence schema.

/// Idempotent DDL, applied in order by `Database::initialize`.
pub const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tool_history (
        id          BIGSERIAL PRIMARY KEY,
        tool_name   VARCHAR(64) NOT NULL,
        input_data  JSONB       NOT NULL DEFAULT 'null'::jsonb,
        output_data JSONB       NOT NULL DEFAULT 'null'::jsonb,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tool_history_tool_created ON tool_history (tool_name, created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS prompts (
        id         BIGSERIAL PRIMARY KEY,
        title      VARCHAR(255) NOT NULL,
        content    TEXT         NOT NULL,
        tags       TEXT[]       NOT NULL DEFAULT '{}',
        use_count  INTEGER      NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ  NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_prompts_tags ON prompts USING GIN (tags)",
    r#"
    CREATE TABLE IF NOT EXISTS config (
        key        VARCHAR(128) PRIMARY KEY,
        value      JSONB        NOT NULL,
        updated_at TIMESTAMPTZ  NOT NULL DEFAULT NOW()
    )
    "#,
];
