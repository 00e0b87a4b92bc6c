//! Read-only introspection of a user-supplied MySQL or PostgreSQL server.
//!
//! Every call opens one connection and closes it before returning; nothing
//! is pooled because the target changes from request to request.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow, PgSslMode};
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use uuid::Uuid;
use webtools_tools::sql::ensure_read_only;

use crate::error::{DbError, Result};

const NULL_TEXT: &str = "NULL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    #[default]
    Mysql,
    #[serde(alias = "postgresql")]
    Postgres,
}

impl DbKind {
    pub fn default_port(&self) -> u16 {
        match self {
            DbKind::Mysql => 3306,
            DbKind::Postgres => 5432,
        }
    }
}

/// Connection parameters as posted by the SQL tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    #[serde(rename = "type", default)]
    pub kind: DbKind,
    #[serde(default)]
    pub host: String,
    /// Missing or 0 selects the default port for `kind`.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub ssl: bool,
}

impl ConnectionSpec {
    pub fn port(&self) -> u16 {
        self.port.filter(|p| *p != 0).unwrap_or_else(|| self.kind.default_port())
    }

    pub fn validate(&self, require_database: bool) -> Result<()> {
        let missing = self.host.trim().is_empty() || self.user.trim().is_empty();
        if require_database && (missing || self.database.trim().is_empty()) {
            return Err(DbError::InvalidConnection(
                "Host, user, and database are required".to_string(),
            ));
        }
        if missing {
            return Err(DbError::InvalidConnection("Host and user are required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(rename = "isPrimaryKey")]
    pub is_primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    pub tables: Vec<TableInfo>,
    /// Plain-text rendering fed to the SQL generation prompt.
    pub formatted: String,
}

impl SchemaInfo {
    pub fn from_columns(rows: impl IntoIterator<Item = (String, ColumnInfo)>) -> Self {
        let tables = group_columns(rows);
        let formatted = format_schema(&tables);
        Self { tables, formatted }
    }
}

/// Tab-separated query output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub header: String,
    pub rows: Vec<String>,
    pub row_count: usize,
    pub has_tabs: bool,
}

impl QueryResult {
    pub fn from_cells(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows: Vec<String> = rows.into_iter().map(|cells| cells.join("\t")).collect();
        Self {
            header: header.join("\t"),
            row_count: rows.len(),
            rows,
            has_tabs: true,
        }
    }
}

/// Group `(table, column)` pairs by table, keeping first-seen table order.
pub fn group_columns(rows: impl IntoIterator<Item = (String, ColumnInfo)>) -> Vec<TableInfo> {
    let mut tables: Vec<TableInfo> = Vec::new();
    for (table, column) in rows {
        match tables.iter_mut().find(|t| t.name == table) {
            Some(existing) => existing.columns.push(column),
            None => tables.push(TableInfo { name: table, columns: vec![column] }),
        }
    }
    tables
}

pub fn format_schema(tables: &[TableInfo]) -> String {
    let mut out = String::from("Database Schema:\n\n");
    for table in tables {
        out.push_str(&format!("Table: {}\n  Columns:\n", table.name));
        for col in &table.columns {
            let pk = if col.is_primary_key { " (PRIMARY KEY)" } else { "" };
            out.push_str(&format!("    - {} {}{}\n", col.name, col.data_type, pk));
        }
        out.push('\n');
    }
    out
}

// ── Connections ──────────────────────────────────────────────────────────────

enum Conn {
    Postgres(PgConnection),
    Mysql(MySqlConnection),
}

impl Conn {
    async fn open(spec: &ConnectionSpec) -> Result<Self> {
        tracing::debug!(kind = ?spec.kind, host = %spec.host, port = spec.port(), "Opening introspection connection");
        match spec.kind {
            DbKind::Postgres => {
                let database = if spec.database.trim().is_empty() { "postgres" } else { spec.database.as_str() };
                let options = PgConnectOptions::new()
                    .host(&spec.host)
                    .port(spec.port())
                    .username(&spec.user)
                    .password(&spec.password)
                    .database(database)
                    .ssl_mode(if spec.ssl { PgSslMode::Require } else { PgSslMode::Disable })
                    .options([("default_transaction_read_only", "on")]);
                Ok(Conn::Postgres(PgConnection::connect_with(&options).await?))
            }
            DbKind::Mysql => {
                let mut options = MySqlConnectOptions::new()
                    .host(&spec.host)
                    .port(spec.port())
                    .username(&spec.user)
                    .password(&spec.password)
                    .ssl_mode(if spec.ssl { MySqlSslMode::Required } else { MySqlSslMode::Disabled });
                if !spec.database.trim().is_empty() {
                    options = options.database(&spec.database);
                }
                let mut conn = MySqlConnection::connect_with(&options).await?;
                sqlx::query("SET SESSION TRANSACTION READ ONLY").execute(&mut conn).await?;
                Ok(Conn::Mysql(conn))
            }
        }
    }

    async fn close(self) {
        let closed = match self {
            Conn::Postgres(c) => c.close().await,
            Conn::Mysql(c) => c.close().await,
        };
        if let Err(e) = closed {
            tracing::debug!(error = %e, "Closing introspection connection failed");
        }
    }
}

/// Connect and ping.
pub async fn test_connection(spec: &ConnectionSpec) -> Result<()> {
    spec.validate(false)?;
    let mut conn = Conn::open(spec).await?;
    let pinged = match &mut conn {
        Conn::Postgres(c) => c.ping().await,
        Conn::Mysql(c) => c.ping().await,
    };
    conn.close().await;
    Ok(pinged?)
}

pub async fn list_databases(spec: &ConnectionSpec) -> Result<Vec<String>> {
    spec.validate(false)?;
    let mut conn = Conn::open(spec).await?;
    let result = match &mut conn {
        Conn::Postgres(c) => sqlx::query_scalar::<_, String>(
            "SELECT datname::text FROM pg_database \
             WHERE datname NOT IN ('postgres', 'template0', 'template1') \
             ORDER BY datname",
        )
        .fetch_all(&mut *c)
        .await
        .map_err(DbError::from),
        Conn::Mysql(c) => sqlx::query("SHOW DATABASES")
            .fetch_all(&mut *c)
            .await
            .map(|rows| rows.iter().map(|r| mysql_cell(r, 0)).collect())
            .map_err(DbError::from),
    };
    conn.close().await;
    result
}

const PG_SCHEMA_QUERY: &str = r#"
    SELECT c.table_name::text  AS table_name,
           c.column_name::text AS column_name,
           c.data_type::text   AS data_type,
           (c.is_nullable = 'YES') AS nullable,
           COALESCE(pk.is_primary_key, false) AS is_primary_key
    FROM information_schema.columns c
    JOIN information_schema.tables t
      ON c.table_schema = t.table_schema AND c.table_name = t.table_name
    LEFT JOIN (
        SELECT a.attname::text AS column_name, cl.relname::text AS table_name, true AS is_primary_key
        FROM pg_index i
        JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
        JOIN pg_class cl ON cl.oid = i.indrelid
        JOIN pg_namespace n ON n.oid = cl.relnamespace
        WHERE i.indisprimary AND n.nspname = 'public'
    ) pk ON pk.column_name = c.column_name::text AND pk.table_name = c.table_name::text
    WHERE c.table_schema = 'public'
    ORDER BY c.table_name, c.ordinal_position
"#;

const MYSQL_SCHEMA_QUERY: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR), CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR),
           CAST(IS_NULLABLE AS CHAR), CAST(COLUMN_KEY AS CHAR)
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME, ORDINAL_POSITION
"#;

pub async fn schema(spec: &ConnectionSpec) -> Result<SchemaInfo> {
    spec.validate(true)?;
    let mut conn = Conn::open(spec).await?;
    let columns: Result<Vec<(String, ColumnInfo)>> = match &mut conn {
        Conn::Postgres(c) => sqlx::query_as::<_, (String, String, String, bool, bool)>(PG_SCHEMA_QUERY)
            .fetch_all(&mut *c)
            .await
            .map(|rows| {
                rows.into_iter()
                    .map(|(table, name, data_type, nullable, is_primary_key)| {
                        (table, ColumnInfo { name, data_type, nullable, is_primary_key })
                    })
                    .collect()
            })
            .map_err(DbError::from),
        Conn::Mysql(c) => sqlx::query_as::<_, (String, String, String, String, String)>(MYSQL_SCHEMA_QUERY)
            .bind(&spec.database)
            .fetch_all(&mut *c)
            .await
            .map(|rows| {
                rows.into_iter()
                    .map(|(table, name, data_type, nullable, key)| {
                        let column = ColumnInfo {
                            name,
                            data_type,
                            nullable: nullable == "YES",
                            is_primary_key: key == "PRI",
                        };
                        (table, column)
                    })
                    .collect()
            })
            .map_err(DbError::from),
    };
    conn.close().await;
    Ok(SchemaInfo::from_columns(columns?))
}

/// Run one read-only statement and render every cell as text.
pub async fn execute(spec: &ConnectionSpec, sql: &str) -> Result<QueryResult> {
    spec.validate(true)?;
    let statement = ensure_read_only(sql)?;
    let mut conn = Conn::open(spec).await?;
    let result = match &mut conn {
        Conn::Postgres(c) => pg_execute(c, statement).await,
        Conn::Mysql(c) => mysql_execute(c, statement).await,
    };
    conn.close().await;
    if let Ok(r) = &result {
        tracing::debug!(rows = r.row_count, "Executed introspection query");
    }
    result
}

async fn pg_execute(conn: &mut PgConnection, sql: &str) -> Result<QueryResult> {
    let prepared = Executor::prepare(&mut *conn, sql).await?;
    let header = prepared.columns().iter().map(|c| c.name().to_string()).collect();
    let rows = prepared.query().fetch_all(&mut *conn).await?;
    let cells = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| pg_cell(row, i)).collect())
        .collect();
    Ok(QueryResult::from_cells(header, cells))
}

async fn mysql_execute(conn: &mut MySqlConnection, sql: &str) -> Result<QueryResult> {
    let prepared = Executor::prepare(&mut *conn, sql).await?;
    let header = prepared.columns().iter().map(|c| c.name().to_string()).collect();
    let rows = prepared.query().fetch_all(&mut *conn).await?;
    let cells = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| mysql_cell(row, i)).collect())
        .collect();
    Ok(QueryResult::from_cells(header, cells))
}

// ── Cell rendering ───────────────────────────────────────────────────────────

/// Return the first type in the list that decodes, rendered with `Display`.
macro_rules! render_first {
    ($row:expr, $idx:expr; $($ty:ty),+ $(,)?) => {
        $(
            if let Ok(v) = $row.try_get::<$ty, _>($idx) {
                return v.to_string();
            }
        )+
    };
}

fn pg_cell(row: &PgRow, idx: usize) -> String {
    match row.try_get_raw(idx) {
        Ok(raw) if !raw.is_null() => {}
        _ => return NULL_TEXT.to_string(),
    }
    render_first!(row, idx;
        String, i64, i32, i16, f64, f32, bool, Decimal, Uuid,
        DateTime<Utc>, NaiveDateTime, NaiveDate, NaiveTime, Value,
    );
    if let Ok(bytes) = row.try_get::<Vec<u8>, _>(idx) {
        return String::from_utf8_lossy(&bytes).into_owned();
    }
    format!("<{}>", row.column(idx).type_info().name())
}

fn mysql_cell(row: &MySqlRow, idx: usize) -> String {
    match row.try_get_raw(idx) {
        Ok(raw) if !raw.is_null() => {}
        _ => return NULL_TEXT.to_string(),
    }
    render_first!(row, idx;
        String, i64, u64, f64, f32, bool, Decimal,
        DateTime<Utc>, NaiveDateTime, NaiveDate, NaiveTime, Value,
    );
    if let Ok(bytes) = row.try_get::<Vec<u8>, _>(idx) {
        return String::from_utf8_lossy(&bytes).into_owned();
    }
    format!("<{}>", row.column(idx).type_info().name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn col(name: &str, ty: &str, pk: bool) -> ColumnInfo {
        ColumnInfo { name: name.into(), data_type: ty.into(), nullable: !pk, is_primary_key: pk }
    }

    #[test]
    fn test_spec_defaults_from_json() {
        let spec: ConnectionSpec = serde_json::from_value(serde_json::json!({
            "host": "db", "user": "root"
        }))
        .unwrap();
        assert_eq!(spec.kind, DbKind::Mysql);
        assert_eq!(spec.port(), 3306);

        let spec: ConnectionSpec = serde_json::from_value(serde_json::json!({
            "type": "postgres", "host": "db", "user": "pg", "port": 0, "database": "app"
        }))
        .unwrap();
        assert_eq!(spec.kind, DbKind::Postgres);
        assert_eq!(spec.port(), 5432);
    }

    #[test]
    fn test_validate() {
        let mut spec = ConnectionSpec { host: "db".into(), user: "u".into(), ..Default::default() };
        assert!(spec.validate(false).is_ok());
        let err = spec.validate(true).unwrap_err();
        assert_eq!(err.to_string(), "Host, user, and database are required");
        spec.user.clear();
        assert_eq!(spec.validate(false).unwrap_err().to_string(), "Host and user are required");
    }

    #[test]
    fn test_schema_grouping_and_formatting() {
        let info = SchemaInfo::from_columns(vec![
            ("users".to_string(), col("id", "integer", true)),
            ("users".to_string(), col("email", "text", false)),
            ("orders".to_string(), col("id", "bigint", true)),
        ]);
        assert_eq!(info.tables.len(), 2);
        assert_eq!(info.tables[0].columns.len(), 2);
        assert_eq!(
            info.formatted,
            "Database Schema:\n\n\
             Table: users\n  Columns:\n    - id integer (PRIMARY KEY)\n    - email text\n\n\
             Table: orders\n  Columns:\n    - id bigint (PRIMARY KEY)\n\n"
        );
        let json = serde_json::to_value(&info.tables[0].columns[0]).unwrap();
        assert_eq!(json, serde_json::json!({"name": "id", "type": "integer", "nullable": false, "isPrimaryKey": true}));
    }

    #[test]
    fn test_query_result_shape() {
        let result = QueryResult::from_cells(
            vec!["id".into(), "name".into()],
            vec![vec!["1".into(), "Ann".into()], vec!["2".into(), "NULL".into()]],
        );
        assert_eq!(result.header, "id\tname");
        assert_eq!(result.rows, vec!["1\tAnn", "2\tNULL"]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rowCount"], 2);
        assert_eq!(json["hasTabs"], true);
    }

    #[test]
    fn test_execute_rejects_before_connecting() {
        let spec = ConnectionSpec {
            host: "127.0.0.1".into(),
            port: Some(1),
            user: "u".into(),
            database: "d".into(),
            ..Default::default()
        };
        let err = tokio_test::block_on(execute(&spec, "DELETE FROM users")).unwrap_err();
        assert!(matches!(err, DbError::Rejected(_)));
        assert!(err.is_client_error());
    }
}
