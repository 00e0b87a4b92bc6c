//! Introspection of user-supplied databases for the AI SQL tool.

use serde::{Deserialize, Serialize};
use webtools_db::inspect::{self, ConnectionSpec, QueryResult, SchemaInfo};

use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Debug, Serialize)]
pub struct Connected {
    pub message: &'static str,
}

/// POST /api/db/connect
pub async fn connect(ApiJson(spec): ApiJson<ConnectionSpec>) -> ApiResult<Connected> {
    inspect::test_connection(&spec).await?;
    tracing::info!(kind = ?spec.kind, host = %spec.host, "Connection test succeeded");
    ok(Connected { message: "Connection successful" })
}

#[derive(Debug, Serialize)]
pub struct DatabaseList {
    pub databases: Vec<String>,
}

/// POST /api/db/databases
pub async fn databases(ApiJson(spec): ApiJson<ConnectionSpec>) -> ApiResult<DatabaseList> {
    let databases = inspect::list_databases(&spec).await?;
    ok(DatabaseList { databases })
}

#[derive(Debug, Serialize)]
pub struct SchemaBody {
    pub schema: SchemaInfo,
}

/// POST /api/db/schema
pub async fn schema(ApiJson(spec): ApiJson<ConnectionSpec>) -> ApiResult<SchemaBody> {
    let schema = inspect::schema(&spec).await?;
    ok(SchemaBody { schema })
}

#[derive(Debug, Deserialize)]
pub struct ExecuteBody {
    #[serde(flatten)]
    pub spec: ConnectionSpec,
    #[serde(default)]
    pub sql: String,
}

/// POST /api/db/execute
pub async fn execute(ApiJson(body): ApiJson<ExecuteBody>) -> ApiResult<QueryResult> {
    if body.sql.trim().is_empty() {
        return Err(ApiError::bad_request("SQL query is required"));
    }
    ok(inspect::execute(&body.spec, &body.sql).await?)
}
