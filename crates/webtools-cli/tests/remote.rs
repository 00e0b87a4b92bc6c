//! Push/pull against an in-process server speaking the `/api/history` shape.

use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use webtools_cli::remote::RemoteHistory;
use webtools_cli::store::HistoryStore;
use webtools_common::{HistoryItem, NewToolHistory, StorageKey, ToolHistory};

type Rows = Arc<Mutex<Vec<ToolHistory>>>;

#[derive(Deserialize)]
struct Params {
    tool_name: String,
    limit: usize,
}

async fn save(State(rows): State<Rows>, Json(body): Json<NewToolHistory>) -> Json<Value> {
    let mut rows = rows.lock().unwrap();
    let entry = ToolHistory {
        id: rows.len() as i64 + 1,
        tool_name: body.tool_name,
        input_data: body.input_data,
        output_data: body.output_data,
        created_at: Utc::now(),
    };
    rows.push(entry.clone());
    Json(json!({"success": true, "entry": entry}))
}

async fn list(State(rows): State<Rows>, Query(p): Query<Params>) -> Json<Value> {
    let rows = rows.lock().unwrap();
    let history: Vec<&ToolHistory> =
        rows.iter().rev().filter(|r| r.tool_name == p.tool_name).take(p.limit).collect();
    Json(json!({"success": true, "history": history}))
}

async fn spawn_server(rows: Rows) -> String {
    let app = Router::new()
        .route("/api/history", get(list).post(save))
        .with_state(rows);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

fn item(ts: i64, input: &str) -> HistoryItem {
    HistoryItem { timestamp: ts, ..HistoryItem::new("decode", input, "out") }
}

#[tokio::test]
async fn test_push_then_pull_into_another_store() {
    let rows: Rows = Arc::default();
    let base = spawn_server(rows.clone()).await;
    let remote = RemoteHistory::new(base);

    let local = [item(300, "newest").with_mode("m"), item(100, "oldest")];
    assert_eq!(remote.push(StorageKey::Jwt, &local).await.unwrap(), 2);
    {
        let rows = rows.lock().unwrap();
        assert_eq!(rows[0].tool_name, "jwt");
        assert_eq!(rows[0].input_data["input"], "oldest");
    }

    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path(), 10);
    let mut log = store.load(StorageKey::Jwt).unwrap();
    log.push(item(300, "already here"));

    let pulled = remote.pull(StorageKey::Jwt, log.capacity()).await.unwrap();
    assert_eq!(pulled.len(), 2);
    assert_eq!(pulled[0].input, "newest");
    assert_eq!(pulled[0].mode.as_deref(), Some("m"));

    let added = log.merge(pulled);
    assert_eq!(added, 1);
    let inputs: Vec<&str> = log.items().iter().map(|i| i.input.as_str()).collect();
    assert_eq!(inputs, vec!["already here", "oldest"]);
}

#[tokio::test]
async fn test_pull_surfaces_server_errors() {
    let app = Router::new().route(
        "/api/history",
        get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, Json(json!({"success": false, "error": "Database unavailable"}))) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let err = RemoteHistory::new(format!("http://{addr}"))
        .pull(StorageKey::Json, 5)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Database unavailable"));
}
