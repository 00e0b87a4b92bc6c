//! Route table and middleware for the JSON API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{config, db, health, history, ollama, prompts, tools};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(12 * 60 * 60));

    Router::new()
        .route("/api/health", get(health::health))

        // Ollama
        .route("/api/ollama/models",    get(ollama::list_models))
        .route("/api/ollama/generate",  post(ollama::generate_sql))
        .route("/api/ollama/chat",      post(ollama::chat))
        .route("/api/ollama/translate", post(ollama::translate))

        // Database introspection
        .route("/api/db/connect",   post(db::connect))
        .route("/api/db/databases", post(db::databases))
        .route("/api/db/schema",    post(db::schema))
        .route("/api/db/execute",   post(db::execute))

        // History
        .route("/api/history",      post(history::save).get(history::list).delete(history::clear))
        .route("/api/history/{id}", delete(history::delete))

        // Prompts
        .route("/api/prompts",          post(prompts::create).get(prompts::list))
        .route("/api/prompts/tags",     get(prompts::tags))
        .route("/api/prompts/{id}",     get(prompts::get).put(prompts::update).delete(prompts::delete))
        .route("/api/prompts/{id}/use", post(prompts::increment_use))

        // Settings
        .route("/api/config/{key}", get(config::get).put(config::set))

        // Tools
        .route("/api/tools/json",                    post(tools::json_tool))
        .route("/api/tools/jsonfix",                 post(tools::jsonfix))
        .route("/api/tools/jsonfix/ai",              post(tools::jsonfix_ai))
        .route("/api/tools/jwt/decode",              post(tools::jwt_decode))
        .route("/api/tools/jwt/encode",              post(tools::jwt_encode))
        .route("/api/tools/jwt/verify",              post(tools::jwt_verify))
        .route("/api/tools/timestamp/to-date",       post(tools::timestamp_to_date))
        .route("/api/tools/timestamp/to-timestamp",  post(tools::date_to_timestamp))
        .route("/api/tools/image/key-to-urls",       post(tools::image_key_to_urls))
        .route("/api/tools/image/url-to-key",        post(tools::image_url_to_key))
        .route("/api/tools/diff",                    post(tools::json_diff))

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
