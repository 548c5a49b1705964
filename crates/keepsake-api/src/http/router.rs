//! Axum router configuration with middleware.
//!
//! All JSON routes are under `/api/`. Middleware: permissive CORS, tracing.
//! Uploaded blobs are served from `/uploads/`. If `KEEPSAKE_WEB_DIR` points
//! at an existing directory, the frontend is served from it, with API routes
//! taking priority and unknown paths falling through to its `index.html`.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use keepsake_infra::storage::uploads::uploads_dir;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat
        .route("/chat", post(handlers::chat::chat))
        .route("/save-chat", post(handlers::chat::save_chat))
        // Memory document
        .route(
            "/memories",
            get(handlers::memory::get_memories).post(handlers::memory::replace_memories),
        )
        .route(
            "/memories/merge",
            post(handlers::memory::merge_extracted),
        )
        .route(
            "/save-memory-from-chat",
            post(handlers::memory::save_memory_from_chat),
        )
        // Personal records
        .route(
            "/profile",
            get(handlers::profile::get_profile).post(handlers::profile::update_profile),
        )
        .route(
            "/routines",
            get(handlers::routine::get_routines).post(handlers::routine::update_routines),
        )
        .route(
            "/family",
            get(handlers::family::get_family).post(handlers::family::update_family),
        )
        .route(
            "/notes",
            get(handlers::note::get_notes).post(handlers::note::post_notes),
        )
        // Uploads
        .route("/upload", post(handlers::upload::upload));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(uploads_dir(&state.data_dir)))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the frontend from disk if the directory exists. API routes and
    // /health take priority; unknown paths fall through to index.html.
    let web_dir = std::env::var("KEEPSAKE_WEB_DIR").unwrap_or_else(|_| "web".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "static file serving enabled");
    }

    router
}

/// GET /health - simple liveness check.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
