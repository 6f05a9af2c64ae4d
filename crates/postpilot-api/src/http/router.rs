//! Axum router configuration with middleware.
//!
//! Chat routes are mounted twice: at the root and under `/api`, so clients
//! written against either prefix work unchanged.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{MethodRouter, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let chat_routes = chat_routes();

    Router::new()
        .merge(chat_routes.clone())
        .nest("/api", chat_routes)
        .route("/health", only(get(health_check)))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/chat",
            only(post(handlers::chat::create_chat).put(handlers::chat::append_turn)),
        )
        .route("/chat/history", only(get(handlers::chat::chat_history)))
        .route(
            "/chat/{id}",
            only(
                get(handlers::chat::get_chat)
                    .patch(handlers::chat::update_title)
                    .delete(handlers::chat::delete_chat),
            ),
        )
        .route("/chats", only(get(handlers::chat::list_chats)))
}

/// Answer any method the route does not list with a JSON 405.
fn only(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(method_not_allowed)
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
