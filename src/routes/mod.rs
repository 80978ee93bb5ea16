mod auth;
mod avatars;
mod health;
mod room;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let avatar_service = ServeDir::new(&state.avatar_path);
    // Leave headroom for multipart framing; the handler enforces the file limit.
    let upload_limit = state.max_upload_size + 64 * 1024;

    Router::new()
        .route("/health", get(health::health))
        .route("/version", get(health::version))
        .route("/room", get(crate::gateway::ws_upgrade))
        .route("/room/members", get(room::member_count))
        .route("/logout", get(auth::logout))
        .route(
            "/uploader",
            post(avatars::upload_avatar).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest_service("/avatars", avatar_service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
