pub mod hub;
pub mod session;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::StreamExt;

use crate::middleware::auth::AuthUser;
use crate::models::user::Identity;
use crate::state::AppState;
use session::Session;

/// `GET /room`: upgrade an authenticated request into a chat session.
///
/// `AuthUser` runs first, so an unauthenticated request is answered with
/// 401 and never upgraded.
pub async fn ws_upgrade(
    AuthUser(profile): AuthUser,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    let avatars = state.avatars.clone();
    let lookup = profile.clone();
    let avatar_url = tokio::task::spawn_blocking(move || avatars.resolve(&lookup))
        .await
        .unwrap_or_default();
    if avatar_url.is_none() {
        tracing::debug!(user = %profile.user_id, "no avatar found, using empty url");
    }
    let identity = Identity::new(&profile, avatar_url);

    ws.max_message_size(state.session.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, identity, state))
}

async fn handle_socket(socket: WebSocket, identity: Identity, state: AppState) {
    let (sink, stream) = socket.split();
    Session::new(identity)
        .run(sink, stream, state.hub.clone(), &state.session)
        .await;
}
