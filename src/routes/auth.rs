use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::middleware::auth::AUTH_COOKIE;

/// Clear the auth cookie and send the browser back to the chat page.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::TEMPORARY_REDIRECT,
        [
            (SET_COOKIE, format!("{AUTH_COOKIE}=; Path=/; Max-Age=0")),
            (LOCATION, "/chat".to_string()),
        ],
    )
}
