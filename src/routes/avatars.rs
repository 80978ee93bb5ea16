use axum::extract::{Multipart, State};

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::storage;

/// `POST /uploader`: store the `avatarFile` field as the caller's avatar.
pub async fn upload_avatar(
    AuthUser(profile): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("avatarFile") {
            continue;
        }
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field.bytes().await?;
        if bytes.len() > state.max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "avatar exceeds maximum size of {} KB",
                state.max_upload_size / 1024
            )));
        }
        let url =
            storage::save_avatar(&state.avatar_path, &profile.user_id, &content_type, &bytes)
                .await?;
        tracing::info!(user = %profile.user_id, "avatar uploaded to {url}");
        return Ok("Successful");
    }
    Err(AppError::BadRequest("missing avatarFile field".to_string()))
}
