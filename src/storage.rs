use std::path::{Path, PathBuf};

use crate::error::AppError;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

fn mime_to_ext(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Save an uploaded avatar as `<avatar_path>/<user_id>.<ext>`.
/// Returns the public URL of the stored file.
pub async fn save_avatar(
    avatar_path: &Path,
    user_id: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let ext = mime_to_ext(content_type).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unsupported image type: {content_type}. allowed: png, jpeg, gif, webp"
        ))
    })?;
    if user_id.is_empty() || user_id.contains(['/', '\\', '.']) {
        return Err(AppError::BadRequest("invalid user id".to_string()));
    }

    tokio::fs::create_dir_all(avatar_path).await?;

    // Remove earlier uploads so a changed extension does not leave a stale match.
    delete_avatar(avatar_path, user_id).await?;

    let filename = format!("{user_id}.{ext}");
    tokio::fs::write(avatar_path.join(&filename), bytes).await?;

    Ok(format!("/avatars/{filename}"))
}

/// Delete all files matching `user_id.*` in the avatar directory.
pub async fn delete_avatar(avatar_path: &Path, user_id: &str) -> Result<(), AppError> {
    let mut entries = match tokio::fs::read_dir(avatar_path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let prefix = format!("{user_id}.");
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(&prefix) {
                let _ = tokio::fs::remove_file(entry.path()).await;
            }
        }
    }
    Ok(())
}

/// A unique, not yet created directory under the system temp dir.
pub fn temp_storage_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("wschat-test-{}", uuid::Uuid::new_v4()));
    path
}
