//! Avatar URL resolution.
//!
//! An [`AvatarChain`] holds an ordered list of independent strategies and
//! returns the first URL any of them produces. A strategy that cannot
//! produce a URL just yields `None`; the chain moves on to the next one.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::user::UserProfile;

/// A single way of producing an avatar URL for a user.
pub trait AvatarSource: Send + Sync {
    fn avatar_url(&self, profile: &UserProfile) -> Option<String>;
}

/// Uses the avatar URL declared by the identity provider.
pub struct AuthAvatar;

impl AvatarSource for AuthAvatar {
    fn avatar_url(&self, profile: &UserProfile) -> Option<String> {
        profile
            .avatar_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

/// Points at Gravatar using a hash of the user id.
pub struct GravatarAvatar;

impl AvatarSource for GravatarAvatar {
    fn avatar_url(&self, profile: &UserProfile) -> Option<String> {
        if profile.user_id.is_empty() {
            return None;
        }
        Some(format!(
            "//www.gravatar.com/avatar/{}",
            gravatar_hash(&profile.user_id)
        ))
    }
}

/// Looks for an uploaded file named after the user id.
/// The directory is scanned on every call.
pub struct FileSystemAvatar {
    dir: PathBuf,
}

impl FileSystemAvatar {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AvatarSource for FileSystemAvatar {
    fn avatar_url(&self, profile: &UserProfile) -> Option<String> {
        if profile.user_id.is_empty() {
            return None;
        }
        let entries = std::fs::read_dir(&self.dir).ok()?;
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                // Uploads are stored as `<user_id>.<ext>`.
                if name.starts_with(&format!("{}.", profile.user_id)) {
                    return Some(format!("/avatars/{name}"));
                }
            }
        }
        None
    }
}

/// Lowercase hex SHA-256 of the trimmed, lowercased input.
pub fn gravatar_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.trim().to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Ordered fallback list of avatar strategies.
#[derive(Default)]
pub struct AvatarChain {
    sources: Vec<Box<dyn AvatarSource>>,
}

impl AvatarChain {
    pub fn new(sources: Vec<Box<dyn AvatarSource>>) -> Self {
        Self { sources }
    }

    /// Build a chain from strategy names (`auth`, `gravatar`, `file`).
    /// Unknown names are skipped with a warning.
    pub fn from_names<S: AsRef<str>>(names: &[S], avatar_dir: &Path) -> Self {
        let mut sources: Vec<Box<dyn AvatarSource>> = Vec::with_capacity(names.len());
        for name in names {
            match name.as_ref().trim() {
                "auth" => sources.push(Box::new(AuthAvatar)),
                "gravatar" => sources.push(Box::new(GravatarAvatar)),
                "file" => sources.push(Box::new(FileSystemAvatar::new(avatar_dir))),
                "" => {}
                other => tracing::warn!("unknown avatar strategy {other:?}, skipping"),
            }
        }
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Return the first URL produced by any strategy, in order.
    pub fn resolve(&self, profile: &UserProfile) -> Option<String> {
        self.sources
            .iter()
            .find_map(|source| source.avatar_url(profile))
    }
}
