use serde::{Deserialize, Serialize};

/// Authenticated user data carried in the `auth` cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userid")]
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Identity attached to a chat session for its whole lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub avatar_url: String,
}

impl Identity {
    /// Build a session identity from a profile and a resolved avatar URL.
    /// An unresolved avatar becomes an empty string.
    pub fn new(profile: &UserProfile, avatar_url: Option<String>) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            name: profile.name.clone(),
            avatar_url: avatar_url.unwrap_or_default(),
        }
    }
}
