use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use data_encoding::{BASE64, BASE64URL};

use crate::error::AppError;
use crate::models::user::UserProfile;

/// Name of the cookie carrying the authenticated user data.
pub const AUTH_COOKIE: &str = "auth";

/// An already-authenticated user, taken from the `auth` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserProfile);

/// Rejection type for when auth fails.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        AppError::Unauthorized("invalid or missing authentication".to_string()).into_response()
    }
}

/// Find a cookie value by name across every `Cookie` header.
fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

/// Decode the base64-encoded JSON user data stored in the auth cookie.
pub fn decode_profile(value: &str) -> Option<UserProfile> {
    let bytes = BASE64
        .decode(value.as_bytes())
        .or_else(|_| BASE64URL.decode(value.as_bytes()))
        .ok()?;
    let profile: UserProfile = serde_json::from_slice(&bytes).ok()?;
    if profile.user_id.is_empty() || profile.name.is_empty() {
        return None;
    }
    Some(profile)
}

/// Encode user data into an auth cookie value.
pub fn encode_profile(profile: &UserProfile) -> serde_json::Result<String> {
    let json = serde_json::to_vec(profile)?;
    Ok(BASE64.encode(&json))
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        cookie_value(parts, AUTH_COOKIE)
            .and_then(decode_profile)
            .map(AuthUser)
            .ok_or(AuthRejection)
    }
}
