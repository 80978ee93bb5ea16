use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_sha: &'static str,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn version() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        git_sha: env!("GIT_SHA"),
    })
}
