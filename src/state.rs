use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;

use crate::avatar::AvatarChain;
use crate::config::SessionConfig;
use crate::gateway::hub::HubHandle;

#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle<Utf8Bytes>,
    pub avatars: Arc<AvatarChain>,
    pub session: SessionConfig,
    pub avatar_path: PathBuf,
    pub max_upload_size: usize,
}
