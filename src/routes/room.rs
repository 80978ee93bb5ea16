use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::models::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MemberCount {
    pub count: usize,
}

pub async fn member_count(State(state): State<AppState>) -> Json<DataResponse<MemberCount>> {
    let count = state.hub.members().await.len();
    Json(DataResponse::new(MemberCount { count }))
}
