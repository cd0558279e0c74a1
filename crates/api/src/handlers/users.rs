use axum::{extract::State, response::IntoResponse, Json};
use gateway::Endpoint;

use super::provided;
use crate::{AppState, ApiError};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.gateway.fetch_users().await?;
    Ok((provided(Endpoint::Users), Json(users)))
}
