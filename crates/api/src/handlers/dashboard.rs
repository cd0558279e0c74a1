use axum::{extract::State, response::IntoResponse, Json};
use gateway::Endpoint;

use super::provided;
use crate::{AppState, ApiError};

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let metrics = state.gateway.fetch_dashboard_metrics().await?;
    Ok((provided(Endpoint::DashboardMetrics), Json(metrics)))
}
