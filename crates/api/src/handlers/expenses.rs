use axum::{extract::State, response::IntoResponse, Json};
use gateway::Endpoint;

use super::provided;
use crate::{AppState, ApiError};

/// Expenses grouped by category, largest amount first.
pub async fn by_category(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.gateway.fetch_expenses_by_category().await?;
    Ok((provided(Endpoint::ExpensesByCategory), Json(rows)))
}
