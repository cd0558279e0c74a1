use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gateway::{Endpoint, NewProduct};
use serde::Deserialize;

use super::{invalidated, provided};
use crate::{AppState, ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct ProductSearch {
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProductSearch>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.gateway.fetch_products(params.search.as_deref()).await?;
    Ok((provided(Endpoint::Products), Json(products)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let product = state.gateway.create_product(payload).await?;
    Ok((
        StatusCode::CREATED,
        invalidated(Endpoint::CreateProduct),
        Json(product),
    ))
}
