//! HTTP rendering of the gateway's error envelope.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway::GatewayError;
use serde_json::json;

/// A failure on its way out as `{"status", "message"}` with the matching
/// HTTP status.
#[derive(Debug)]
pub enum ApiError {
    Gateway(GatewayError),
    /// The request body was not a valid payload for the endpoint.
    InvalidBody(JsonRejection),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Gateway(err) => {
                let status = StatusCode::from_u16(err.status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(err)).into_response()
            }
            Self::InvalidBody(rejection) => {
                let status = rejection.status();
                let body = json!({
                    "status": status.as_u16(),
                    "message": rejection.body_text(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}
