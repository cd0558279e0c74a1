//! Gateway-level error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::MappingError;

/// Status reported for every backend failure.
pub const BACKEND_FAILURE_STATUS: u16 = 500;

/// The single failure shape handed to callers.
///
/// Serialises as the envelope `{"status": <number>, "message": <string>}`.
/// Callers never see backend-specific error types.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GatewayError {
    /// Anything the backend reported (connectivity, constraint violation,
    /// permission) or a row that could not be mapped to its view model.
    #[error("{message} (status {status})")]
    BackendOperationFailed { status: u16, message: String },
}

impl GatewayError {
    pub fn status(&self) -> u16 {
        match self {
            Self::BackendOperationFailed { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BackendOperationFailed { message, .. } => message,
        }
    }

    fn backend(message: String) -> Self {
        Self::BackendOperationFailed {
            status: BACKEND_FAILURE_STATUS,
            message,
        }
    }
}

impl From<db::DbError> for GatewayError {
    fn from(err: db::DbError) -> Self {
        Self::backend(err.message())
    }
}

impl From<MappingError> for GatewayError {
    fn from(err: MappingError) -> Self {
        Self::backend(err.to_string())
    }
}
