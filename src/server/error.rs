use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use log::warn;

use crate::entity::DescriptorError;
use crate::error::AppError;
use crate::service::error::ServiceError;

/// Body of every non-validation failure. Details only go to the logs.
pub const GENERIC_ERROR_BODY: &str = "Error";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Missing session cookie, parameters or id. Carries the configured
    /// message verbatim.
    #[error("{message}")]
    Validation { message: String },

    #[error(transparent)]
    MalformedDescriptor(#[from] DescriptorError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn validation(message: &str) -> Self {
        ApiError::Validation {
            message: message.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::MalformedDescriptor(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Service(ServiceError::UpstreamError(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation { message } => (status, message).into_response(),
            ApiError::MalformedDescriptor(e) => (status, e.to_string()).into_response(),
            ApiError::Service(ServiceError::UpstreamError(e)) => {
                warn!("Session lookup failed: {e}");
                (status, GENERIC_ERROR_BODY).into_response()
            }
            ApiError::Service(e) => {
                AppError::log_with_ref(&e);
                (status, GENERIC_ERROR_BODY).into_response()
            }
        }
    }
}
