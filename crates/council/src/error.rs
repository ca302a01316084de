use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Deliberation engine and HTTP surface errors, carrying their own status
/// code so handlers can just `?` their way to a response.
#[derive(Debug, Error)]
pub enum Error {
    #[error("provider '{0}' is not configured")]
    ProviderUnavailable(String),

    #[error("model '{0}' is not recognized")]
    ModelNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("job '{0}' not found")]
    JobNotFound(String),

    #[error("missing or invalid X-Council-Key")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProviderUnavailable(_) | Self::ModelNotFound(_) | Self::JobNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable(_) | Self::ModelNotFound(_) | Self::JobNotFound(_) => "not_found_error",
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Unauthorized => "authentication_error",
            Self::Forbidden => "permission_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message safe to expose to callers — internal errors never leak
    /// their source.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetails,
}

#[derive(Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            log::error!("internal error: {source:#}");
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}
