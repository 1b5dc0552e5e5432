use crate::store::errors::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Missing or invalid request fields or enum values
    #[error("{message}")]
    Validation { message: String },

    /// Bad credentials
    #[error("{message}")]
    Unauthenticated { message: String },

    /// Authenticated but lacking the required privilege
    #[error("{message}")]
    Forbidden { message: String },

    /// Requested row not found
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// Business rule violation, e.g. duplicate username or re-terminating a bet
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Record store error (object storage or codec)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Store(store_err) => match store_err {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Codec { .. } | StoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message placed in the `{status:"error", message}` envelope.
    ///
    /// Storage errors are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { message } | Error::Unauthenticated { message } | Error::Forbidden { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} {id} not found"),
            Error::Conflict { message } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Store(store_err) => store_err.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details - different log levels based on severity
        match &self {
            Error::Store(StoreError::Other(_)) | Error::Store(StoreError::Codec { .. }) | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
            Error::Validation { .. } | Error::NotFound { .. } | Error::Store(StoreError::NotFound) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = json!({
            "status": "error",
            "message": self.user_message(),
        });

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                Error::Validation {
                    message: "bad".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::Unauthenticated {
                    message: "nope".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                Error::Forbidden {
                    message: "admin only".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                Error::NotFound {
                    resource: "bet",
                    id: "x".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                Error::Conflict {
                    message: "dup".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (Error::Store(StoreError::NotFound), StatusCode::NOT_FOUND),
            (
                Error::Store(StoreError::Other(anyhow::anyhow!("boom"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn test_storage_message_passed_through() {
        let err = Error::Store(StoreError::Other(anyhow::anyhow!("connection reset by peer")));
        assert_eq!(err.user_message(), "connection reset by peer");
    }
}
