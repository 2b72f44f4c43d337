use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::generation::GenerationError;
use crate::normalize::PipelineError;

/// Request failure rendered as `{"success": false, "message": ...}`.
///
/// Upstream and internal causes are logged here and replaced by a generic
/// message; only the client-safe variants echo their text.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    /// Maps a generation failure, keeping the user-visible message generic.
    pub fn generation(message: &'static str, err: GenerationError) -> Self {
        match err {
            GenerationError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            GenerationError::Pipeline(PipelineError::EmptyPlan) => {
                ApiError::BadRequest("Meal plan structure invalid.".to_owned())
            }
            other => ApiError::Upstream {
                message,
                source: anyhow::Error::new(other),
            },
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream { message, source } => {
                tracing::error!(error = %format!("{source:#}"), "{message}");
            }
            ApiError::Internal(source) => {
                tracing::error!(error = %format!("{source:#}"), "request failed");
            }
            _ => {}
        }

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `{"success": true, ...fields}`.
pub fn ok<T: Serialize>(payload: T) -> ApiResult<Response> {
    with_status(StatusCode::OK, payload)
}

pub fn with_status<T: Serialize>(status: StatusCode, payload: T) -> ApiResult<Response> {
    let mut value = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(anyhow::Error::new(err).context("serialize response")))?;
    let Some(fields) = value.as_object_mut() else {
        return Err(ApiError::Internal(anyhow::anyhow!("response payload is not an object")));
    };
    fields.insert("success".to_owned(), serde_json::Value::Bool(true));
    Ok((status, Json(value)).into_response())
}
