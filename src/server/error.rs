//! HTTP error responses
//!
//! Bodies use the `detail` shape the dashboard already understands:
//! a list of field errors for 422, a single message for 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One invalid part of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending value, starting with `"body"`
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn new(loc: Vec<String>, msg: &str, kind: &str) -> Self {
        Self {
            loc,
            msg: msg.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Error about the request body as a whole.
    pub fn body(msg: &str, kind: &str) -> Self {
        Self::new(vec!["body".to_string()], msg, kind)
    }

    pub fn missing(field: &str) -> Self {
        Self::new(
            vec!["body".to_string(), field.to_string()],
            "Field required",
            "missing",
        )
    }

    pub fn not_a_number(field: &str) -> Self {
        Self::new(
            vec!["body".to_string(), field.to_string()],
            "Input should be a valid number",
            "float_type",
        )
    }

    pub fn unparsable_number(field: &str) -> Self {
        Self::new(
            vec!["body".to_string(), field.to_string()],
            "Input should be a valid number, unable to parse string as a number",
            "float_parsing",
        )
    }

    /// A missing or non-numeric cell in row `row` of a batch upload.
    pub fn row_value(row: usize, field: &str) -> Self {
        Self::new(
            vec!["body".to_string(), row.to_string(), field.to_string()],
            "Input should be a valid number",
            "float_type",
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub detail: Vec<FieldError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Failure of a single API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request was well-formed HTTP but its body does not satisfy the schema.
    #[error("request validation failed with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Something the request depends on is unavailable.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorResponse { detail }),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { detail }),
                )
                    .into_response()
            }
        }
    }
}
