//! HTTP error responses
//!
//! Every failure leaves the server as `{"error": <message>}`. Internal detail
//! is logged, never returned.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::error::{EmbedError, Error, ScrapeError};

/// Error returned by the API handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed request (bad URL, bad image payload, empty update)
    BadRequest(String),
    /// Request body over the configured limit
    PayloadTooLarge,
    /// Missing or invalid caller identity
    Unauthorized,
    /// Record missing or owned by someone else
    NotFound,
    /// Style extraction failed
    Scrape(ScrapeError),
    /// Storage or other server-side failure
    Internal,
}

impl ApiError {
    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Scrape(ScrapeError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Scrape(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::PayloadTooLarge => "request body too large".to_string(),
            ApiError::Unauthorized => "missing or invalid user identity".to_string(),
            ApiError::NotFound => "embed not found".to_string(),
            ApiError::Scrape(kind) => kind.to_string(),
            ApiError::Internal => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<ScrapeError> for ApiError {
    fn from(kind: ScrapeError) -> Self {
        ApiError::Scrape(kind)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(%rejection, "Rejected request body");
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            _ => ApiError::BadRequest("invalid JSON body".to_string()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            error!(%rejection, "Route has no matching path parameters");
            return ApiError::Internal;
        }
        debug!(%rejection, "Rejected path parameter");
        ApiError::BadRequest("invalid path parameter".to_string())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Embed(EmbedError::NotFound(_)) => ApiError::NotFound,
            Error::Embed(EmbedError::InvalidImage(msg)) => {
                ApiError::BadRequest(format!("invalid image: {}", msg))
            }
            other => {
                error!(error = %other, "Request failed");
                ApiError::Internal
            }
        }
    }
}
