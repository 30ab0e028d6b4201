use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed,
    BodyTooLarge,
    UpstreamFailure(String),
    UpstreamTimeout,
    InternalServerError,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "This request method is not supported here.".to_string(),
            ),
            Self::BodyTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "The request body is too large.".to_string(),
            ),
            Self::UpstreamFailure(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "The document store took too long to respond.".to_string(),
            ),
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something unexpected went wrong.".to_string(),
            ),
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            error!("document store request timed out: {:?}", err);
            return Self::UpstreamTimeout;
        }
        error!("document store request failed: {:?}", err);
        Self::UpstreamFailure("Could not reach the document store.".to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        error!("JSON serialization failed: {:?}", err);
        Self::InternalServerError
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .into_values()
            .flat_map(|errors| errors.iter().filter_map(|e| e.message.clone()))
            .next()
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "Invalid input.".to_string());
        Self::BadRequest(message)
    }
}
