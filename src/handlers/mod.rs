use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde_json::Value;

use crate::Error;

pub mod auth;
pub mod posts;

/// Lenient JSON body extractor. A missing, unreadable, or malformed body
/// becomes an empty object so the field-level sanitizers answer with their
/// own 400 message; only an oversized body is rejected outright.
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(Error::BodyTooLarge);
            }
            Err(_) => return Ok(JsonBody(Value::Object(Default::default()))),
        };

        let value =
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Object(Default::default()));
        Ok(JsonBody(value))
    }
}

pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
