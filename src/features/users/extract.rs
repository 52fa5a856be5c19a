use crate::error::ApiError;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// The `{id}` path segment, already parsed.
///
/// A segment that is not an integer can never name a stored user, so it is
/// rejected as not found rather than as a bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;

        raw.parse::<i64>().map(UserId).map_err(|_| {
            debug!(id = %raw, "unparsable user id");
            ApiError::NotFound
        })
    }
}

// decode a request body as JSON whatever content type the client sent.
// only a JSON object is a payload, serde would otherwise build a struct from an array
pub fn parse_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice::<Map<String, Value>>(body)
        .and_then(|object| serde_json::from_value(Value::Object(object)))
        .map_err(|e| {
            debug!(error = %e, "error decoding request body");
            ApiError::InvalidPayload(e)
        })
}
