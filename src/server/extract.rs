//! Request extractors that reject with [`ApiError`] bodies.

use axum::body::Bytes;
use axum::extract::{FromRequest, Query, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::ApiError;

/// JSON body. Malformed bodies become a 400 with the usual error shape.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Request carrying only a session id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionRef {
    pub session_id: Option<String>,
}

impl SessionRef {
    /// The non-blank session id.
    pub fn require(&self) -> Result<&str, ApiError> {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::validation("Session ID is required"))
    }
}

/// Session id taken from the `sessionId` query parameter, else from a JSON
/// body. Used by preview and download routes that browsers open directly.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

impl<S> FromRequest<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Ok(Query(query)) = Query::<SessionRef>::try_from_uri(req.uri()) {
            if let Ok(id) = query.require() {
                return Ok(Self(id.to_string()));
            }
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        if body.is_empty() {
            return Err(ApiError::validation("Session ID is required"));
        }
        let reference: SessionRef = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {e}")))?;
        Ok(Self(reference.require()?.to_string()))
    }
}
