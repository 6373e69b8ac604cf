//! Request extractors shared by the handlers.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// JSON body that may be omitted.
///
/// An empty (or whitespace-only) body yields `T::default()`; anything else
/// must be valid JSON for `T`, otherwise the request fails with 400.
#[derive(Debug)]
pub struct JsonOrEmpty<T>(pub T);

/// Decodes `body` as `T`, treating a blank body as `T::default()`.
pub fn decode_optional_json<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrEmpty<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        decode_optional_json(&body).map(JsonOrEmpty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Notes {
        notes: Option<String>,
    }

    async fn extract(body: &'static str) -> Result<Notes, AppError> {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        JsonOrEmpty::<Notes>::from_request(req, &()).await.map(|JsonOrEmpty(n)| n)
    }

    #[tokio::test]
    async fn test_blank_body_is_default() {
        assert_eq!(extract("").await.unwrap(), Notes::default());
        assert_eq!(extract(" \n").await.unwrap(), Notes::default());
    }

    #[tokio::test]
    async fn test_valid_body_is_decoded() {
        let notes = extract(r#"{"notes": "follow up"}"#).await.unwrap();
        assert_eq!(notes.notes.as_deref(), Some("follow up"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let err = extract(r#"{"notes": "#).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.starts_with("Invalid JSON body")));
        assert!(matches!(extract("[1, 2]").await, Err(AppError::Validation(_))));
    }
}
