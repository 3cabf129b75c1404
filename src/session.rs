//! Per-request session identity.
//!
//! Authentication itself lives in an external session layer; by the time a
//! request reaches this service that layer has resolved the cookie to a user
//! id and forwarded it in the `x-session-user` header. This module only
//! answers "is there an authenticated user, and what is their id".

use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-session-user";

/// The authenticated identity attached to the current request.
///
/// Extraction fails with 401 when the header is absent or unparseable,
/// short-circuiting the handler before any store access. Handlers that
/// accept anonymous requests simply do not take this extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionUser(pub Uuid);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let id = Uuid::parse_str(raw).map_err(|_| AppError::unauthorized())?;
        Ok(SessionUser(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/photo/new");
        if let Some(value) = value {
            builder = builder.header(SESSION_HEADER, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn extracts_identity_from_header() {
        let id = Uuid::new_v4();
        let mut parts = parts_with_header(Some(&id.to_string()));
        let session = SessionUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(session, SessionUser(id));
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let mut parts = parts_with_header(None);
        let err = SessionUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_header_is_unauthorized() {
        let mut parts = parts_with_header(Some("not-a-user-id"));
        let err = SessionUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
