//! HTTP handlers for the user directory. Both routes are anonymous; they
//! expose nothing beyond profile data.

use crate::{
    errors::AppError,
    models::user::{User, UserSummary},
    services::gallery_service::{GalleryError, GalleryService},
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// Parse a path segment into an entity id, rejecting malformed tokens with
/// 400 before any store lookup. Distinct from the not-found outcome.
pub fn parse_entity_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("Invalid {} ID format", what)))
}

/// GET `/user/list` — summaries for the directory sidebar, insertion order.
pub async fn list_users(
    State(service): State<GalleryService>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = service.list_user_summaries().await?;
    Ok(Json(users))
}

/// GET `/user/{id}` — full profile details.
///
/// Returns 400 both for a malformed id and for a missing user; this route
/// has always answered 400 for both and clients depend on it.
pub async fn get_user(
    State(service): State<GalleryService>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = parse_entity_id(&id, "user")?;
    let user = service.find_user_by_id(id).await.map_err(|err| match err {
        GalleryError::UserNotFound(_) => AppError::bad_request("User not found"),
        other => other.into(),
    })?;
    Ok(Json(user))
}
