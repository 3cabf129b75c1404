//! Defines routes for the user directory and photo/comment operations.
//!
//! ## Structure
//! - **User directory** (anonymous)
//!   - `GET    /user/list` — summaries for the sidebar
//!   - `GET    /user/{id}` — profile details
//!
//! - **Galleries, comments, upload** (session required)
//!   - `GET    /photo/{id}` — gallery for user `{id}` with aggregated comments
//!   - `DELETE /photo/{photo_id}` — delete own photo
//!   - `POST   /photo/commentsOfPhoto/{photo_id}` — post a comment
//!   - `PUT    /photo/comment/{comment_id}` — edit own comment
//!   - `DELETE /photo/comment/{comment_id}` — delete own comment
//!   - `POST   /photo/new` — multipart upload, field name `photo`
//!
//! `/photo/new` must be registered alongside `/photo/{id}`; the static
//! segment wins route matching.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        photo_handlers::{
            delete_comment, delete_photo, edit_comment, post_comment, upload_photo, user_gallery,
        },
        user_handlers::{get_user, list_users},
    },
    services::{gallery_service::GalleryService, upload_service::MAX_UPLOAD_BYTES},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

/// Build and return the router for all routes.
///
/// The router carries shared state (`GalleryService`) to all handlers. The
/// body limit sits at twice the 5 MiB admission cap, leaving room for
/// multipart framing, so an oversize upload reaches admission and gets the
/// contract's 400 "too large" answer instead of a transport-level 413.
pub fn routes() -> Router<GalleryService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // user directory
        .route("/user/list", get(list_users))
        .route("/user/{id}", get(get_user))
        // galleries, comments, upload
        .route("/photo/new", post(upload_photo))
        .route("/photo/commentsOfPhoto/{photo_id}", post(post_comment))
        .route(
            "/photo/comment/{comment_id}",
            put(edit_comment).delete(delete_comment),
        )
        .route("/photo/{id}", get(user_gallery).delete(delete_photo))
        .layer(DefaultBodyLimit::max(2 * MAX_UPLOAD_BYTES))
}
