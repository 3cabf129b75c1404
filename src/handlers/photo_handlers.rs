//! HTTP handlers for galleries, comments and photo upload. Every route here
//! requires an authenticated session; the `SessionUser` extractor rejects
//! anonymous requests with 401 before the handler body runs, and the acting
//! identity always comes from the session, never from the request payload.

use crate::{
    errors::AppError,
    handlers::user_handlers::parse_entity_id,
    models::{comment::CommentView, photo::PhotoView},
    services::{
        gallery_service::{GalleryError, GalleryService},
        upload_service::UploadCandidate,
    },
    session::SessionUser,
};
use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::MultipartError,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

/// Request body for posting or editing a comment.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub comment: String,
}

/// Keep the `{message}` error shape for unparseable comment bodies instead
/// of axum's plain-text Json rejection.
fn json_error(err: JsonRejection) -> AppError {
    AppError::bad_request(err.body_text())
}

/// A multipart failure caused by the body-size limit means the candidate was
/// oversize; report it as the admission outcome rather than a parse error.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GalleryError::FileTooLarge.into()
    } else {
        AppError::bad_request(format!("Malformed multipart body: {}", err))
    }
}

/// GET `/photo/{id}` — the gallery of user `{id}`: photos sorted by upload
/// time, each with its aggregated comment thread. Any authenticated user may
/// view any gallery.
pub async fn user_gallery(
    _session: SessionUser,
    State(service): State<GalleryService>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PhotoView>>, AppError> {
    let user_id = parse_entity_id(&id, "user")?;
    let gallery = service.user_gallery(user_id).await?;
    Ok(Json(gallery))
}

/// DELETE `/photo/{photo_id}` — owner-only; a missing photo and someone
/// else's photo are indistinguishable in the response.
pub async fn delete_photo(
    SessionUser(requester): SessionUser,
    State(service): State<GalleryService>,
    Path(photo_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let photo_id = parse_entity_id(&photo_id, "photo")?;
    service.delete_photo(photo_id, requester).await?;
    Ok(Json(json!({ "message": "Photo deleted successfully" })))
}

/// POST `/photo/commentsOfPhoto/{photo_id}` — post a comment as the session
/// user. Returns the comment with its author already denormalized.
pub async fn post_comment(
    SessionUser(author): SessionUser,
    State(service): State<GalleryService>,
    Path(photo_id): Path<String>,
    body: Result<Json<CommentBody>, JsonRejection>,
) -> Result<Json<CommentView>, AppError> {
    let Json(body) = body.map_err(json_error)?;
    let photo_id = parse_entity_id(&photo_id, "photo")?;
    let comment = service.create_comment(photo_id, author, &body.comment).await?;
    Ok(Json(comment))
}

/// PUT `/photo/comment/{comment_id}` — author-only edit, same ownership
/// opacity as deletion. Empty text is rejected before the ownership lookup.
pub async fn edit_comment(
    SessionUser(requester): SessionUser,
    State(service): State<GalleryService>,
    Path(comment_id): Path<String>,
    body: Result<Json<CommentBody>, JsonRejection>,
) -> Result<Json<CommentView>, AppError> {
    let Json(body) = body.map_err(json_error)?;
    let comment_id = parse_entity_id(&comment_id, "comment")?;
    let comment = service
        .edit_comment(comment_id, requester, &body.comment)
        .await?;
    Ok(Json(comment))
}

/// DELETE `/photo/comment/{comment_id}` — author-only.
pub async fn delete_comment(
    SessionUser(requester): SessionUser,
    State(service): State<GalleryService>,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let comment_id = parse_entity_id(&comment_id, "comment")?;
    service.delete_comment(comment_id, requester).await?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}

/// POST `/photo/new` — multipart upload, field name `photo`. The candidate
/// runs through admission (type, size, stored-name assignment) and then a
/// photo record is created for the session user.
pub async fn upload_photo(
    SessionUser(owner): SessionUser,
    State(service): State<GalleryService>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut candidate: Option<UploadCandidate> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("photo") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        candidate = Some(UploadCandidate {
            content_type,
            file_name,
            data,
        });
        break;
    }

    let candidate =
        candidate.ok_or_else(|| AppError::bad_request("No photo file was uploaded"))?;

    let photo = service.upload_photo(owner, candidate).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Photo uploaded successfully",
            "photo": {
                "id": photo.id,
                "file_name": photo.file_name,
                "date_time": photo.date_time,
            }
        })),
    ))
}
