//! Represents a comment on a photo and its display form.

use crate::models::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A comment record as persisted.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Comment {
    pub id: Uuid,

    /// Target photo. Immutable after creation.
    pub photo_id: Uuid,

    /// Authoring user. Immutable after creation; only the author may edit
    /// or delete.
    pub user_id: Uuid,

    /// Text body. Never empty or all-whitespace; enforced at write time.
    pub comment: String,

    pub date_time: DateTime<Utc>,
}

/// A comment with its author denormalized into a [`UserSummary`], as
/// returned to clients.
#[derive(Serialize, Debug)]
pub struct CommentView {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub comment: String,
    pub date_time: DateTime<Utc>,
    pub user: UserSummary,
}

impl CommentView {
    pub fn new(comment: Comment, user: UserSummary) -> Self {
        Self {
            id: comment.id,
            photo_id: comment.photo_id,
            comment: comment.comment,
            date_time: comment.date_time,
            user,
        }
    }
}
