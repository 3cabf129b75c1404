//! Represents an uploaded photo and its display form.

use crate::models::comment::CommentView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A photo record as persisted.
///
/// The row stores metadata only; the image bytes live on disk under the
/// upload directory, addressed by `file_name`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Photo {
    pub id: Uuid,

    /// Owning user. Immutable after creation; only the owner may delete.
    pub user_id: Uuid,

    /// Stored file name assigned at upload time. Unique across all photos.
    pub file_name: String,

    /// When the photo was uploaded. Galleries sort ascending on this.
    pub date_time: DateTime<Utc>,
}

/// A photo together with its aggregated comment thread, as returned to
/// gallery clients.
#[derive(Serialize, Debug)]
pub struct PhotoView {
    #[serde(flatten)]
    pub photo: Photo,

    /// Comments in stored order, each carrying a denormalized author.
    pub comments: Vec<CommentView>,
}
