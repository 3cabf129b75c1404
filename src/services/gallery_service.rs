//! src/services/gallery_service.rs
//!
//! GalleryService — user directory lookups, per-user photo galleries and
//! comment CRUD, backed by SQLite for records and local disk for uploaded
//! image payloads. Gallery reads go through the comment aggregator, which
//! joins each comment to a denormalized author summary before anything is
//! returned to a client.

use crate::models::{
    comment::{Comment, CommentView},
    photo::{Photo, PhotoView},
    user::{User, UserSummary},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{
    collections::{BTreeSet, HashMap},
    io,
    path::PathBuf,
    sync::Arc,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("user `{0}` not found")]
    UserNotFound(Uuid),
    /// Existence and ownership are deliberately collapsed: a caller cannot
    /// tell "no such photo" apart from "not your photo".
    #[error("Photo not found or you do not have permission to modify it")]
    PhotoNotFoundOrForbidden,
    #[error("Comment not found or you do not have permission to modify it")]
    CommentNotFoundOrForbidden,
    #[error("Comment cannot be empty")]
    EmptyComment,
    #[error("Invalid file type. Only JPEG, PNG and GIF are allowed.")]
    InvalidFileType,
    #[error("File exceeds the 5 MiB upload limit")]
    FileTooLarge,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type GalleryResult<T> = Result<T, GalleryError>;

/// GalleryService provides the content-access operations of the service:
/// - User directory reads (summaries and full profiles)
/// - Gallery assembly (photos sorted by upload time, comments aggregated)
/// - Photo creation/deletion and comment CRUD with ownership checks
///
/// Ownership-scoped mutations run as a single conditional statement
/// (`WHERE id = ? AND user_id = ?`) so the store never reveals whether a
/// mismatch meant "missing" or "not yours".
#[derive(Clone)]
pub struct GalleryService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    /// Directory on disk where uploaded image payloads are stored.
    pub upload_dir: PathBuf,
}

impl GalleryService {
    /// Create a new GalleryService backed by the provided SQLite pool,
    /// storing uploaded files under `upload_dir`.
    pub fn new(db: Arc<SqlitePool>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            upload_dir: upload_dir.into(),
        }
    }

    /// List `{id, first_name, last_name}` for every user, in insertion
    /// order. Backs the directory sidebar; deliberately not sorted.
    pub async fn list_user_summaries(&self) -> GalleryResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>("SELECT id, first_name, last_name FROM users")
            .fetch_all(&*self.db)
            .await?;
        Ok(users)
    }

    /// Fetch a full user profile. Returns UserNotFound if missing.
    pub async fn find_user_by_id(&self, id: Uuid) -> GalleryResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, location, description, occupation
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => GalleryError::UserNotFound(id),
            other => GalleryError::Sqlx(other),
        })
    }

    /// List a user's photos ordered by upload time ascending.
    ///
    /// The ascending order is a user-facing contract, not incidental.
    pub async fn list_photos_by_user(&self, user_id: Uuid) -> GalleryResult<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, user_id, file_name, date_time FROM photos
             WHERE user_id = ? ORDER BY date_time ASC",
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(photos)
    }

    /// Insert a new photo record owned by `owner_id`. `file_name` must
    /// already have passed upload admission.
    pub async fn create_photo(&self, owner_id: Uuid, file_name: &str) -> GalleryResult<Photo> {
        let photo = Photo {
            id: Uuid::new_v4(),
            user_id: owner_id,
            file_name: file_name.to_string(),
            date_time: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO photos (id, user_id, file_name, date_time) VALUES (?, ?, ?, ?)",
        )
        .bind(photo.id)
        .bind(photo.user_id)
        .bind(&photo.file_name)
        .bind(photo.date_time)
        .execute(&*self.db)
        .await?;

        Ok(photo)
    }

    /// Delete a photo, but only when `requester_id` owns it.
    ///
    /// A nonexistent photo and someone else's photo produce the same
    /// PhotoNotFoundOrForbidden outcome. Comments are left in place; the
    /// thread simply becomes unreachable through the gallery.
    pub async fn delete_photo(&self, photo_id: Uuid, requester_id: Uuid) -> GalleryResult<()> {
        let result = sqlx::query("DELETE FROM photos WHERE id = ? AND user_id = ?")
            .bind(photo_id)
            .bind(requester_id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GalleryError::PhotoNotFoundOrForbidden);
        }
        Ok(())
    }

    /// Fetch a photo's comments in stored order. No re-sorting happens after
    /// this point; only photos carry an explicit ordering.
    pub async fn list_comments_by_photo(&self, photo_id: Uuid) -> GalleryResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, photo_id, user_id, comment, date_time FROM comments WHERE photo_id = ?",
        )
        .bind(photo_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(comments)
    }

    /// Post a comment on a photo. The author is always the session identity,
    /// never client-supplied. Returns the comment already joined to its
    /// author summary.
    pub async fn create_comment(
        &self,
        photo_id: Uuid,
        author_id: Uuid,
        text: &str,
    ) -> GalleryResult<CommentView> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GalleryError::EmptyComment);
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            photo_id,
            user_id: author_id,
            comment: trimmed.to_string(),
            date_time: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO comments (id, photo_id, user_id, comment, date_time)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.id)
        .bind(comment.photo_id)
        .bind(comment.user_id)
        .bind(&comment.comment)
        .bind(comment.date_time)
        .execute(&*self.db)
        .await?;

        self.comment_view(comment).await
    }

    /// Replace a comment's text, but only when `requester_id` authored it.
    /// Validation runs before the ownership lookup so an empty body never
    /// probes existence. Returns the updated comment with its author joined.
    pub async fn edit_comment(
        &self,
        comment_id: Uuid,
        requester_id: Uuid,
        new_text: &str,
    ) -> GalleryResult<CommentView> {
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return Err(GalleryError::EmptyComment);
        }

        let result = sqlx::query("UPDATE comments SET comment = ? WHERE id = ? AND user_id = ?")
            .bind(trimmed)
            .bind(comment_id)
            .bind(requester_id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GalleryError::CommentNotFoundOrForbidden);
        }

        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, photo_id, user_id, comment, date_time FROM comments WHERE id = ?",
        )
        .bind(comment_id)
        .fetch_one(&*self.db)
        .await?;

        self.comment_view(comment).await
    }

    /// Delete a comment, but only when `requester_id` authored it. Same
    /// ownership-opaque outcome as photo deletion.
    pub async fn delete_comment(&self, comment_id: Uuid, requester_id: Uuid) -> GalleryResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ? AND user_id = ?")
            .bind(comment_id)
            .bind(requester_id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GalleryError::CommentNotFoundOrForbidden);
        }
        Ok(())
    }

    /// Assemble a user's gallery: photos sorted ascending by upload time,
    /// each carrying its aggregated comment thread.
    ///
    /// Author lookups are batched: one comment query per photo plus a single
    /// `IN` query over the distinct author ids of the whole gallery, so
    /// store round-trips stay O(photos) rather than O(comments). A comment
    /// whose author record has vanished gets the "Unknown User" sentinel
    /// instead of failing the request.
    pub async fn user_gallery(&self, user_id: Uuid) -> GalleryResult<Vec<PhotoView>> {
        // 404s before any photo access when the user does not exist.
        self.find_user_by_id(user_id).await?;

        let photos = self.list_photos_by_user(user_id).await?;

        let mut threads = Vec::with_capacity(photos.len());
        let mut author_ids = BTreeSet::new();
        for photo in &photos {
            let comments = self.list_comments_by_photo(photo.id).await?;
            author_ids.extend(comments.iter().map(|c| c.user_id));
            threads.push(comments);
        }

        let authors = self.author_summaries(&author_ids).await?;

        Ok(photos
            .into_iter()
            .zip(threads)
            .map(|(photo, comments)| PhotoView {
                photo,
                comments: attach_authors(comments, &authors),
            })
            .collect())
    }

    /// Fetch summaries for a set of author ids in one query.
    async fn author_summaries(
        &self,
        ids: &BTreeSet<Uuid>,
    ) -> GalleryResult<HashMap<Uuid, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, first_name, last_name FROM users WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        builder.push(")");

        let rows: Vec<UserSummary> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows.into_iter().map(|s| (s.id, s)).collect())
    }

    /// Join a single comment to its author summary.
    async fn comment_view(&self, comment: Comment) -> GalleryResult<CommentView> {
        let author_id = comment.user_id;
        let mut ids = BTreeSet::new();
        ids.insert(author_id);
        let authors = self.author_summaries(&ids).await?;
        let user = authors
            .get(&author_id)
            .cloned()
            .unwrap_or_else(|| UserSummary::unknown(author_id));
        Ok(CommentView::new(comment, user))
    }

    /// Reference aggregation strategy: one author fetch per comment. Kept
    /// only as a test oracle proving the batch join yields identical output;
    /// shipped reads always go through [`user_gallery`].
    ///
    /// [`user_gallery`]: GalleryService::user_gallery
    #[cfg(test)]
    pub async fn user_gallery_per_comment(&self, user_id: Uuid) -> GalleryResult<Vec<PhotoView>> {
        self.find_user_by_id(user_id).await?;

        let photos = self.list_photos_by_user(user_id).await?;
        let mut views = Vec::with_capacity(photos.len());
        for photo in photos {
            let comments = self.list_comments_by_photo(photo.id).await?;
            let mut thread = Vec::with_capacity(comments.len());
            for comment in comments {
                thread.push(self.comment_view(comment).await?);
            }
            views.push(PhotoView {
                photo,
                comments: thread,
            });
        }
        Ok(views)
    }
}

/// Substitute each comment's bare author id with a summary from `authors`,
/// falling back to the "Unknown User" sentinel for dangling ids. Preserves
/// the incoming comment order.
fn attach_authors(
    comments: Vec<Comment>,
    authors: &HashMap<Uuid, UserSummary>,
) -> Vec<CommentView> {
    comments
        .into_iter()
        .map(|comment| {
            let user = authors
                .get(&comment.user_id)
                .cloned()
                .unwrap_or_else(|| UserSummary::unknown(comment.user_id));
            CommentView::new(comment, user)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> GalleryService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        for stmt in crate::migration_statements(include_str!("../../migrations/0001_init.sql")) {
            sqlx::query(&stmt).execute(&pool).await.unwrap();
        }

        let upload_dir = std::env::temp_dir().join(format!("photo-share-test-{}", Uuid::new_v4()));
        GalleryService::new(Arc::new(pool), upload_dir)
    }

    async fn seed_user(service: &GalleryService, first: &str, last: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, location, description, occupation)
             VALUES (?, ?, ?, '', '', '')",
        )
        .bind(id)
        .bind(first)
        .bind(last)
        .execute(&*service.db)
        .await
        .unwrap();
        id
    }

    async fn seed_photo_at(
        service: &GalleryService,
        owner: Uuid,
        file_name: &str,
        date_time: DateTime<chrono::Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO photos (id, user_id, file_name, date_time) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(owner)
            .bind(file_name)
            .bind(date_time)
            .execute(&*service.db)
            .await
            .unwrap();
        id
    }

    async fn count_comments(service: &GalleryService) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
            .fetch_one(&*service.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn gallery_sorts_photos_by_upload_time_ascending() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;

        let t = |h| chrono::Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap();
        seed_photo_at(&service, owner, "b.png", t(12)).await;
        seed_photo_at(&service, owner, "a.png", t(8)).await;
        seed_photo_at(&service, owner, "c.png", t(20)).await;

        let gallery = service.user_gallery(owner).await.unwrap();
        let names: Vec<_> = gallery.iter().map(|v| v.photo.file_name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
    }

    #[tokio::test]
    async fn missing_author_becomes_unknown_user_sentinel() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;
        let photo_id = seed_photo_at(&service, owner, "p.png", Utc::now()).await;

        // Author id with no matching user row.
        let ghost = Uuid::new_v4();
        service.create_comment(photo_id, ghost, "still here").await.unwrap();

        let gallery = service.user_gallery(owner).await.unwrap();
        let comment = &gallery[0].comments[0];
        assert_eq!(comment.user, UserSummary::unknown(ghost));
    }

    #[tokio::test]
    async fn batch_and_per_comment_joins_agree() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;
        let fan = seed_user(&service, "Berenice", "Abbott").await;
        let ghost = Uuid::new_v4();

        let t = |h| chrono::Utc.with_ymd_and_hms(2024, 3, 2, h, 0, 0).unwrap();
        let first = seed_photo_at(&service, owner, "one.jpg", t(1)).await;
        let second = seed_photo_at(&service, owner, "two.jpg", t(2)).await;

        service.create_comment(first, fan, "lovely").await.unwrap();
        service.create_comment(first, owner, "thanks").await.unwrap();
        service.create_comment(second, ghost, "who am I").await.unwrap();

        let batched = service.user_gallery(owner).await.unwrap();
        let naive = service.user_gallery_per_comment(owner).await.unwrap();

        assert_eq!(
            serde_json::to_value(&batched).unwrap(),
            serde_json::to_value(&naive).unwrap()
        );
    }

    #[tokio::test]
    async fn foreign_photo_delete_matches_missing_photo() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;
        let intruder = seed_user(&service, "Berenice", "Abbott").await;
        let photo_id = seed_photo_at(&service, owner, "mine.png", Utc::now()).await;

        let foreign = service.delete_photo(photo_id, intruder).await.unwrap_err();
        let missing = service.delete_photo(Uuid::new_v4(), intruder).await.unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());
        assert!(matches!(foreign, GalleryError::PhotoNotFoundOrForbidden));

        // The photo is untouched.
        let gallery = service.user_gallery(owner).await.unwrap();
        assert_eq!(gallery.len(), 1);
    }

    #[tokio::test]
    async fn foreign_comment_edit_and_delete_match_missing_comment() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;
        let author = seed_user(&service, "Berenice", "Abbott").await;
        let photo_id = seed_photo_at(&service, owner, "p.jpg", Utc::now()).await;
        let comment = service.create_comment(photo_id, author, "hello").await.unwrap();

        let foreign_edit = service.edit_comment(comment.id, owner, "hijack").await.unwrap_err();
        let missing_edit = service
            .edit_comment(Uuid::new_v4(), owner, "hijack")
            .await
            .unwrap_err();
        assert_eq!(foreign_edit.to_string(), missing_edit.to_string());

        let foreign_delete = service.delete_comment(comment.id, owner).await.unwrap_err();
        assert!(matches!(
            foreign_delete,
            GalleryError::CommentNotFoundOrForbidden
        ));
        assert_eq!(count_comments(&service).await, 1);
    }

    #[tokio::test]
    async fn whitespace_comment_is_rejected_without_a_row() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;
        let photo_id = seed_photo_at(&service, owner, "p.jpg", Utc::now()).await;

        for text in ["", "   ", "\t\n"] {
            let err = service.create_comment(photo_id, owner, text).await.unwrap_err();
            assert!(matches!(err, GalleryError::EmptyComment));
        }
        assert_eq!(count_comments(&service).await, 0);

        // Same validation on edit, before any ownership lookup.
        let comment = service.create_comment(photo_id, owner, "keep me").await.unwrap();
        let err = service.edit_comment(comment.id, owner, "  ").await.unwrap_err();
        assert!(matches!(err, GalleryError::EmptyComment));
    }

    #[tokio::test]
    async fn comment_text_is_stored_trimmed() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;
        let photo_id = seed_photo_at(&service, owner, "p.jpg", Utc::now()).await;

        let view = service
            .create_comment(photo_id, owner, "  padded  ")
            .await
            .unwrap();
        assert_eq!(view.comment, "padded");
    }

    #[tokio::test]
    async fn owner_can_edit_and_delete_their_comment() {
        let service = test_service().await;
        let owner = seed_user(&service, "Ansel", "Adams").await;
        let photo_id = seed_photo_at(&service, owner, "p.jpg", Utc::now()).await;

        let view = service.create_comment(photo_id, owner, "v1").await.unwrap();
        let edited = service.edit_comment(view.id, owner, "v2").await.unwrap();
        assert_eq!(edited.comment, "v2");
        assert_eq!(edited.user.id, owner);

        service.delete_comment(view.id, owner).await.unwrap();
        assert_eq!(count_comments(&service).await, 0);
    }

    #[tokio::test]
    async fn gallery_for_unknown_user_is_user_not_found() {
        let service = test_service().await;
        let err = service.user_gallery(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GalleryError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn end_to_end_comment_aggregation() {
        let service = test_service().await;
        let alice = seed_user(&service, "Alice", "Archer").await;
        let bob = seed_user(&service, "Bob", "Brandt").await;

        let photo = service.create_photo(alice, "1700000000000-42.png").await.unwrap();
        service.create_comment(photo.id, bob, "nice!").await.unwrap();

        let gallery = service.user_gallery(alice).await.unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].photo.file_name, "1700000000000-42.png");
        assert_eq!(gallery[0].comments.len(), 1);

        let comment = &gallery[0].comments[0];
        assert_eq!(comment.comment, "nice!");
        assert_eq!(comment.user.id, bob);
        assert_eq!(comment.user.first_name, "Bob");
        assert_eq!(comment.user.last_name, "Brandt");
    }

    #[tokio::test]
    async fn user_directory_reads() {
        let service = test_service().await;
        let first = seed_user(&service, "Alice", "Archer").await;
        let second = seed_user(&service, "Bob", "Brandt").await;

        let summaries = service.list_user_summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, first);
        assert_eq!(summaries[1].id, second);

        let details = service.find_user_by_id(first).await.unwrap();
        assert_eq!(details.first_name, "Alice");

        let err = service.find_user_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GalleryError::UserNotFound(_)));
    }
}
