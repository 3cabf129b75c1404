//! Upload admission: validates an inbound image (declared type, size) and
//! assigns it a collision-resistant stored name before any photo record
//! exists. Disk I/O for the admitted payload also lives here; everything
//! else about the upload (multipart parsing, response shaping) belongs to
//! the handler layer.

use crate::models::photo::Photo;
use crate::services::gallery_service::{GalleryError, GalleryResult, GalleryService};
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use tokio::fs;
use uuid::Uuid;

/// MIME types accepted for upload. Everything else is rejected before any
/// bytes touch the disk.
pub const ACCEPTED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/jpg"];

/// Maximum accepted payload size: 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// An upload candidate as pulled from the multipart field.
#[derive(Debug)]
pub struct UploadCandidate {
    /// Declared MIME type, if the client sent one.
    pub content_type: Option<String>,
    /// Original file name, used only for its extension.
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Validate a candidate and assign its stored name.
///
/// Checks run size first so an oversize file is reported as "too large"
/// regardless of its declared type. On acceptance the returned name is
/// `<epoch-millis>-<random-u32><ext>`; uniqueness comes from the
/// timestamp/random composition, never from coordinating with existing
/// entries.
pub fn admit(candidate: &UploadCandidate) -> GalleryResult<String> {
    if candidate.data.len() > MAX_UPLOAD_BYTES {
        return Err(GalleryError::FileTooLarge);
    }

    let declared = candidate.content_type.as_deref().unwrap_or("");
    if !ACCEPTED_TYPES.contains(&declared) {
        return Err(GalleryError::InvalidFileType);
    }

    let ext = extension_for(candidate.file_name.as_deref(), declared);
    let suffix: u32 = rand::thread_rng().r#gen();
    Ok(format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, ext))
}

/// Extension for the stored name: taken from the original file name when
/// present, otherwise derived from the declared MIME type.
fn extension_for(file_name: Option<&str>, content_type: &str) -> String {
    if let Some(name) = file_name {
        if let Some((_, ext)) = name.rsplit_once('.') {
            if !ext.is_empty() {
                return format!(".{}", ext.to_ascii_lowercase());
            }
        }
    }
    match content_type {
        "image/png" => ".png".into(),
        "image/gif" => ".gif".into(),
        _ => ".jpg".into(),
    }
}

impl GalleryService {
    /// Admit an uploaded image, persist its payload, and create the owning
    /// photo record.
    ///
    /// The upload directory is created if absent and the file is fully
    /// written before the record insert. If the insert then fails the file
    /// stays behind as an orphan; the failure is logged and surfaced,
    /// with no compensating delete.
    pub async fn upload_photo(
        &self,
        owner_id: Uuid,
        candidate: UploadCandidate,
    ) -> GalleryResult<Photo> {
        let stored_name = admit(&candidate)?;

        fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(&stored_name);
        fs::write(&path, &candidate.data).await?;
        tracing::debug!("stored upload at {}", path.display());

        match self.create_photo(owner_id, &stored_name).await {
            Ok(photo) => Ok(photo),
            Err(err) => {
                tracing::warn!(
                    "photo record creation failed after writing {}; file left in place: {}",
                    path.display(),
                    err
                );
                Err(err)
            }
        }
    }
}
