//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks DB connectivity and upload-dir I/O

use crate::services::gallery_service::GalleryService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tokio::fs;
use uuid::Uuid;

/// `GET /healthz`
///
/// Liveness probe — always 200 OK, never performs I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(CheckStatus {
            ok: true,
            error: None,
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe: a `SELECT 1` against SQLite plus a write/read/delete
/// round-trip in the upload directory. 200 when both pass, 503 otherwise.
pub async fn readyz(State(service): State<GalleryService>) -> impl IntoResponse {
    let sqlite = sqlite_check(&service).await;
    let disk = upload_dir_check(&service).await;

    let ok = sqlite.ok && disk.ok;
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadyResponse { ok, sqlite, disk }))
}

async fn sqlite_check(service: &GalleryService) -> CheckStatus {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*service.db)
        .await
    {
        Ok(1) => CheckStatus::ok(),
        Ok(other) => CheckStatus::failed(format!("unexpected result: {}", other)),
        Err(err) => CheckStatus::failed(err.to_string()),
    }
}

/// Best-effort probe that the upload directory is writable. Uses a throwaway
/// file name so concurrent probes never collide.
async fn upload_dir_check(service: &GalleryService) -> CheckStatus {
    let probe = service
        .upload_dir
        .join(format!(".readyz-{}", Uuid::new_v4()));

    let outcome = async {
        fs::write(&probe, b"readyz").await?;
        let bytes = fs::read(&probe).await?;
        if bytes != b"readyz" {
            return Err(std::io::Error::other("probe content mismatch"));
        }
        fs::remove_file(&probe).await
    }
    .await;

    match outcome {
        Ok(()) => CheckStatus::ok(),
        Err(err) => {
            let _ = fs::remove_file(&probe).await;
            CheckStatus::failed(err.to_string())
        }
    }
}

#[derive(Serialize)]
struct ReadyResponse {
    ok: bool,
    sqlite: CheckStatus,
    disk: CheckStatus,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }
}
