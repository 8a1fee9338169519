use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::api::errors::ApiError;
use crate::api::json::WebJson;
use crate::api::middleware::CurrentUser;
use crate::api::routes::Blueprint;
use crate::app::AppState;
use crate::features::SectionPage;

/// Stored dump directory archive
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DumpDirEntry {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct DumpDirsBody {
    pub entries: Vec<DumpDirEntry>,
}

/// Query parameters for an upload
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub name: String,
}

pub fn blueprint() -> Blueprint {
    Blueprint::new("dumpdirs")
        .route("/", "index", get(index))
        .route("/new", "new", post(upload))
}

/// List stored dump directories
///
/// GET /dumpdirs
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<WebJson<SectionPage<DumpDirsBody>>, ApiError> {
    let entries = list_dumpdirs(&state.config.dumpdir_path).await?;
    Ok(WebJson(SectionPage::new(
        "dumpdirs",
        &current,
        &state.filters,
        DumpDirsBody { entries },
    )?))
}

/// Store an uploaded dump directory archive
///
/// POST /dumpdirs/new?name=<file name>
///
/// Bodies above the configured content length never reach this handler.
pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, WebJson<DumpDirEntry>), ApiError> {
    validate_name(&params.name)?;
    if body.is_empty() {
        return Err(ApiError::bad_request("Empty upload"));
    }

    let dir = &state.config.dumpdir_path;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(&params.name);
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ApiError::new(
                StatusCode::CONFLICT,
                format!("Dump directory already exists: {}", params.name),
            ),
            _ => ApiError::from(e),
        })?;
    file.write_all(&body).await?;
    file.flush().await?;

    tracing::info!(name = %params.name, size = body.len(), "Stored dump directory");

    Ok((
        StatusCode::CREATED,
        WebJson(DumpDirEntry {
            name: params.name,
            size: body.len() as u64,
            modified: Some(Utc::now()),
        }),
    ))
}

/// Entries of the dump directory spool, sorted by name
///
/// A spool directory that does not exist yet is treated as empty.
pub async fn list_dumpdirs(dir: &Path) -> Result<Vec<DumpDirEntry>, std::io::Error> {
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Dump directory spool {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        entries.push(DumpDirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("Invalid dump directory name: {:?}", name)))
    }
}
