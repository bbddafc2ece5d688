use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SnapshotSource;
use crate::error::LogError;

/// ---------------------------------------------------------------------------
/// Snapshot Constants
/// ---------------------------------------------------------------------------

/// Every SQLite database file starts with these 16 bytes
pub const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Name the upload endpoint stores the backup under
pub const UPLOAD_BLOB_NAME: &str = "FitNotes_Backup.fitnotes";

const MAX_CONNECTIONS: u32 = 5;

static SNAPSHOT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// ---------------------------------------------------------------------------
/// Blob Endpoint Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UploadResponse {
  success: Option<bool>,
  error: Option<String>,
}

/// Download the raw snapshot bytes from the blob fetch endpoint
pub async fn fetch_snapshot(url: &Url) -> Result<Vec<u8>, LogError> {
  let client = Client::new();

  info!("Fetching snapshot from {}", url);
  let response = client.get(url.clone()).send().await?;

  let status = response.status();
  if status == StatusCode::NOT_FOUND {
    return Err(LogError::SnapshotNotFound(url.to_string()));
  }
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(LogError::SourceUnavailable {
      status: status.as_u16(),
      body,
    });
  }

  let bytes = response.bytes().await?;
  debug!("Fetched {} snapshot bytes", bytes.len());
  Ok(bytes.to_vec())
}

/// Replace the stored snapshot through the blob upload endpoint
pub async fn upload_snapshot(url: &Url, bytes: Vec<u8>) -> Result<(), LogError> {
  validate_snapshot(&bytes)?;

  let size = bytes.len();
  let part = Part::bytes(bytes)
    .file_name(UPLOAD_BLOB_NAME)
    .mime_str("application/octet-stream")?;
  let form = Form::new().part("file", part);

  let client = Client::new();
  let response = client.post(url.clone()).multipart(form).send().await?;

  let status = response.status();
  let body = response.text().await.unwrap_or_default();
  let parsed: Option<UploadResponse> = serde_json::from_str(&body).ok();

  if !status.is_success() {
    let message = parsed
      .and_then(|r| r.error)
      .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
    return Err(LogError::UploadFailed(message));
  }

  match parsed {
    Some(UploadResponse { success: Some(true), .. }) => {
      info!("Uploaded snapshot ({} bytes) to {}", size, url);
      Ok(())
    }
    Some(UploadResponse { error: Some(error), .. }) => Err(LogError::UploadFailed(error)),
    _ => Err(LogError::UploadFailed(format!("Unexpected response: {}", body))),
  }
}

/// Reject anything that is not a SQLite database file
pub fn validate_snapshot(bytes: &[u8]) -> Result<(), LogError> {
  if bytes.starts_with(SQLITE_HEADER) {
    Ok(())
  } else {
    Err(LogError::InvalidSnapshot(format!(
      "missing SQLite header ({} bytes)",
      bytes.len()
    )))
  }
}

/// ---------------------------------------------------------------------------
/// Snapshot Files
/// ---------------------------------------------------------------------------

/// A snapshot on disk. Files materialized from fetched bytes are removed on drop.
#[derive(Debug)]
pub struct SnapshotFile {
  path: PathBuf,
  owned: bool,
}

impl SnapshotFile {
  /// Write fetched bytes into `cache_dir` under a fresh name
  pub async fn materialize(cache_dir: &Path, bytes: &[u8]) -> Result<Self, LogError> {
    validate_snapshot(bytes)?;
    tokio::fs::create_dir_all(cache_dir).await?;

    let n = SNAPSHOT_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = cache_dir.join(format!("liftlog-{}-{}.fitnotes", std::process::id(), n));
    tokio::fs::write(&path, bytes).await?;

    debug!("Materialized snapshot at {}", path.display());
    Ok(Self { path, owned: true })
  }

  /// Use a backup file in place. Only the header is read to validate it.
  pub async fn existing(path: &Path) -> Result<Self, LogError> {
    let mut file = match tokio::fs::File::open(path).await {
      Ok(file) => file,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(LogError::SnapshotNotFound(path.display().to_string()))
      }
      Err(e) => return Err(e.into()),
    };

    let mut header = [0u8; SQLITE_HEADER.len()];
    match file.read_exact(&mut header).await {
      Ok(_) => validate_snapshot(&header)?,
      Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
        return Err(LogError::InvalidSnapshot(format!(
          "{} is shorter than a SQLite header",
          path.display()
        )))
      }
      Err(e) => return Err(e.into()),
    }

    Ok(Self {
      path: path.to_path_buf(),
      owned: false,
    })
  }

  /// Resolve a configured source to a file on disk
  pub async fn acquire(source: &SnapshotSource, cache_dir: &Path) -> Result<Self, LogError> {
    match source {
      SnapshotSource::Path(path) => Self::existing(path).await,
      SnapshotSource::Url(url) => {
        let bytes = fetch_snapshot(url).await?;
        Self::materialize(cache_dir, &bytes).await
      }
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Open a read-only connection pool over the file
  pub async fn open_pool(&self) -> Result<SqlitePool, LogError> {
    let options = SqliteConnectOptions::new()
      .filename(&self.path)
      .read_only(true);

    let pool = SqlitePoolOptions::new()
      .max_connections(MAX_CONNECTIONS)
      .connect_with(options)
      .await?;

    Ok(pool)
  }
}

impl Drop for SnapshotFile {
  fn drop(&mut self) {
    if self.owned {
      if let Err(e) = std::fs::remove_file(&self.path) {
        warn!("Failed to remove snapshot {}: {}", self.path.display(), e);
      }
    }
  }
}
