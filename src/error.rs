use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LogError {
  #[error("Missing configuration: {0}")]
  Config(String),

  #[error("Snapshot not found at {0}")]
  SnapshotNotFound(String),

  #[error("Snapshot source unavailable (HTTP {status}): {body}")]
  SourceUnavailable { status: u16, body: String },

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Snapshot upload failed: {0}")]
  UploadFailed(String),

  #[error("Not a SQLite snapshot: {0}")]
  InvalidSnapshot(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Session is closed")]
  Closed,
}

impl Serialize for LogError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}
