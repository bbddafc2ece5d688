use std::env;
use std::path::PathBuf;
use url::Url;

use crate::error::LogError;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const SNAPSHOT_URL_VAR: &str = "LIFTLOG_SNAPSHOT_URL";
pub const SNAPSHOT_PATH_VAR: &str = "LIFTLOG_SNAPSHOT_PATH";
pub const UPLOAD_URL_VAR: &str = "LIFTLOG_UPLOAD_URL";
pub const CACHE_DIR_VAR: &str = "LIFTLOG_CACHE_DIR";
pub const LANGUAGE_VAR: &str = "LIFTLOG_LANGUAGE";

const DEFAULT_LANGUAGE: &str = "en";

/// Where the snapshot bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSource {
  /// A backup file already on disk
  Path(PathBuf),
  /// The blob fetch endpoint
  Url(Url),
}

#[derive(Debug, Clone)]
pub struct Config {
  pub source: SnapshotSource,
  pub upload_url: Option<Url>,
  /// Fetched snapshots are materialized here before opening
  pub cache_dir: PathBuf,
  pub language: String,
}

impl Config {
  /// Build from `LIFTLOG_*` environment variables. A local path wins over a URL.
  pub fn from_env() -> Result<Self, LogError> {
    let source = match (env::var(SNAPSHOT_PATH_VAR).ok(), env::var(SNAPSHOT_URL_VAR).ok()) {
      (Some(path), _) if !path.trim().is_empty() => SnapshotSource::Path(PathBuf::from(path)),
      (_, Some(url)) if !url.trim().is_empty() => SnapshotSource::Url(parse_url(SNAPSHOT_URL_VAR, &url)?),
      _ => {
        return Err(LogError::Config(format!(
          "{} or {}",
          SNAPSHOT_PATH_VAR, SNAPSHOT_URL_VAR
        )))
      }
    };

    let upload_url = match env::var(UPLOAD_URL_VAR) {
      Ok(url) if !url.trim().is_empty() => Some(parse_url(UPLOAD_URL_VAR, &url)?),
      _ => None,
    };

    let cache_dir = env::var(CACHE_DIR_VAR)
      .ok()
      .filter(|d| !d.trim().is_empty())
      .map(PathBuf::from)
      .unwrap_or_else(env::temp_dir);

    let language = env::var(LANGUAGE_VAR)
      .ok()
      .map(|l| l.trim().to_lowercase())
      .filter(|l| !l.is_empty())
      .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    Ok(Self {
      source,
      upload_url,
      cache_dir,
      language,
    })
  }

  /// Config for a snapshot already on disk, with defaults for everything else
  pub fn for_path(path: impl Into<PathBuf>) -> Self {
    Self {
      source: SnapshotSource::Path(path.into()),
      upload_url: None,
      cache_dir: env::temp_dir(),
      language: DEFAULT_LANGUAGE.to_string(),
    }
  }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, LogError> {
  Url::parse(raw.trim()).map_err(|e| LogError::Config(format!("{} is not a valid URL: {}", var, e)))
}
