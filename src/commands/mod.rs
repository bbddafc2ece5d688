pub mod history;
pub mod log;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{TableData, TableSchema};
use crate::session::Session;
use crate::snapshot;

/// What the presentation layer needs to tell "loading" from "no data" from
/// "loaded with problems"
#[derive(Debug, Clone, Serialize)]
pub struct LoadStatus {
  pub loaded: bool,
  pub loaded_at: Option<DateTime<Utc>>,
  pub days: usize,
  pub exercises: usize,
  pub issues: Vec<String>,
}

impl LoadStatus {
  fn not_loaded() -> Self {
    Self {
      loaded: false,
      loaded_at: None,
      days: 0,
      exercises: 0,
      issues: Vec::new(),
    }
  }
}

pub async fn get_load_status(session: &Session) -> LoadStatus {
  match session.current().await {
    Some(log) => LoadStatus {
      loaded: true,
      loaded_at: Some(log.loaded_at),
      days: log.date_index.len(),
      exercises: log.exercise_index.len(),
      issues: log.issues.clone(),
    },
    None => LoadStatus::not_loaded(),
  }
}

pub async fn load_snapshot(session: &Session) -> Result<LoadStatus, String> {
  session
    .load()
    .await
    .map_err(|e| format!("Failed to load snapshot: {}", e))?;
  Ok(get_load_status(session).await)
}

pub async fn reload_snapshot(session: &Session) -> Result<LoadStatus, String> {
  session
    .reload()
    .await
    .map_err(|e| format!("Failed to reload snapshot: {}", e))?;
  Ok(get_load_status(session).await)
}

/// Send a new backup file to the upload endpoint. The running session keeps
/// its current data until reloaded.
pub async fn upload_snapshot(session: &Session, bytes: Vec<u8>) -> Result<(), String> {
  let url = session
    .config()
    .upload_url
    .as_ref()
    .ok_or_else(|| "No upload endpoint configured".to_string())?;

  snapshot::upload_snapshot(url, bytes)
    .await
    .map_err(|e| format!("Failed to upload snapshot: {}", e))
}

pub async fn get_table_names(session: &Session) -> Result<Vec<String>, String> {
  let log = session
    .load()
    .await
    .map_err(|e| format!("Failed to load snapshot: {}", e))?;
  log
    .table_names()
    .await
    .map_err(|e| format!("Failed to list tables: {}", e))
}

pub async fn get_table_schemas(session: &Session) -> Result<Vec<TableSchema>, String> {
  let log = session
    .load()
    .await
    .map_err(|e| format!("Failed to load snapshot: {}", e))?;
  log
    .table_schemas()
    .await
    .map_err(|e| format!("Failed to read table schemas: {}", e))
}

/// Raw rows of one table; empty when the table is unknown or unreadable
pub async fn get_table_rows(session: &Session, table: &str) -> Result<TableData, String> {
  let log = session
    .load()
    .await
    .map_err(|e| format!("Failed to load snapshot: {}", e))?;
  Ok(log.table_rows(table).await)
}
