//! Snapshot session: one loaded training log plus its derived indexes
//!
//! A `Session` is constructed explicitly and owned by the caller. The first
//! `load()` drives the fetch and index build; concurrent callers attach to the
//! same in-flight load instead of starting their own.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{info, warn};

use crate::catalog::ExerciseCatalog;
use crate::chart::{build_chart_series, ChartPoint, ChartWindow};
use crate::config::Config;
use crate::error::LogError;
use crate::index::{build_date_index, build_exercise_index, DateIndex, ExerciseHistory, ExerciseIndex};
use crate::models::{TableData, TableSchema};
use crate::reader;
use crate::records::{compute_rep_maxes, RepMaxEntry};
use crate::snapshot::SnapshotFile;

/// ---------------------------------------------------------------------------
/// Loaded Log
/// ---------------------------------------------------------------------------

/// Everything derived from one snapshot. Immutable once built.
#[derive(Debug)]
pub struct LoadedLog {
  pub date_index: DateIndex,
  pub exercise_index: ExerciseIndex,
  pub catalog: ExerciseCatalog,
  pub workout_comments: BTreeMap<NaiveDate, String>,
  /// Build steps that failed and degraded to empty data
  pub issues: Vec<String>,
  pub loaded_at: DateTime<Utc>,
  pool: SqlitePool,
  // Declared after the pool so connections drop before the file is removed
  file: SnapshotFile,
}

impl LoadedLog {
  /// Open the snapshot read-only and build every index from it.
  ///
  /// Only failing to open the file is an error; a failing query empties the
  /// structure it feeds and is recorded in `issues`.
  pub async fn open(file: SnapshotFile) -> Result<Self, LogError> {
    let pool = file.open_pool().await?;
    let mut issues = Vec::new();

    let sets = degrade("training log", reader::read_training_sets(&pool).await, &mut issues);
    let date_index = build_date_index(&sets);
    let exercise_index = build_exercise_index(&sets);

    let exercises = degrade("exercise catalog", reader::read_exercises(&pool).await, &mut issues);
    let catalog = ExerciseCatalog::from_rows(&exercises);

    let workout_comments = degrade(
      "workout comments",
      reader::read_workout_comments(&pool).await,
      &mut issues,
    );

    info!(
      "Loaded {} sets over {} days, {} exercises from {}",
      sets.len(),
      date_index.len(),
      exercise_index.len(),
      file.path().display()
    );

    Ok(Self {
      date_index,
      exercise_index,
      catalog,
      workout_comments,
      issues,
      loaded_at: Utc::now(),
      pool,
      file,
    })
  }

  pub fn snapshot_path(&self) -> &Path {
    self.file.path()
  }

  pub fn has_issues(&self) -> bool {
    !self.issues.is_empty()
  }

  pub fn exercise_history(&self, exercise_id: i64) -> Option<&ExerciseHistory> {
    self.exercise_index.history(exercise_id)
  }

  /// Rep-max curve; empty when the exercise has no sets
  pub fn rep_maxes(&self, exercise_id: i64) -> Vec<RepMaxEntry> {
    self
      .exercise_history(exercise_id)
      .map(compute_rep_maxes)
      .unwrap_or_default()
  }

  pub fn chart_series(&self, exercise_id: i64, window: ChartWindow, today: NaiveDate) -> Vec<ChartPoint> {
    self
      .exercise_history(exercise_id)
      .map(|history| build_chart_series(history, window, today))
      .unwrap_or_default()
  }

  pub fn display_name(&self, exercise_id: i64, language: &str) -> String {
    self.catalog.display_name(exercise_id, language)
  }

  pub fn workout_comment(&self, date: NaiveDate) -> Option<&str> {
    self.workout_comments.get(&date).map(String::as_str)
  }

  /// Tables present in the snapshot
  pub async fn table_names(&self) -> Result<Vec<String>, LogError> {
    reader::read_table_names(&self.pool).await
  }

  /// Column layout of every table, in table-name order
  pub async fn table_schemas(&self) -> Result<Vec<TableSchema>, LogError> {
    let mut schemas = Vec::new();
    for name in reader::read_table_names(&self.pool).await? {
      let columns = reader::read_table_schema(&self.pool, &name).await?;
      schemas.push(TableSchema { name, columns });
    }
    Ok(schemas)
  }

  /// Contents of one table; an unknown table or a failing query reads as empty
  pub async fn table_rows(&self, table: &str) -> TableData {
    match reader::read_table_rows(&self.pool, table).await {
      Ok(data) => data,
      Err(e) => {
        warn!("Failed to read table {}: {}", table, e);
        TableData::default()
      }
    }
  }

  async fn close(&self) {
    self.pool.close().await;
  }
}

fn degrade<T: Default>(step: &str, result: Result<T, LogError>, issues: &mut Vec<String>) -> T {
  match result {
    Ok(value) => value,
    Err(e) => {
      warn!("Failed to read {}: {}", step, e);
      issues.push(format!("Failed to read {}: {}", step, e));
      T::default()
    }
  }
}

/// ---------------------------------------------------------------------------
/// Session
/// ---------------------------------------------------------------------------

type LoadCell = Arc<OnceCell<Arc<LoadedLog>>>;

#[derive(Debug)]
enum SessionState {
  Open(LoadCell),
  Closed,
}

#[derive(Debug)]
pub struct Session {
  config: Config,
  state: RwLock<SessionState>,
}

impl Session {
  /// A new open session; nothing is loaded until `load()`
  pub fn open(config: Config) -> Self {
    Self {
      config,
      state: RwLock::new(SessionState::Open(Arc::new(OnceCell::new()))),
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// The loaded log, loading it first if needed.
  ///
  /// A failed load leaves nothing cached, so the next call tries again.
  pub async fn load(&self) -> Result<Arc<LoadedLog>, LogError> {
    let cell = self.cell().await?;
    let log = self.load_into(&cell).await?;

    // close() may have run while the load was in flight
    if self.is_closed().await {
      log.close().await;
      return Err(LogError::Closed);
    }
    Ok(log)
  }

  /// Load the snapshot again and swap the result in. Until the swap,
  /// `current()` keeps returning the previous log, and callers still holding
  /// it keep a consistent view afterwards.
  pub async fn reload(&self) -> Result<Arc<LoadedLog>, LogError> {
    self.cell().await?;
    info!("Reloading snapshot");

    let cell: LoadCell = Arc::new(OnceCell::new());
    let log = self.load_into(&cell).await?;

    let mut state = self.state.write().await;
    match &*state {
      SessionState::Closed => {
        log.close().await;
        Err(LogError::Closed)
      }
      SessionState::Open(_) => {
        *state = SessionState::Open(cell);
        info!("Reloaded snapshot from {}", log.snapshot_path().display());
        Ok(log)
      }
    }
  }

  /// The log if it has finished loading; `None` while not loaded or loading
  pub async fn current(&self) -> Option<Arc<LoadedLog>> {
    match &*self.state.read().await {
      SessionState::Open(cell) => cell.get().cloned(),
      SessionState::Closed => None,
    }
  }

  pub async fn is_closed(&self) -> bool {
    matches!(&*self.state.read().await, SessionState::Closed)
  }

  /// Close the session and its snapshot pool. Further loads fail with `Closed`.
  pub async fn close(&self) {
    let previous = {
      let mut state = self.state.write().await;
      std::mem::replace(&mut *state, SessionState::Closed)
    };
    if let SessionState::Open(cell) = previous {
      if let Some(log) = cell.get() {
        log.close().await;
      }
    }
    info!("Session closed");
  }

  async fn cell(&self) -> Result<LoadCell, LogError> {
    match &*self.state.read().await {
      SessionState::Open(cell) => Ok(cell.clone()),
      SessionState::Closed => Err(LogError::Closed),
    }
  }

  async fn load_into(&self, cell: &LoadCell) -> Result<Arc<LoadedLog>, LogError> {
    let log = cell
      .get_or_try_init(|| async {
        let file = SnapshotFile::acquire(&self.config.source, &self.config.cache_dir).await?;
        LoadedLog::open(file).await.map(Arc::new)
      })
      .await?;
    Ok(log.clone())
  }
}
