//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - On-disk FitNotes-shaped snapshots
//! - Seeding helpers for sets, exercises and comments
//! - Mock data factories

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::TrainingSet;

static TEST_DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// ---------------------------------------------------------------------------
/// Snapshot Test Utilities
/// ---------------------------------------------------------------------------

/// The subset of the FitNotes schema the reader consumes
const FITNOTES_SCHEMA: [&str; 4] = [
  r#"
  CREATE TABLE exercise (
    _id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    category_id INTEGER,
    notes TEXT
  )
  "#,
  r#"
  CREATE TABLE training_log (
    _id INTEGER PRIMARY KEY,
    exercise_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    metric_weight REAL NOT NULL,
    reps INTEGER NOT NULL
  )
  "#,
  r#"
  CREATE TABLE Comment (
    _id INTEGER PRIMARY KEY,
    date TEXT,
    owner_type_id INTEGER,
    owner_id INTEGER,
    comment TEXT
  )
  "#,
  r#"
  CREATE TABLE WorkoutComment (
    _id INTEGER PRIMARY KEY,
    date TEXT,
    comment TEXT
  )
  "#,
];

/// A writable SQLite file standing in for a FitNotes backup
///
/// Uses max_connections(1) and rollback journaling so every write lands in the
/// main file, where a read-only session pool can see it
pub struct TestSnapshot {
  pub pool: SqlitePool,
  path: PathBuf,
}

impl TestSnapshot {
  /// Fresh file with the FitNotes tables
  pub async fn create() -> Self {
    let snapshot = Self::create_bare().await;
    snapshot.apply_schema().await;
    snapshot
  }

  /// Fresh file at a fixed path with the FitNotes tables
  pub async fn create_at(path: &Path) -> Self {
    let snapshot = Self::connect(path.to_path_buf()).await;
    snapshot.apply_schema().await;
    snapshot
  }

  /// Fresh file with no tables at all
  pub async fn create_bare() -> Self {
    let n = TEST_DB_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
      "liftlog-test-{}-{}.fitnotes",
      std::process::id(),
      n
    ));
    Self::connect(path).await
  }

  async fn connect(path: PathBuf) -> Self {
    let _ = std::fs::remove_file(&path);

    let options = SqliteConnectOptions::new()
      .filename(&path)
      .create_if_missing(true)
      .journal_mode(SqliteJournalMode::Delete);

    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect_with(options)
      .await
      .expect("Failed to create test snapshot");

    Self { pool, path }
  }

  async fn apply_schema(&self) {
    for statement in FITNOTES_SCHEMA {
      sqlx::query(statement)
        .execute(&self.pool)
        .await
        .expect("Failed to create FitNotes schema");
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Current file contents, as the fetch endpoint would serve them
  pub async fn bytes(&self) -> Vec<u8> {
    tokio::fs::read(&self.path)
      .await
      .expect("Failed to read test snapshot")
  }

  /// Close the pool and delete the file
  pub async fn teardown(self) {
    self.pool.close().await;
    let _ = std::fs::remove_file(&self.path);
  }
}

pub async fn seed_exercise(pool: &SqlitePool, id: i64, name: &str, notes: Option<&str>) {
  sqlx::query("INSERT INTO exercise (_id, name, category_id, notes) VALUES (?1, ?2, 1, ?3)")
    .bind(id)
    .bind(name)
    .bind(notes)
    .execute(pool)
    .await
    .expect("Failed to seed exercise");
}

pub async fn seed_set(pool: &SqlitePool, id: i64, exercise_id: i64, date: &str, reps: i64, weight: f64) {
  sqlx::query(
    r#"
    INSERT INTO training_log (_id, exercise_id, date, metric_weight, reps)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
  )
  .bind(id)
  .bind(exercise_id)
  .bind(date)
  .bind(weight)
  .bind(reps)
  .execute(pool)
  .await
  .expect("Failed to seed training set");
}

pub async fn seed_comment(pool: &SqlitePool, owner_id: i64, comment: &str) {
  sqlx::query("INSERT INTO Comment (owner_type_id, owner_id, comment) VALUES (1, ?1, ?2)")
    .bind(owner_id)
    .bind(comment)
    .execute(pool)
    .await
    .expect("Failed to seed comment");
}

pub async fn seed_workout_comment(pool: &SqlitePool, date: &str, comment: &str) {
  sqlx::query("INSERT INTO WorkoutComment (date, comment) VALUES (?1, ?2)")
    .bind(date)
    .bind(comment)
    .execute(pool)
    .await
    .expect("Failed to seed workout comment");
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid test date")
}

/// A set with no comment
pub fn mock_set(sequence: i64, day: &str, exercise_id: i64, reps: i64, weight: f64) -> TrainingSet {
  TrainingSet {
    date: date(day),
    exercise_id,
    reps,
    weight,
    comment: None,
    sequence,
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_create_builds_schema() {
    let snapshot = TestSnapshot::create().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('exercise', 'training_log', 'Comment', 'WorkoutComment')"
    )
    .fetch_all(&snapshot.pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4);

    snapshot.teardown().await;
  }

  #[tokio::test]
  async fn test_snapshot_bytes_are_sqlite() {
    let snapshot = TestSnapshot::create().await;
    seed_set(&snapshot.pool, 1, 1, "2024-01-01", 5, 100.0).await;

    let bytes = snapshot.bytes().await;
    assert!(bytes.starts_with(crate::snapshot::SQLITE_HEADER));

    let path = snapshot.path().to_path_buf();
    snapshot.teardown().await;
    assert!(!path.exists());
  }

  #[test]
  fn test_mock_set_factory() {
    let set = mock_set(7, "2024-05-01", 3, 8, 62.5);
    assert_eq!(set.date, date("2024-05-01"));
    assert_eq!(set.sequence, 7);
    assert_eq!(set.comment, None);
  }
}
