//! Read-only queries against a loaded FitNotes snapshot

use chrono::NaiveDate;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use std::collections::BTreeMap;

use crate::error::LogError;
use crate::models::{ExerciseRow, TableColumn, TableData, TrainingSet, WorkoutCommentRow};

/// Every logged set with its per-set comment, ordered by `(date, _id)`.
///
/// Only the first comment row per set is used. Sets whose `exercise_id` has no
/// `exercise` row still come through; names are resolved by the catalog.
pub async fn read_training_sets(pool: &SqlitePool) -> Result<Vec<TrainingSet>, LogError> {
  let sets = sqlx::query_as::<_, TrainingSet>(
    r#"
    SELECT
      t.date AS date,
      t.exercise_id AS exercise_id,
      CAST(t.reps AS INTEGER) AS reps,
      CAST(t.metric_weight AS REAL) AS weight,
      (SELECT c.comment FROM Comment c WHERE c.owner_id = t._id ORDER BY c._id LIMIT 1) AS comment,
      t._id AS sequence
    FROM training_log t
    ORDER BY t.date ASC, t._id ASC
    "#,
  )
  .fetch_all(pool)
  .await?;

  Ok(sets)
}

/// All exercise metadata rows, in id order
pub async fn read_exercises(pool: &SqlitePool) -> Result<Vec<ExerciseRow>, LogError> {
  let rows = sqlx::query_as::<_, ExerciseRow>(
    "SELECT _id AS id, name, notes FROM exercise ORDER BY _id",
  )
  .fetch_all(pool)
  .await?;

  Ok(rows)
}

/// Whole-workout comments keyed by date; a later row for the same date wins
pub async fn read_workout_comments(
  pool: &SqlitePool,
) -> Result<BTreeMap<NaiveDate, String>, LogError> {
  let rows = sqlx::query_as::<_, WorkoutCommentRow>(
    "SELECT date, comment FROM WorkoutComment ORDER BY date ASC",
  )
  .fetch_all(pool)
  .await?;

  let mut comments = BTreeMap::new();
  for row in rows {
    let (Some(date), Some(comment)) = (row.date, row.comment) else {
      continue;
    };
    if comment.is_empty() {
      continue;
    }
    if let Ok(date) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
      comments.insert(date, comment);
    }
  }

  Ok(comments)
}

/// Names of all tables in the snapshot
pub async fn read_table_names(pool: &SqlitePool) -> Result<Vec<String>, LogError> {
  let names: Vec<String> =
    sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
      .fetch_all(pool)
      .await?;

  Ok(names)
}

/// Column layout of `table`; empty for an unknown table
pub async fn read_table_schema(pool: &SqlitePool, table: &str) -> Result<Vec<TableColumn>, LogError> {
  let sql = format!("PRAGMA table_info({})", quote_identifier(table));
  let rows = sqlx::query(&sql).fetch_all(pool).await?;

  rows
    .iter()
    .map(|row| -> Result<TableColumn, LogError> {
      Ok(TableColumn {
        name: row.try_get("name")?,
        column_type: row.try_get("type")?,
        not_null: row.try_get::<i64, _>("notnull")? != 0,
        default_value: row.try_get_unchecked("dflt_value")?,
        primary_key: row.try_get::<i64, _>("pk")? > 0,
      })
    })
    .collect()
}

/// Every row of `table` as JSON values, in storage order
pub async fn read_table_rows(pool: &SqlitePool, table: &str) -> Result<TableData, LogError> {
  let sql = format!("SELECT * FROM {}", quote_identifier(table));
  let rows = sqlx::query(&sql).fetch_all(pool).await?;

  let columns: Vec<String> = rows
    .first()
    .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
    .unwrap_or_default();

  let rows = rows
    .iter()
    .map(|row| {
      (0..row.len())
        .map(|i| cell_value(row, i))
        .collect::<Result<Vec<Value>, LogError>>()
    })
    .collect::<Result<Vec<Vec<Value>>, LogError>>()?;

  Ok(TableData { columns, rows })
}

fn quote_identifier(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}

/// Decode by the stored value's type, not the declared column type
fn cell_value(row: &SqliteRow, index: usize) -> Result<Value, LogError> {
  let raw = row.try_get_raw(index)?;
  if raw.is_null() {
    return Ok(Value::Null);
  }

  let value = match raw.type_info().name() {
    "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
    "REAL" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
    "BLOB" => Value::from(row.try_get_unchecked::<Vec<u8>, _>(index)?),
    _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
  };
  Ok(value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{
    date, seed_comment, seed_exercise, seed_set, seed_workout_comment, TestSnapshot,
  };
  use serde_json::json;

  #[tokio::test]
  async fn test_sets_ordered_by_date_then_sequence() {
    let snapshot = TestSnapshot::create().await;
    let pool = &snapshot.pool;
    seed_exercise(pool, 1, "bench press", None).await;
    seed_exercise(pool, 2, "squat", None).await;

    // Inserted out of date order on purpose
    seed_set(pool, 10, 1, "2024-02-01", 5, 100.0).await;
    seed_set(pool, 11, 2, "2024-01-01", 5, 140.0).await;
    seed_set(pool, 12, 1, "2024-01-01", 3, 110.0).await;

    let sets = read_training_sets(pool).await.expect("Should read sets");

    let keys: Vec<(NaiveDate, i64)> = sets.iter().map(|s| (s.date, s.sequence)).collect();
    assert_eq!(
      keys,
      vec![
        (date("2024-01-01"), 11),
        (date("2024-01-01"), 12),
        (date("2024-02-01"), 10),
      ]
    );
    assert_eq!(sets[1].weight, 110.0);
    assert_eq!(sets[1].reps, 3);

    snapshot.teardown().await;
  }

  #[tokio::test]
  async fn test_missing_comment_and_orphaned_exercise() {
    let snapshot = TestSnapshot::create().await;
    let pool = &snapshot.pool;
    seed_exercise(pool, 1, "deadlift", None).await;
    seed_set(pool, 1, 1, "2024-03-01", 5, 180.0).await;
    // Exercise 99 has no metadata row
    seed_set(pool, 2, 99, "2024-03-01", 8, 40.0).await;
    seed_comment(pool, 1, "felt heavy").await;

    let sets = read_training_sets(pool).await.expect("Should read sets");

    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].comment.as_deref(), Some("felt heavy"));
    assert_eq!(sets[1].exercise_id, 99);
    assert_eq!(sets[1].comment, None);

    snapshot.teardown().await;
  }

  #[tokio::test]
  async fn test_duplicate_comments_do_not_duplicate_sets() {
    let snapshot = TestSnapshot::create().await;
    let pool = &snapshot.pool;
    seed_set(pool, 1, 1, "2024-03-01", 5, 60.0).await;
    seed_comment(pool, 1, "first").await;
    seed_comment(pool, 1, "second").await;

    let sets = read_training_sets(pool).await.expect("Should read sets");
    assert_eq!(sets.len(), 1);

    snapshot.teardown().await;
  }

  #[tokio::test]
  async fn test_workout_comments_skip_blank_rows() {
    let snapshot = TestSnapshot::create().await;
    let pool = &snapshot.pool;
    seed_workout_comment(pool, "2024-01-01", "deload week").await;
    seed_workout_comment(pool, "2024-01-02", "").await;
    seed_workout_comment(pool, "", "no date").await;

    let comments = read_workout_comments(pool).await.expect("Should read comments");

    assert_eq!(comments.len(), 1);
    assert_eq!(comments.get(&date("2024-01-01")).map(String::as_str), Some("deload week"));

    snapshot.teardown().await;
  }

  #[tokio::test]
  async fn test_table_names_lists_schema() {
    let snapshot = TestSnapshot::create().await;

    let names = read_table_names(&snapshot.pool).await.expect("Should list tables");
    for table in ["Comment", "WorkoutComment", "exercise", "training_log"] {
      assert!(names.iter().any(|n| n == table), "missing {}", table);
    }

    snapshot.teardown().await;
  }

  #[tokio::test]
  async fn test_table_schema_reports_columns() {
    let snapshot = TestSnapshot::create().await;

    let columns = read_table_schema(&snapshot.pool, "exercise")
      .await
      .expect("Should read schema");

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["_id", "name", "category_id", "notes"]);
    assert!(columns[0].primary_key);
    assert_eq!(columns[1].column_type, "TEXT");
    assert!(columns[1].not_null);
    assert!(!columns[3].not_null);
    assert_eq!(columns[3].default_value, None);

    let unknown = read_table_schema(&snapshot.pool, "no_such_table")
      .await
      .expect("Unknown table has no columns");
    assert!(unknown.is_empty());

    snapshot.teardown().await;
  }

  #[tokio::test]
  async fn test_table_rows_keep_stored_types() {
    let snapshot = TestSnapshot::create().await;
    let pool = &snapshot.pool;
    seed_exercise(pool, 1, "bench press", None).await;
    seed_set(pool, 7, 1, "2024-01-01", 5, 102.5).await;

    let exercises = read_table_rows(pool, "exercise").await.expect("Should read rows");
    assert_eq!(exercises.columns, vec!["_id", "name", "category_id", "notes"]);
    assert_eq!(exercises.rows, vec![vec![json!(1), json!("bench press"), json!(1), Value::Null]]);

    let sets = read_table_rows(pool, "training_log").await.expect("Should read rows");
    assert_eq!(sets.rows[0][3], json!(102.5));

    let empty = read_table_rows(pool, "Comment").await.expect("Empty table reads");
    assert_eq!(empty, TableData::default());

    assert!(matches!(
      read_table_rows(pool, "no_such_table").await,
      Err(LogError::Database(_))
    ));

    snapshot.teardown().await;
  }

  #[test]
  fn test_quote_identifier_escapes_quotes() {
    assert_eq!(quote_identifier("training_log"), "\"training_log\"");
    assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
  }

  #[tokio::test]
  async fn test_unexpected_schema_is_database_error() {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await
      .expect("Failed to create in-memory database");

    let result = read_training_sets(&pool).await;
    assert!(matches!(result, Err(LogError::Database(_))));

    pool.close().await;
  }
}
