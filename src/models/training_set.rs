use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logged set, as read from the snapshot's `training_log` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrainingSet {
  pub date: NaiveDate,
  pub exercise_id: i64,
  pub reps: i64,
  pub weight: f64,
  pub comment: Option<String>,
  /// `training_log._id`; strictly increasing insertion order
  pub sequence: i64,
}

/// A set as stored inside the date and exercise indexes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
  pub weight: f64,
  pub reps: i64,
  pub comment: Option<String>,
}

impl From<&TrainingSet> for SetEntry {
  fn from(set: &TrainingSet) -> Self {
    Self {
      weight: set.weight,
      reps: set.reps,
      comment: set.comment.clone(),
    }
  }
}
