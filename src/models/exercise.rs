use serde::{Deserialize, Serialize};

/// Exercise metadata row (`exercise` table)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseRow {
  pub id: i64,
  pub name: Option<String>,
  pub notes: Option<String>,
}

/// Whole-workout comment row (`WorkoutComment` table)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutCommentRow {
  pub date: Option<String>,
  pub comment: Option<String>,
}
