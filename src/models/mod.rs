pub mod exercise;
pub mod table;
pub mod training_set;

pub use exercise::{ExerciseRow, WorkoutCommentRow};
pub use table::{TableColumn, TableData, TableSchema};
pub use training_set::{SetEntry, TrainingSet};
