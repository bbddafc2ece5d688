//! Daily log and calendar queries

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::SetEntry;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSets {
    pub exercise_id: i64,
    pub name: String,
    pub sets: Vec<SetEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    /// In the order the exercises were first performed that day
    pub exercises: Vec<ExerciseSets>,
    pub workout_comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSummary {
    pub exercise_id: i64,
    pub name: String,
}

pub fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", date, e))
}

/// Everything logged on one day; no exercises when nothing was logged
pub async fn get_day_log(session: &Session, date: &str) -> Result<DayView, String> {
    let date = parse_date(date)?;
    let log = session
        .load()
        .await
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;
    let language = &session.config().language;

    let exercises = log
        .date_index
        .exercises_on(date)
        .iter()
        .map(|id| ExerciseSets {
            exercise_id: *id,
            name: log.display_name(*id, language),
            sets: log.date_index.sets_for(date, *id).to_vec(),
        })
        .collect();

    Ok(DayView {
        date,
        exercises,
        workout_comment: log.workout_comment(date).map(str::to_string),
    })
}

/// Days with at least one logged set in the given month
pub async fn get_workout_days(
    session: &Session,
    year: i32,
    month: u32,
) -> Result<Vec<NaiveDate>, String> {
    if !(1..=12).contains(&month) {
        return Err(format!("Invalid month: {}", month));
    }
    let log = session
        .load()
        .await
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;
    Ok(log.date_index.days_in_month(year, month))
}

pub async fn search_exercises(
    session: &Session,
    query: &str,
) -> Result<Vec<ExerciseSummary>, String> {
    let log = session
        .load()
        .await
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;
    let language = &session.config().language;

    Ok(log
        .catalog
        .search(query)
        .into_iter()
        .map(|id| ExerciseSummary {
            exercise_id: id,
            name: log.display_name(id, language),
        })
        .collect())
}
