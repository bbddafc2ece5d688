//! Per-exercise history, records and chart queries

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::chart::{ChartPoint, ChartWindow};
use crate::models::SetEntry;
use crate::records::RepMaxEntry;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryDay {
    pub date: NaiveDate,
    pub sets: Vec<SetEntry>,
}

/// Every day the exercise was performed, most recent first
pub async fn get_exercise_history(
    session: &Session,
    exercise_id: i64,
) -> Result<Vec<HistoryDay>, String> {
    let log = session
        .load()
        .await
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;

    Ok(log
        .exercise_history(exercise_id)
        .map(|history| {
            history
                .dates
                .iter()
                .map(|date| HistoryDay {
                    date: *date,
                    sets: history.sets_on(*date).to_vec(),
                })
                .collect()
        })
        .unwrap_or_default())
}

pub async fn get_rep_maxes(session: &Session, exercise_id: i64) -> Result<Vec<RepMaxEntry>, String> {
    let log = session
        .load()
        .await
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;
    Ok(log.rep_maxes(exercise_id))
}

/// Daily max weight over the trailing window ending today (local time)
pub async fn get_chart_series(
    session: &Session,
    exercise_id: i64,
    window: &str,
) -> Result<Vec<ChartPoint>, String> {
    let window: ChartWindow = window.parse()?;
    let today = Local::now().date_naive();
    let log = session
        .load()
        .await
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;
    Ok(log.chart_series(exercise_id, window, today))
}
