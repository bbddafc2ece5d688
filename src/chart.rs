//! Max-weight-per-day series for progress charts

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::index::ExerciseHistory;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartWindow {
    #[default]
    ThreeMonths,
    SixMonths,
    TwelveMonths,
}

impl ChartWindow {
    pub fn months(&self) -> u32 {
        match self {
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
        }
    }

    /// First day inside the window ending on `today`; month subtraction
    /// clamps to the end of shorter months
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for ChartWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.months())
    }
}

impl std::str::FromStr for ChartWindow {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3" | "3m" | "three_months" => Ok(Self::ThreeMonths),
            "6" | "6m" | "six_months" => Ok(Self::SixMonths),
            "12" | "12m" | "twelve_months" => Ok(Self::TwelveMonths),
            _ => Err(format!("Unknown chart window: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub max_weight: f64,
}

/// One point per day with data in `[today - window, today]`, ascending by date
pub fn build_chart_series(
    history: &ExerciseHistory,
    window: ChartWindow,
    today: NaiveDate,
) -> Vec<ChartPoint> {
    let start = window.start(today);

    let mut points: Vec<ChartPoint> = history
        .dates
        .iter()
        .filter(|date| (start..=today).contains(*date))
        .filter_map(|date| {
            let max_weight = history
                .sets_on(*date)
                .iter()
                .map(|set| set.weight)
                .reduce(f64::max)?;
            Some(ChartPoint {
                date: *date,
                max_weight,
            })
        })
        .collect();

    // Index dates are newest first; charts plot oldest first
    points.sort_by_key(|p| p.date);
    points
}
