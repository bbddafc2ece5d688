pub mod catalog;
pub mod chart;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod reader;
pub mod records;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod test_utils;

use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use session::Session;

pub use error::LogError;

const USAGE: &str = "usage: liftlog [status | reload | tables | schema | rows <table> | day <YYYY-MM-DD> | days <year> <month> | search <text> | history <exercise_id> | records <exercise_id> | chart <exercise_id> <3|6|12> | upload <file>]";

pub fn run() -> ExitCode {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "liftlog_lib=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let config = match Config::from_env() {
    Ok(config) => config,
    Err(e) => {
      error!("{}", e);
      return ExitCode::FAILURE;
    }
  };

  let args: Vec<String> = std::env::args().skip(1).collect();

  let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
    Ok(runtime) => runtime,
    Err(e) => {
      error!("Failed to start runtime: {}", e);
      return ExitCode::FAILURE;
    }
  };

  runtime.block_on(async move {
    let session = Session::open(config);
    let outcome = dispatch(&session, &args).await;
    session.close().await;

    match outcome {
      Ok(json) => {
        println!("{}", json);
        ExitCode::SUCCESS
      }
      Err(message) => {
        error!("{}", message);
        ExitCode::FAILURE
      }
    }
  })
}

async fn dispatch(session: &Session, args: &[String]) -> Result<String, String> {
  let arg = |i: usize| args.get(i).map(String::as_str).ok_or_else(|| USAGE.to_string());
  let id = |i: usize| -> Result<i64, String> {
    arg(i)?
      .parse()
      .map_err(|_| format!("Invalid exercise id: {}", args[i]))
  };

  let json = match args.first().map(String::as_str).unwrap_or("status") {
    "status" => to_json(&commands::load_snapshot(session).await?),
    "reload" => to_json(&commands::reload_snapshot(session).await?),
    "tables" => to_json(&commands::get_table_names(session).await?),
    "schema" => to_json(&commands::get_table_schemas(session).await?),
    "rows" => to_json(&commands::get_table_rows(session, arg(1)?).await?),
    "day" => to_json(&commands::log::get_day_log(session, arg(1)?).await?),
    "days" => {
      let year: i32 = arg(1)?.parse().map_err(|_| format!("Invalid year: {}", args[1]))?;
      let month: u32 = arg(2)?.parse().map_err(|_| format!("Invalid month: {}", args[2]))?;
      to_json(&commands::log::get_workout_days(session, year, month).await?)
    }
    "search" => to_json(&commands::log::search_exercises(session, arg(1)?).await?),
    "history" => to_json(&commands::history::get_exercise_history(session, id(1)?).await?),
    "records" => to_json(&commands::history::get_rep_maxes(session, id(1)?).await?),
    "chart" => to_json(&commands::history::get_chart_series(session, id(1)?, arg(2)?).await?),
    "upload" => {
      let path = arg(1)?;
      let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
      commands::upload_snapshot(session, bytes).await?;
      info!("Uploaded {}", path);
      to_json(&serde_json::json!({ "success": true }))
    }
    _ => Err(USAGE.to_string()),
  }?;

  Ok(json)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
  serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize output: {}", e))
}
