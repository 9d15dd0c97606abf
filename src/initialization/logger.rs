//! Logger initialization.
//!
//! Sets up `env_logger` with either colored plain lines or one JSON object per
//! line.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first; `level` then overrides it for this crate. Driver
/// chatter from `sqlx` is capped at warnings so per-statement logging does not
/// swamp a benchmark run.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Trace every coordinator transition and batch write
/// RUST_LOG=bulkload_bench=debug bulkload_bench load alumnos.csv
///
/// # Machine-readable output
/// bulkload_bench --log-format json bench alumnos.csv
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.filter_module("bulkload_bench", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string()
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

fn json_line(ts: i64, level: log::Level, target: &str, msg: &str) -> String {
    serde_json::json!({
        "ts": ts,
        "level": level.to_string(),
        "target": target,
        "msg": msg,
    })
    .to_string()
}
