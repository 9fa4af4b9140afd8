//! Logger setup for the binary.
//!
//! Library code only emits records through the `log` facade. The binary
//! calls [`init_logging`] once, which installs `env_logger` writing either
//! to stderr or to a log file. Each line reads
//! `2026-10-16 09:30:00 - INFO - oil_spill::simulation - message`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use log::LevelFilter;

/// Resolve the level: explicit argument, then `RUST_LOG`, then info.
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info)
}

/// Install the global logger.
///
/// With `log_file` set, records go to that file (truncated, parent created);
/// otherwise to stderr. Calling this twice returns an error rather than
/// panicking.
pub fn init_logging(level: Option<&str>, log_file: Option<&Path>) -> io::Result<()> {
    let log_level = parse_level(level);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level).format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

    log::info!("Logger initialized (level: {})", log_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_wins() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("WARN")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("off")), LevelFilter::Off);
    }
}
