// Logging setup: a timestamped log file, optionally mirrored to the console.
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("wsbuzz_{}.log", Local::now().format("%Y%m%d%H%M")))
}

/// Installs the global subscriber and returns the log file in use.
pub fn init(level: &str, log_dir: &Path, console: bool) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_file_path(log_dir);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::INFO);
    let file_layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
    let console_layer = console.then(|| fmt::layer());

    tracing_subscriber::registry()
        .with(level)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(path)
}
