//! Terminal plus file logging for the scraper binary.
//!
//! The file logger writes `scraper.log` inside the output folder and is
//! replaced on every run.

use std::fs::{self, File};
use std::path::Path;

use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILENAME: &str = "scraper.log";

pub(crate) fn initialize(output_dir: &Path) {
    let level = engine_logging::default_level();
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(file_logger) = create_file_logger(output_dir, level, config) {
        loggers.push(file_logger);
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(log::LevelFilter::Error)
        .add_filter_ignore_str("html5ever")
        .add_filter_ignore_str("selectors")
        .build()
}

fn create_file_logger(
    output_dir: &Path,
    level: log::LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    let log_path = output_dir.join(LOG_FILENAME);
    let file = fs::create_dir_all(output_dir).and_then(|()| File::create(&log_path));
    match file {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
