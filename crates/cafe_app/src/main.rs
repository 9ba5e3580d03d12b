//! Scrapes Time Out London's café round-up into `~/Desktop/ws portfolio/`.
mod config;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use cafe_engine::{ReqwestFetcher, ScrapeEngine};
use engine_logging::{engine_error, engine_info};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("Scrape aborted: {:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let output_dir = config::output_dir().context("could not resolve the home directory")?;
    logging::initialize(&output_dir);

    let config = config::engine_config(output_dir);
    engine_info!(
        "Scraping {} into {}",
        config.article_url,
        config.output_dir.display()
    );

    let fetcher = ReqwestFetcher::new(config.fetch.clone());
    let engine = ScrapeEngine::new(config, fetcher);
    let report = engine.run();

    let summary = engine.export(&report).context("export failed")?;
    match summary {
        Some(summary) => engine_info!(
            "Wrote {} rows to {} and {}; {} failures logged to {}",
            summary.row_count,
            summary.csv_path.display(),
            summary.xlsx_path.display(),
            summary.failures_logged,
            summary.error_log_path.display()
        ),
        None => engine_info!(
            "Listing article unavailable; previous exports left untouched ({} failures logged)",
            report.failures.len()
        ),
    }
    Ok(())
}
