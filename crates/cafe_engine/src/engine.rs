use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cafe_core::{
    assemble_record, dedupe_by_source_link, EntryRef, FailureRecord, ListingEntry, ScrapeReport,
    VenueDetails,
};
use chrono::{SecondsFormat, Utc};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::detail::{DetailExtractor, VenuePageExtractor};
use crate::export::{ExportError, ExportOptions, ExportSummary, Exporter};
use crate::fetch::{FetchSettings, Fetcher};
use crate::listing::{ArticleListingExtractor, ListingExtractor};

pub const DEFAULT_ARTICLE_URL: &str =
    "https://www.timeout.com/london/food-drink/londons-best-cafes-and-coffee-shops";
pub const DEFAULT_MAX_ENTRIES: usize = 20;

#[derive(Clone)]
pub struct EngineConfig {
    pub article_url: String,
    /// Entries beyond this many (in article order) are ignored.
    pub max_entries: Option<usize>,
    /// Pause before each detail page request.
    pub request_delay: Duration,
    pub fetch: FetchSettings,
    pub export: ExportOptions,
    pub output_dir: PathBuf,
    /// Timestamp stamped on failure records.
    pub logged_utc: Arc<dyn Fn() -> String + Send + Sync>,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            article_url: DEFAULT_ARTICLE_URL.to_string(),
            max_entries: Some(DEFAULT_MAX_ENTRIES),
            request_delay: Duration::from_secs(1),
            fetch: FetchSettings::default(),
            export: ExportOptions::default(),
            output_dir,
            logged_utc: Arc::new(utc_timestamp),
        }
    }
}

/// UTC, RFC 3339, whole seconds: `2024-01-01T00:00:00Z`.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sequential listing -> details -> records pipeline. One request at a time.
pub struct ScrapeEngine<F: Fetcher> {
    config: EngineConfig,
    fetcher: F,
    listing: Box<dyn ListingExtractor>,
    detail: Box<dyn DetailExtractor>,
}

impl<F: Fetcher> ScrapeEngine<F> {
    pub fn new(config: EngineConfig, fetcher: F) -> Self {
        let detail = VenuePageExtractor::for_article(&config.article_url);
        Self {
            config,
            fetcher,
            listing: Box::new(ArticleListingExtractor),
            detail: Box::new(detail),
        }
    }

    pub fn with_extractors(
        mut self,
        listing: Box<dyn ListingExtractor>,
        detail: Box<dyn DetailExtractor>,
    ) -> Self {
        self.listing = listing;
        self.detail = detail;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch and parse everything. Per-entry failures are recorded, never fatal.
    pub fn run(&self) -> ScrapeReport {
        let url = self.config.article_url.as_str();
        let mut report = ScrapeReport::default();

        engine_info!("Fetching listing article {}", url);
        let html = match self.fetcher.fetch_html(url) {
            Ok(html) => html,
            Err(err) => {
                engine_error!("Listing article fetch failed for {}: {}", url, err);
                report.record_failure(FailureRecord::network(self.now(), url, err.to_string()));
                return report;
            }
        };
        report.article_fetched = true;

        let extraction = self.listing.extract(&html, url);
        for skipped in extraction.skipped {
            let entry = EntryRef {
                index: skipped.index,
                name: skipped.name,
            };
            report.record_failure(
                FailureRecord::parse(self.now(), url, skipped.reason).with_entry(entry),
            );
        }

        let mut entries = extraction.entries;
        if entries.is_empty() {
            engine_warn!("No café entries found in {}; the page structure may have changed", url);
            report.record_failure(FailureRecord::parse(
                self.now(),
                url,
                "no café entries found in listing article",
            ));
            return report;
        }
        if let Some(max) = self.config.max_entries {
            if entries.len() > max {
                engine_info!("Keeping the first {} of {} entries", max, entries.len());
                entries.truncate(max);
            }
        }

        let (entries, duplicates) = dedupe_by_source_link(entries);
        for duplicate in duplicates {
            engine_warn!(
                "Entry #{} {:?} repeats source link {}",
                duplicate.index,
                duplicate.name,
                duplicate.source_link
            );
            report.record_failure(
                FailureRecord::parse(
                    self.now(),
                    duplicate.source_link.clone(),
                    "duplicate source link; entry dropped",
                )
                .with_entry(duplicate.entry_ref()),
            );
        }

        let total = entries.len();
        for (position, entry) in entries.iter().enumerate() {
            engine_info!("[{:2}/{}] {}", position + 1, total, entry.name);
            let details = self.fetch_details(entry, &mut report);
            match assemble_record(entry, &details) {
                Ok(record) => report.records.push(record),
                Err(err) => report.record_failure(
                    FailureRecord::parse(self.now(), entry.source_link.clone(), err.to_string())
                        .with_entry(entry.entry_ref()),
                ),
            }
        }

        engine_info!(
            "Assembled {} records with {} failures",
            report.records.len(),
            report.failures.len()
        );
        report
    }

    /// Write the report. Returns `None` when the article was never fetched and
    /// only the error log was flushed, leaving earlier exports in place.
    pub fn export(&self, report: &ScrapeReport) -> Result<Option<ExportSummary>, ExportError> {
        let exporter = Exporter::new(self.config.output_dir.clone(), self.config.export.clone());
        if !report.article_fetched {
            let path = exporter.append_error_log(&report.failures)?;
            engine_warn!("Listing unavailable; only {} was updated", path.display());
            return Ok(None);
        }
        exporter.export(&report.records, &report.failures).map(Some)
    }

    fn fetch_details(&self, entry: &ListingEntry, report: &mut ScrapeReport) -> VenueDetails {
        if !entry.has_source_link() {
            engine_debug!("Entry #{} {:?} has no source link", entry.index, entry.name);
            return VenueDetails::empty_for(&entry.source_link);
        }

        if !self.config.request_delay.is_zero() {
            thread::sleep(self.config.request_delay);
        }

        match self.fetcher.fetch_html(&entry.source_link) {
            Ok(html) => self.detail.extract(&html, &entry.source_link),
            Err(err) => {
                engine_warn!("Detail page {} failed: {}", entry.source_link, err);
                report.record_failure(
                    FailureRecord::network(self.now(), entry.source_link.clone(), err.to_string())
                        .with_entry(entry.entry_ref()),
                );
                VenueDetails::empty_for(&entry.source_link)
            }
        }
    }

    fn now(&self) -> String {
        (self.config.logged_utc)()
    }
}
