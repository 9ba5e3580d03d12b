//! Cafe engine: fetch, extraction and export for the café harvester.
mod decode;
mod detail;
mod engine;
mod export;
mod fetch;
mod listing;
mod persist;
mod text;
mod types;

pub use decode::{decode_html, DecodedHtml};
pub use detail::{DetailExtractor, VenuePageExtractor};
pub use engine::{
    utc_timestamp, EngineConfig, ScrapeEngine, DEFAULT_ARTICLE_URL, DEFAULT_MAX_ENTRIES,
};
pub use export::{
    render_csv, render_xlsx, ExportError, ExportOptions, ExportSummary, Exporter, FormatError,
    TargetFailure,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use listing::{ArticleListingExtractor, ListingExtraction, ListingExtractor, SkippedEntry};
pub use persist::{append_lines, ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
