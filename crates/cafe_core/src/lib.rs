//! Cafe core: pure data model and record assembly for the café harvester.
mod assemble;
mod entry;
mod failure;
mod record;
mod report;

pub use assemble::{assemble_record, dedupe_by_source_link, normalize_link, AssembleError};
pub use entry::{EntryRef, ListingEntry, VenueDetails};
pub use failure::{FailureClass, FailureRecord};
pub use record::CafeRecord;
pub use report::ScrapeReport;
