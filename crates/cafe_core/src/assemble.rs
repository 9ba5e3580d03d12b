use std::collections::HashSet;

use url::Url;

use crate::{CafeRecord, ListingEntry, VenueDetails};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    #[error("details for {details} do not belong to entry linked to {entry}")]
    LinkMismatch { entry: String, details: String },
}

/// Canonical form of a source link used as the entry <-> details matching key.
///
/// Drops the fragment and a trailing path slash; unparsable links are only trimmed.
pub fn normalize_link(link: &str) -> String {
    let trimmed = link.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    url.set_fragment(None);
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }
    url.to_string()
}

/// Keep the first entry for each source link; later ones are returned separately.
///
/// Entries without a link are always kept since they never reach a detail page.
pub fn dedupe_by_source_link(entries: Vec<ListingEntry>) -> (Vec<ListingEntry>, Vec<ListingEntry>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(entries.len());
    let mut duplicates = Vec::new();
    for entry in entries {
        if !entry.has_source_link() || seen.insert(normalize_link(&entry.source_link)) {
            kept.push(entry);
        } else {
            duplicates.push(entry);
        }
    }
    (kept, duplicates)
}

/// Merge a listing entry with the details scraped from its page.
///
/// Listing values win for address and opening hours; details only fill the gaps.
pub fn assemble_record(
    entry: &ListingEntry,
    details: &VenueDetails,
) -> Result<CafeRecord, AssembleError> {
    if normalize_link(&entry.source_link) != normalize_link(&details.source_link) {
        return Err(AssembleError::LinkMismatch {
            entry: entry.source_link.clone(),
            details: details.source_link.clone(),
        });
    }

    Ok(CafeRecord {
        name: entry.name.clone(),
        description: entry.description.clone(),
        address: prefer(&entry.address, &details.address),
        phone: details.phone.clone(),
        website: details.website.clone(),
        opening_hours: prefer(&entry.opening_hours, &details.opening_hours),
        source_link: entry.source_link.clone(),
    })
}

fn prefer(primary: &str, fallback: &str) -> String {
    if primary.trim().is_empty() {
        fallback.trim().to_string()
    } else {
        primary.trim().to_string()
    }
}
