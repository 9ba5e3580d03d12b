use std::sync::Once;

use cafe_core::{
    assemble_record, dedupe_by_source_link, normalize_link, AssembleError, CafeRecord,
    ListingEntry, VenueDetails,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn entry(index: usize, name: &str, link: &str) -> ListingEntry {
    ListingEntry {
        index,
        name: name.to_string(),
        description: format!("{name} pours a fine flat white."),
        source_link: link.to_string(),
        ..ListingEntry::default()
    }
}

#[test]
fn details_fill_empty_listing_fields() {
    init_logging();
    let listing = ListingEntry {
        opening_hours: "Mon-Fri 8am-4pm".into(),
        ..entry(1, "Kaffeine", "https://example.com/venue/kaffeine")
    };
    let details = VenueDetails {
        source_link: "https://example.com/venue/kaffeine/".into(),
        address: "66 Great Titchfield St, W1W 7QJ".into(),
        phone: "020 7580 6755".into(),
        website: "https://kaffeine.co.uk".into(),
        opening_hours: "Daily 9am-5pm".into(),
    };

    let record = assemble_record(&listing, &details).unwrap();

    assert_eq!(
        record,
        CafeRecord {
            name: "Kaffeine".into(),
            description: "Kaffeine pours a fine flat white.".into(),
            address: "66 Great Titchfield St, W1W 7QJ".into(),
            phone: "020 7580 6755".into(),
            website: "https://kaffeine.co.uk".into(),
            opening_hours: "Mon-Fri 8am-4pm".into(),
            source_link: "https://example.com/venue/kaffeine".into(),
        }
    );
}

#[test]
fn empty_details_keep_listing_fields_and_blank_the_rest() {
    init_logging();
    let listing = entry(2, "Monmouth", "https://example.com/venue/monmouth");
    let record = assemble_record(&listing, &VenueDetails::empty_for(&listing.source_link)).unwrap();

    assert_eq!(record.name, "Monmouth");
    assert!(!record.description.is_empty());
    assert_eq!(record.source_link, "https://example.com/venue/monmouth");
    assert_eq!(
        [
            record.address.as_str(),
            record.phone.as_str(),
            record.website.as_str(),
            record.opening_hours.as_str()
        ],
        ["", "", "", ""]
    );
}

#[test]
fn entry_without_link_assembles_with_empty_details() {
    init_logging();
    let listing = entry(3, "Nameless Corner", "");
    let record = assemble_record(&listing, &VenueDetails::empty_for("")).unwrap();
    assert_eq!(record.source_link, "");
    assert_eq!(record.name, "Nameless Corner");
}

#[test]
fn mismatched_details_are_rejected() {
    init_logging();
    let listing = entry(1, "Kaffeine", "https://example.com/venue/kaffeine");
    let details = VenueDetails::empty_for("https://example.com/venue/monmouth");

    let err = assemble_record(&listing, &details).unwrap_err();
    assert_eq!(
        err,
        AssembleError::LinkMismatch {
            entry: "https://example.com/venue/kaffeine".into(),
            details: "https://example.com/venue/monmouth".into(),
        }
    );
}

#[test]
fn dedupe_keeps_first_occurrence_per_link() {
    init_logging();
    let entries = vec![
        entry(1, "Kaffeine", "https://example.com/venue/kaffeine"),
        entry(2, "Monmouth", "https://example.com/venue/monmouth"),
        entry(3, "Kaffeine Again", "https://example.com/venue/kaffeine/#top"),
        entry(4, "No Link One", ""),
        entry(5, "No Link Two", ""),
    ];

    let (kept, duplicates) = dedupe_by_source_link(entries);

    let kept_names: Vec<_> = kept.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(kept_names, vec!["Kaffeine", "Monmouth", "No Link One", "No Link Two"]);
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].index, 3);
}

#[test]
fn normalize_link_drops_fragment_and_trailing_slash() {
    assert_eq!(
        normalize_link(" https://Example.com/venue/a/#reviews "),
        "https://example.com/venue/a"
    );
    assert_eq!(normalize_link("https://example.com/"), "https://example.com/");
    assert_eq!(normalize_link("not a url"), "not a url");
}
