use std::sync::Once;

use cafe_core::ListingEntry;
use cafe_engine::{ArticleListingExtractor, ListingExtractor, SkippedEntry};
use pretty_assertions::assert_eq;

const ARTICLE_URL: &str =
    "https://www.timeout.com/london/food-drink/londons-best-cafes-and-coffee-shops";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn fixture() -> &'static str {
    include_str!("fixtures/listing_article.html")
}

#[test]
fn extracts_every_well_formed_entry_in_page_order() {
    init_logging();
    let extraction = ArticleListingExtractor.extract(fixture(), ARTICLE_URL);

    assert!(extraction.skipped.is_empty(), "{:?}", extraction.skipped);
    assert_eq!(
        extraction.entries,
        vec![
            ListingEntry {
                index: 1,
                name: "Prufrock Coffee".into(),
                description: "A pioneering Leather Lane espresso bar with a serious filter menu."
                    .into(),
                address: "23-25 Leather Ln, London EC1N 7TE".into(),
                opening_hours: "Mon-Fri 8am-4pm".into(),
                source_link: "https://www.timeout.com/london/restaurants/prufrock-coffee".into(),
            },
            ListingEntry {
                index: 2,
                name: "Kiss the Hippo".into(),
                description: "A Richmond roastery that spread across west London.".into(),
                address: String::new(),
                opening_hours: String::new(),
                source_link: "https://www.timeout.com/london/venue/kiss-the-hippo".into(),
            },
            ListingEntry {
                index: 3,
                name: "Monmouth Coffee".into(),
                description: "The Borough Market queue is worth it every time.".into(),
                address: String::new(),
                opening_hours: "Mon-Sat 7.30am-6pm Sun closed".into(),
                source_link: "https://www.timeout.com/london/shopping/monmouth-coffee-company"
                    .into(),
            },
        ]
    );
}

#[test]
fn entry_count_tracks_number_of_entries() {
    init_logging();
    for k in [0usize, 1, 4, 9] {
        let mut html = String::from("<html><body><main><h1>Best cafés</h1>");
        for i in 1..=k {
            html.push_str(&format!(
                "<h2><a href=\"/venue/cafe-{i}\">{i}. Cafe Number {i}</a></h2>\
                 <p>What is it? Cafe {i} serves coffee.</p>"
            ));
        }
        html.push_str("</main></body></html>");

        let extraction = ArticleListingExtractor.extract(&html, "https://example.com/list");
        let names: Vec<_> = extraction.entries.iter().map(|e| e.name.clone()).collect();
        let expected: Vec<_> = (1..=k).map(|i| format!("Cafe Number {i}")).collect();
        assert_eq!(names, expected);
    }
}

#[test]
fn malformed_entry_is_skipped_and_reported() {
    init_logging();
    let html = r#"
    <html><body><main>
      <h2>1. Good Cafe</h2><p>What is it? A fine cafe.</p>
      <h2>2. Broken Cafe</h2><p>Just a photo caption here.</p>
      <h2>3. Other Cafe</h2><p>What is it? Another fine cafe.</p>
    </main></body></html>
    "#;

    let extraction = ArticleListingExtractor.extract(html, "https://example.com/list");

    let names: Vec<_> = extraction.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Good Cafe", "Other Cafe"]);
    assert_eq!(extraction.entries[1].index, 3);
    assert_eq!(
        extraction.skipped,
        vec![SkippedEntry {
            index: 2,
            name: "Broken Cafe".into(),
            reason: "entry has no 'What is it?' or 'Why we love it:' description".into(),
        }]
    );
}

#[test]
fn falls_back_to_marker_split_without_headings() {
    init_logging();
    let html = r#"
    <html><body><article>
      <p>Four out of five stars</p>
      <p><a href="/london/venue/attendant">The Attendant</a></p>
      <p>What is it? A coffee bar in a former Victorian toilet.</p>
      <p>Address: 27a Foley St, W1W 6DY</p>
      <p>Lovely Little Place</p>
      <p>What is it? Tiny but mighty.</p>
      <p>Opening hours: Daily 8am-3pm</p>
    </article></body></html>
    "#;

    let extraction = ArticleListingExtractor.extract(html, "https://www.timeout.com/london/cafes");

    assert!(extraction.skipped.is_empty());
    assert_eq!(extraction.entries.len(), 2);

    let first = &extraction.entries[0];
    assert_eq!(first.name, "The Attendant");
    assert_eq!(first.description, "A coffee bar in a former Victorian toilet.");
    assert_eq!(first.address, "27a Foley St, W1W 6DY");
    assert_eq!(first.source_link, "https://www.timeout.com/london/venue/attendant");

    let second = &extraction.entries[1];
    assert_eq!(second.name, "Lovely Little Place");
    assert_eq!(second.opening_hours, "Daily 8am-3pm");
    assert_eq!(second.source_link, "");
}

#[test]
fn page_without_entries_yields_nothing() {
    init_logging();
    let html = "<html><body><main><h1>Oops</h1><p>Nothing to see.</p></main></body></html>";
    let extraction = ArticleListingExtractor.extract(html, "https://example.com/list");
    assert!(extraction.entries.is_empty());
    assert!(extraction.skipped.is_empty());
}

#[test]
fn link_wrapped_headings_after_intro_text() {
    init_logging();
    let html = r#"
    <html><body><main>
      <p>Our pick of the capital's coffee.</p>
      <a href="/london/venue/prufrock"><h3>1. Prufrock Coffee</h3></a>
      <p>What is it? A Leather Lane espresso bar.</p>
      <a class="card" href="/london/venue/attendant"><h3>2. The Attendant</h3><span>Fitzrovia</span></a>
      <p>What is it? Coffee in a converted Victorian loo.</p>
    </main></body></html>
    "#;

    let extraction = ArticleListingExtractor.extract(html, "https://www.timeout.com/london/cafes");

    assert!(extraction.skipped.is_empty(), "{:?}", extraction.skipped);
    let entries: Vec<_> = extraction
        .entries
        .iter()
        .map(|e| (e.name.as_str(), e.description.as_str(), e.source_link.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (
                "Prufrock Coffee",
                "A Leather Lane espresso bar.",
                "https://www.timeout.com/london/venue/prufrock",
            ),
            (
                "The Attendant",
                "Coffee in a converted Victorian loo.",
                "https://www.timeout.com/london/venue/attendant",
            ),
        ]
    );
}
