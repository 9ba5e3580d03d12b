//! Venue page -> supplementary fields.
//!
//! Each field has its own lookup so a markup change breaks one column, not the
//! whole record. A lookup that finds nothing yields an empty string.

use std::sync::LazyLock;

use cafe_core::VenueDetails;
use engine_logging::engine_debug;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::text::{collapse_whitespace, element_text, labelled_hours, labelled_value};

static TEL_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="tel:"]"#).expect("tel selector"));
static ADDRESS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("address").expect("address selector"));
static BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector"));
/// Tried in order; the first external link wins.
static WEBSITE_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [r#"a[rel*="nofollow"]"#, r#"a[target="_blank"]"#, "a.external"]
        .iter()
        .map(|s| Selector::parse(s).expect("website selector"))
        .collect()
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+44\s?\d[\d\s\-]{7,}\d|0\d{2,4}[\s\-]?\d{3,4}[\s\-]?\d{3,4})").expect("phone regex")
});
static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z]{1,2}\d{1,2}[A-Z]?\s*\d[A-Z]{2}\b").expect("postcode regex")
});
static ADDRESS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*address[ \t]*:?[ \t]*$|\baddress:").expect("address label regex")
});
static HOURS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*opening hours?[ \t]*:?[ \t]*$|\bopening hours?:")
        .expect("hours label regex")
});

/// Characters of context kept on each side of a bare postcode match.
const POSTCODE_WINDOW: usize = 80;

pub trait DetailExtractor: Send + Sync {
    fn extract(&self, html: &str, source_link: &str) -> VenueDetails;
}

/// Field lookups tuned for venue pages; links back to `own_host` are never
/// taken as the café's website.
#[derive(Debug, Clone, Default)]
pub struct VenuePageExtractor {
    own_host: Option<String>,
}

impl VenuePageExtractor {
    pub fn new(own_host: Option<String>) -> Self {
        Self {
            own_host: own_host
                .map(|h| h.to_ascii_lowercase().trim_start_matches("www.").to_string()),
        }
    }

    /// Derive the host to exclude from the listing article URL.
    pub fn for_article(article_url: &str) -> Self {
        let host = Url::parse(article_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        Self::new(host)
    }
}

impl DetailExtractor for VenuePageExtractor {
    fn extract(&self, html: &str, source_link: &str) -> VenueDetails {
        let document = Html::parse_document(html);
        let page_text = document
            .select(&BODY_SEL)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let details = VenueDetails {
            source_link: source_link.to_string(),
            address: find_address(&document, &page_text).unwrap_or_default(),
            phone: find_phone(&document, &page_text).unwrap_or_default(),
            website: find_website(&document, self.own_host.as_deref()).unwrap_or_default(),
            opening_hours: find_opening_hours(&page_text).unwrap_or_default(),
        };

        let missing = details.missing_fields();
        if !missing.is_empty() {
            engine_debug!("{}: no value for {}", source_link, missing.join(", "));
        }
        details
    }
}

fn find_phone(document: &Html, page_text: &str) -> Option<String> {
    document
        .select(&TEL_LINK_SEL)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim_start_matches("tel:").trim().to_string())
        .find(|phone| !phone.is_empty())
        .or_else(|| {
            PHONE_RE
                .find(page_text)
                .map(|m| m.as_str().trim().to_string())
        })
}

fn find_website(document: &Html, own_host: Option<&str>) -> Option<String> {
    WEBSITE_SELS.iter().find_map(|sel| {
        document
            .select(sel)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| is_external(href, own_host))
            .map(str::to_string)
    })
}

fn is_external(href: &str, own_host: Option<&str>) -> bool {
    let Ok(url) = Url::parse(href) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match (url.host_str(), own_host) {
        (Some(host), Some(own)) => {
            let host = host.to_ascii_lowercase();
            host != own && !host.ends_with(&format!(".{own}"))
        }
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn find_address(document: &Html, page_text: &str) -> Option<String> {
    document
        .select(&ADDRESS_SEL)
        .map(|el| collapse_whitespace(&element_text(el)))
        .find(|text| !text.is_empty())
        .or_else(|| labelled_value(page_text, &ADDRESS_LABEL_RE))
        .or_else(|| postcode_context(page_text))
}

/// Text around the first postcode, trimmed to char boundaries.
fn postcode_context(page_text: &str) -> Option<String> {
    let found = POSTCODE_RE.find(page_text)?;
    let mut start = found.start().saturating_sub(POSTCODE_WINDOW);
    while !page_text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (found.end() + POSTCODE_WINDOW).min(page_text.len());
    while !page_text.is_char_boundary(end) {
        end += 1;
    }
    Some(collapse_whitespace(&page_text[start..end]))
}

fn find_opening_hours(page_text: &str) -> Option<String> {
    labelled_hours(page_text, &HOURS_LABEL_RE)
}
