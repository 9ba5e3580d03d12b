//! Listing article -> ordered raw entries.
//!
//! The article is cut into blocks, each opened by an `h1`-`h3` heading and
//! running until the next one. Blocks whose heading is numbered or whose text
//! carries the `What is it?` marker are entries. When no block qualifies, the
//! page text is split at the marker instead.

use std::sync::LazyLock;

use cafe_core::ListingEntry;
use ego_tree::NodeRef;
use engine_logging::{engine_debug, engine_info, engine_warn};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::text::{
    collapse_whitespace, element_text, is_block_tag, is_skipped_tag, labelled_hours,
    labelled_value, resolve_href, slugify, TextBuilder,
};

static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["main", "article", "body"]
        .iter()
        .map(|s| Selector::parse(s).expect("content selector"))
        .collect()
});

static NUMBER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[.)]\s*").expect("number prefix regex"));
static NUMBERED_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[.)]\s*\S").expect("numbered heading regex"));
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)what is it\?").expect("marker regex"));
static WHAT_IS_IT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)what is it\?\s*(.*?)\s*(?:why we love it:|order this:|address:|opening hours?:|\z)")
        .expect("what is it regex")
});
static WHY_WE_LOVE_IT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)why we love it:\s*(.*?)\s*(?:order this:|address:|opening hours?:|\z)")
        .expect("why we love it regex")
});
static ADDRESS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\baddress:").expect("address label regex"));
static HOURS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bopening hours?:").expect("hours label regex"));

/// Words that mark a line as page furniture rather than a café name.
const NOISE_WORDS: &[&str] = &["recommended", "stars", "shopping", "out of"];
const MAX_NAME_LEN: usize = 100;
/// Lines scanned backwards from a marker when looking for the name.
const NAME_LOOKBACK: usize = 5;

/// An entry candidate that could not be turned into a [`ListingEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingExtraction {
    pub entries: Vec<ListingEntry>,
    pub skipped: Vec<SkippedEntry>,
}

pub trait ListingExtractor: Send + Sync {
    /// `base_url` resolves relative entry links.
    fn extract(&self, html: &str, base_url: &str) -> ListingExtraction;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArticleListingExtractor;

impl ListingExtractor for ArticleListingExtractor {
    fn extract(&self, html: &str, base_url: &str) -> ListingExtraction {
        let document = Html::parse_document(html);
        let base = Url::parse(base_url).ok();
        let Some(content) = content_root(&document) else {
            engine_warn!("No content area found in listing page {}", base_url);
            return ListingExtraction::default();
        };

        let blocks = collect_blocks(content, base.as_ref());
        let candidates: Vec<&Block> = blocks.iter().filter(|b| b.is_candidate()).collect();

        let extraction = if candidates.is_empty() {
            engine_info!("No entry headings found; splitting page text at markers");
            extract_by_markers(&blocks)
        } else {
            extract_by_headings(&candidates)
        };

        engine_debug!(
            "Listing extraction: {} entries, {} skipped",
            extraction.entries.len(),
            extraction.skipped.len()
        );
        extraction
    }
}

fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_SELECTORS
        .iter()
        .find_map(|sel| document.select(sel).next())
}

#[derive(Debug, Clone)]
struct Link {
    url: String,
    text: String,
}

/// Heading plus everything up to the next heading. The first block holds any
/// content before the first heading and has an empty heading.
#[derive(Debug, Default)]
struct Block {
    heading: String,
    heading_links: Vec<Link>,
    text: String,
    links: Vec<Link>,
}

impl Block {
    fn is_candidate(&self) -> bool {
        !self.heading.is_empty()
            && (NUMBERED_HEADING_RE.is_match(&self.heading) || MARKER_RE.is_match(&self.text))
    }
}

#[derive(Default)]
struct OpenBlock {
    heading: TextBuilder,
    heading_links: Vec<Link>,
    text: TextBuilder,
    links: Vec<Link>,
}

impl OpenBlock {
    fn close(self) -> Block {
        Block {
            heading: collapse_whitespace(&self.heading.finish()),
            heading_links: self.heading_links,
            text: self.text.finish(),
            links: self.links,
        }
    }
}

struct BlockCollector<'u> {
    base: Option<&'u Url>,
    done: Vec<Block>,
    current: OpenBlock,
    in_heading: bool,
}

impl<'u> BlockCollector<'u> {
    fn target(&mut self) -> &mut TextBuilder {
        if self.in_heading {
            &mut self.current.heading
        } else {
            &mut self.current.text
        }
    }

    fn start_block(&mut self) {
        let previous = std::mem::take(&mut self.current);
        self.done.push(previous.close());
    }

    fn visit_node(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => self.target().append(text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element);
                }
            }
            _ => {}
        }
    }

    fn visit_element(&mut self, element: ElementRef<'_>) {
        let tag = element.value().name();
        if is_skipped_tag(tag) {
            return;
        }
        match tag {
            "h1" | "h2" | "h3" if !self.in_heading => {
                self.start_block();
                self.in_heading = true;
                self.visit_children(element);
                self.in_heading = false;
            }
            "a" => self.visit_anchor(element),
            "br" => self.target().ensure_newline(),
            _ if is_block_tag(tag) => {
                self.target().ensure_newline();
                self.visit_children(element);
                self.target().ensure_newline();
            }
            _ => self.visit_children(element),
        }
    }

    fn visit_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            self.visit_node(child);
        }
    }

    fn visit_anchor(&mut self, element: ElementRef<'_>) {
        // A link may wrap a heading, which opens a new block mid-visit.
        let blocks_before = self.done.len();
        self.visit_children(element);
        let opened_block = self.done.len() != blocks_before;
        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, self.base))
        else {
            return;
        };
        let link = Link {
            url: url.into(),
            text: collapse_whitespace(&element_text(element)),
        };
        if self.in_heading || opened_block {
            self.current.heading_links.push(link);
        } else {
            self.current.links.push(link);
        }
    }
}

fn collect_blocks(content: ElementRef<'_>, base: Option<&Url>) -> Vec<Block> {
    let mut collector = BlockCollector {
        base,
        done: Vec::new(),
        current: OpenBlock::default(),
        in_heading: false,
    };
    for child in content.children() {
        collector.visit_node(child);
    }
    let mut blocks = collector.done;
    blocks.push(collector.current.close());
    blocks
}

fn extract_by_headings(candidates: &[&Block]) -> ListingExtraction {
    let mut extraction = ListingExtraction::default();
    for (position, block) in candidates.iter().enumerate() {
        let index = position + 1;
        let name = entry_name(&block.heading);
        let all_links = block.heading_links.iter().chain(block.links.iter());
        let source_link = block
            .heading_links
            .first()
            .map(|link| link.url.clone())
            .or_else(|| venue_link(&name, all_links))
            .unwrap_or_default();
        push_entry(&mut extraction, index, name, &block.text, source_link);
    }
    extraction
}

fn extract_by_markers(blocks: &[Block]) -> ListingExtraction {
    let mut lines: Vec<&str> = Vec::new();
    for block in blocks {
        if !block.heading.is_empty() {
            lines.push(&block.heading);
        }
        lines.extend(block.text.lines());
    }
    let all_links: Vec<&Link> = blocks
        .iter()
        .flat_map(|b| b.heading_links.iter().chain(b.links.iter()))
        .collect();

    let markers: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| MARKER_RE.is_match(line))
        .map(|(i, _)| i)
        .collect();

    let mut extraction = ListingExtraction::default();
    let mut floor = 0;
    for (position, &marker) in markers.iter().enumerate() {
        let end = markers.get(position + 1).copied().unwrap_or(lines.len());
        let name = name_before_marker(&lines[floor..marker]);
        let section = lines[marker..end].join("\n");
        let source_link = if name.is_empty() {
            String::new()
        } else {
            linked_by_name(&name, &all_links).unwrap_or_default()
        };
        push_entry(&mut extraction, position + 1, name, &section, source_link);
        floor = marker + 1;
    }
    extraction
}

fn push_entry(
    extraction: &mut ListingExtraction,
    index: usize,
    name: String,
    text: &str,
    source_link: String,
) {
    let description = entry_description(text);
    let skip_reason = if name.is_empty() {
        Some("entry has no name")
    } else if description.is_empty() {
        Some("entry has no 'What is it?' or 'Why we love it:' description")
    } else {
        None
    };

    if let Some(reason) = skip_reason {
        engine_warn!("Skipping listing entry #{} {:?}: {}", index, name, reason);
        extraction.skipped.push(SkippedEntry {
            index,
            name,
            reason: reason.to_string(),
        });
        return;
    }

    extraction.entries.push(ListingEntry {
        index,
        name,
        description,
        address: entry_address(text),
        opening_hours: entry_opening_hours(text),
        source_link,
    });
}

/// Heading text without its `12.` numbering.
fn entry_name(heading: &str) -> String {
    collapse_whitespace(&NUMBER_PREFIX_RE.replace(heading, ""))
}

fn entry_description(text: &str) -> String {
    [&*WHAT_IS_IT_RE, &*WHY_WE_LOVE_IT_RE]
        .into_iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| collapse_whitespace(m.as_str()))
        .find(|description| !description.is_empty())
        .unwrap_or_default()
}

fn entry_address(text: &str) -> String {
    labelled_value(text, &ADDRESS_LABEL_RE).unwrap_or_default()
}

fn entry_opening_hours(text: &str) -> String {
    labelled_hours(text, &HOURS_LABEL_RE).unwrap_or_default()
}

/// First link that points at a venue page or carries the name's slug.
fn venue_link<'a>(name: &str, links: impl Iterator<Item = &'a Link>) -> Option<String> {
    let slug = slugify(name);
    links
        .filter(|link| {
            let href = link.url.to_lowercase();
            href.contains("/venue/") || (!slug.is_empty() && href.contains(&slug))
        })
        .map(|link| link.url.clone())
        .next()
}

/// Link whose text matches the name, restricted to venue-looking targets.
fn linked_by_name(name: &str, links: &[&Link]) -> Option<String> {
    let lower = name.to_lowercase();
    let named = links.iter().copied().filter(|link| {
        let text = link.text.to_lowercase();
        !text.is_empty() && (text.contains(&lower) || lower.contains(&text))
    });
    venue_link(name, named)
}

/// Closest plausible title line above a marker.
fn name_before_marker(lines: &[&str]) -> String {
    lines
        .iter()
        .rev()
        .take(NAME_LOOKBACK)
        .map(|line| line.trim())
        .find(|line| looks_like_name(line))
        .map(entry_name)
        .unwrap_or_default()
}

fn looks_like_name(line: &str) -> bool {
    if line.is_empty() || line.chars().count() >= MAX_NAME_LEN || MARKER_RE.is_match(line) {
        return false;
    }
    let lower = line.to_lowercase();
    if NOISE_WORDS.iter().any(|noise| lower.contains(noise)) {
        return false;
    }
    if lower.ends_with('.') || lower.contains(':') {
        return false;
    }
    entry_name(line).split_whitespace().count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_strips_numbering() {
        assert_eq!(entry_name("12.  Kiss the Hippo"), "Kiss the Hippo");
        assert_eq!(entry_name("3) Prufrock Coffee"), "Prufrock Coffee");
        assert_eq!(entry_name("Monmouth Coffee"), "Monmouth Coffee");
    }

    #[test]
    fn description_prefers_what_is_it_then_why_we_love_it() {
        let text = "What is it?\nA roastery cafe\nwith good cake.\nWhy we love it: The beans.\nAddress: 1 High St";
        assert_eq!(entry_description(text), "A roastery cafe with good cake.");

        let text = "Why we love it: The beans.\nAddress: 1 High St";
        assert_eq!(entry_description(text), "The beans.");

        assert_eq!(entry_description("Address: 1 High St"), "");
    }

    #[test]
    fn name_lookup_skips_noise_and_sentences() {
        let lines = [
            "Recommended by our critics",
            "Kiss the Hippo",
            "Four out of five stars",
        ];
        assert_eq!(name_before_marker(&lines), "Kiss the Hippo");
        assert_eq!(name_before_marker(&["Espresso"]), "");
    }
}
