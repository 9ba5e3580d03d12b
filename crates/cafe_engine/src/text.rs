//! Plain-text rendering of HTML fragments and the label lookups run over it.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;
use url::Url;

/// Any label that ends the value of another label on the same line.
static NEXT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(what is it\?|why we love it:|order this:|address:|opening hours?:|phone:|website:)")
        .expect("next label regex")
});

/// Lines that continue an opening-hours value, e.g. `Sat-Sun 9am-5pm`.
static HOURS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun|daily|every|weekdays|weekends)")
        .expect("hours line regex")
});

/// Accumulates text with collapsed whitespace and block-level line breaks.
#[derive(Debug, Default)]
pub(crate) struct TextBuilder {
    buf: String,
    last_char: Option<char>,
}

impl TextBuilder {
    pub(crate) fn append(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.buf.is_empty() || matches!(self.last_char, Some(' ') | Some('\n')) {
                    continue;
                }
                self.push(' ');
            } else {
                self.push(ch);
            }
        }
    }

    pub(crate) fn ensure_newline(&mut self) {
        if self.buf.is_empty() || self.last_char == Some('\n') {
            return;
        }
        if self.last_char == Some(' ') {
            self.buf.pop();
        }
        self.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.buf
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&mut self, ch: char) {
        self.buf.push(ch);
        self.last_char = Some(ch);
    }
}

pub(crate) fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "section" | "article" | "header" | "footer" | "aside" | "nav" | "figure"
            | "figcaption" | "table" | "tr" | "td" | "th" | "dl" | "dt" | "dd" | "ul" | "ol"
            | "li" | "blockquote" | "address" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

pub(crate) fn is_skipped_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "noscript" | "iframe" | "template" | "svg")
}

/// Render an element's visible text, one line per block-level element.
pub(crate) fn element_text(element: ElementRef) -> String {
    let mut builder = TextBuilder::default();
    for child in element.children() {
        append_node_text(child, &mut builder);
    }
    builder.finish()
}

fn append_node_text(node: NodeRef<'_, Node>, builder: &mut TextBuilder) {
    match node.value() {
        Node::Text(text) => builder.append(text),
        Node::Element(element) => {
            let tag = element.name();
            if is_skipped_tag(tag) {
                return;
            }
            if tag == "br" {
                builder.ensure_newline();
                return;
            }
            let block = is_block_tag(tag);
            if block {
                builder.ensure_newline();
            }
            for child in node.children() {
                append_node_text(child, builder);
            }
            if block {
                builder.ensure_newline();
            }
        }
        _ => {}
    }
}

/// Single-line text with runs of whitespace collapsed to one space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Value that follows `label` on the same line, or on the next line when the
/// label stands alone. Cut at the next known label.
pub(crate) fn labelled_value(text: &str, label: &Regex) -> Option<String> {
    labelled_lines(text, label).and_then(|lines| lines.into_iter().next())
}

/// Like [`labelled_value`], plus following lines that read like opening times.
pub(crate) fn labelled_hours(text: &str, label: &Regex) -> Option<String> {
    let lines = labelled_lines(text, label)?;
    let mut parts = lines.into_iter();
    let mut value = parts.next()?;
    for line in parts {
        if !HOURS_LINE_RE.is_match(&line) {
            break;
        }
        value.push(' ');
        value.push_str(&line);
    }
    Some(value)
}

fn labelled_lines(text: &str, label: &Regex) -> Option<Vec<String>> {
    let found = label.find(text)?;
    let rest = text[found.end()..].trim_start();
    let mut lines = rest.lines().map(str::trim).filter(|line| !line.is_empty());
    let first = cut_at_next_label(lines.next()?);
    if first.is_empty() {
        return None;
    }
    let mut out = vec![first];
    for line in lines {
        if NEXT_LABEL_RE.is_match(line) {
            break;
        }
        out.push(collapse_whitespace(line));
    }
    Some(out)
}

fn cut_at_next_label(line: &str) -> String {
    let cut = NEXT_LABEL_RE
        .find(line)
        .map(|m| &line[..m.start()])
        .unwrap_or(line);
    collapse_whitespace(cut.trim_end_matches([',', ';', ' ']))
}

/// Resolve an href against `base`; only http(s) targets are kept.
pub(crate) fn resolve_href(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => base?.join(trimmed).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// URL slug of a display name: `Kiss the Hippo` -> `kiss-the-hippo`.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
