/// One café as found in the listing article, before detail enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingEntry {
    /// 1-based position in the article.
    pub index: usize,
    pub name: String,
    pub description: String,
    pub address: String,
    pub opening_hours: String,
    pub source_link: String,
}

impl ListingEntry {
    pub fn entry_ref(&self) -> EntryRef {
        EntryRef {
            index: self.index,
            name: self.name.clone(),
        }
    }

    pub fn has_source_link(&self) -> bool {
        !self.source_link.trim().is_empty()
    }
}

/// Identifies an entry in failure reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRef {
    pub index: usize,
    pub name: String,
}

/// Supplementary fields scraped from a café's own page.
///
/// Every field is best-effort: a lookup that finds nothing leaves it empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VenueDetails {
    pub source_link: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub opening_hours: String,
}

impl VenueDetails {
    /// Details for an entry whose page was never fetched or could not be read.
    pub fn empty_for(source_link: &str) -> Self {
        Self {
            source_link: source_link.to_string(),
            ..Self::default()
        }
    }

    /// Names of the fields that resolved to empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("address", &self.address),
            ("phone", &self.phone),
            ("website", &self.website),
            ("opening_hours", &self.opening_hours),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
