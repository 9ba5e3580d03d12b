use std::fmt;

use crate::EntryRef;

/// Failures that are recorded in the error log. Missing optional fields are not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Fetch failed: connection, timeout, non-2xx status, undecodable body.
    Network,
    /// An expected structural marker was absent or malformed.
    Parse,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureClass::Network => write!(f, "NETWORK"),
            FailureClass::Parse => write!(f, "PARSE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub logged_utc: String,
    pub class: FailureClass,
    pub url: String,
    pub entry: Option<EntryRef>,
    pub reason: String,
}

impl FailureRecord {
    pub fn network(
        logged_utc: impl Into<String>,
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            logged_utc: logged_utc.into(),
            class: FailureClass::Network,
            url: url.into(),
            entry: None,
            reason: reason.into(),
        }
    }

    pub fn parse(
        logged_utc: impl Into<String>,
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            class: FailureClass::Parse,
            ..Self::network(logged_utc, url, reason)
        }
    }

    pub fn with_entry(mut self, entry: EntryRef) -> Self {
        self.entry = Some(entry);
        self
    }

    /// One line of the plain-text error log, without trailing newline.
    pub fn log_line(&self) -> String {
        let entry = match &self.entry {
            Some(entry) if entry.name.is_empty() => format!(" [entry #{}]", entry.index),
            Some(entry) => format!(" [entry #{} \"{}\"]", entry.index, entry.name),
            None => String::new(),
        };
        let reason = self.reason.replace(['\r', '\n'], " ");
        format!(
            "{} {} {}{} - {}",
            self.logged_utc, self.class, self.url, entry, reason
        )
    }
}
