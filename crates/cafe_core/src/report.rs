use crate::{CafeRecord, FailureRecord};

/// Everything one pipeline run produced, in article order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapeReport {
    pub records: Vec<CafeRecord>,
    pub failures: Vec<FailureRecord>,
    /// False when the listing article itself could not be fetched.
    pub article_fetched: bool,
}

impl ScrapeReport {
    pub fn record_failure(&mut self, failure: FailureRecord) {
        self.failures.push(failure);
    }
}
