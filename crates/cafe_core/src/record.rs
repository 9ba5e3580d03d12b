use serde::Serialize;

/// Final, exported representation of one café.
///
/// Field order matches [`CafeRecord::COLUMNS`]; serde serializes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CafeRecord {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub opening_hours: String,
    pub source_link: String,
}

impl CafeRecord {
    pub const COLUMNS: [&'static str; 7] = [
        "name",
        "description",
        "address",
        "phone",
        "website",
        "opening_hours",
        "source_link",
    ];

    /// Cell values in column order.
    pub fn row(&self) -> [&str; 7] {
        [
            &self.name,
            &self.description,
            &self.address,
            &self.phone,
            &self.website,
            &self.opening_hours,
            &self.source_link,
        ]
    }
}
