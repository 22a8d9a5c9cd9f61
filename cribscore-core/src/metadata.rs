use std::time::{SystemTime, UNIX_EPOCH};

/// Where a model came from and how much it has seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    /// Unix seconds at construction.
    pub created: u64,
    /// Free text, e.g. the corpus a model was built from.
    pub provenance: String,
    pub symbols_trained: u64,
    pub case_fold: bool,
    pub rescales: u64,
}

impl Metadata {
    pub fn new(provenance: String, case_fold: bool) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            created,
            provenance,
            symbols_trained: 0,
            case_fold,
            rescales: 0,
        }
    }
}
