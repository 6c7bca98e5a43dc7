use serde::{Deserialize, Serialize};

/// Result summary of one CSV upload.
///
/// `rows_processed` and `duplicates_found` reflect the classification pass
/// and are reported even when the commit fails; `rows_imported` and
/// `rows_updated` are both zero in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub filename: String,
    pub rows_processed: usize,
    pub rows_imported: usize,
    pub rows_updated: usize,
    pub duplicates_found: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}
