use thiserror::Error;

/// Exact header names a lead CSV must carry (case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Lead Name",
    "Contact Information",
    "Source",
    "Interest Level",
    "Status",
    "Assigned Salesperson",
];

/// File-level rejections; any of these aborts the upload before DB work.
#[derive(Debug, Error)]
pub enum CsvFileError {
    #[error("CSV file is empty.")]
    Empty,

    #[error("Missing required columns in CSV: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Error processing CSV file: {0}")]
    Unreadable(String),
}

/// One data row with its raw field values. `row_number` is the position
/// reported in error messages: 1-based over the whole file including the
/// header line, so the first data row is row 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,
    pub name: String,
    pub contact_information: String,
    pub source: String,
    pub interest: String,
    pub status: String,
    pub assigned_salesperson: String,
}

/// A parsed data row, or the reason this record could not be read. Malformed
/// records stay in the batch so they are counted and reported without
/// aborting the rest of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvRow {
    Parsed(RawRow),
    Invalid { row_number: usize, reason: String },
}

/// Parse an uploaded lead CSV into data rows. Strips a UTF-8 BOM, validates
/// the header set, and keeps unreadable records as `CsvRow::Invalid`.
pub fn parse_leads_csv(content: &[u8]) -> Result<Vec<CsvRow>, CsvFileError> {
    let text = content
        .strip_prefix(&[0xEF, 0xBB, 0xBF][..])
        .unwrap_or(content);

    if text.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CsvFileError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text);

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            return Err(CsvFileError::Unreadable(format!(
                "Failed to read CSV headers: {}",
                e
            )));
        }
    };

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CsvFileError::MissingColumns(missing));
    }

    // Header positions resolved once; `flexible` records may be short, a
    // missing cell reads as the empty string.
    let position = |name: &str| -> usize {
        headers
            .iter()
            .position(|h| h == name)
            .expect("required column present after validation")
    };
    let name_idx = position("Lead Name");
    let contact_idx = position("Contact Information");
    let source_idx = position("Source");
    let interest_idx = position("Interest Level");
    let status_idx = position("Status");
    let salesperson_idx = position("Assigned Salesperson");

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row_number = index + 2;
        match result {
            Ok(record) => {
                let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
                rows.push(CsvRow::Parsed(RawRow {
                    row_number,
                    name: field(name_idx),
                    contact_information: field(contact_idx),
                    source: field(source_idx),
                    interest: field(interest_idx),
                    status: field(status_idx),
                    assigned_salesperson: field(salesperson_idx),
                }));
            }
            Err(e) => {
                tracing::warn!("Malformed CSV record at row {}: {}", row_number, e);
                rows.push(CsvRow::Invalid {
                    row_number,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(rows)
}
