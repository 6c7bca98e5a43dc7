use std::collections::{HashMap, HashSet};

use contracts::domain::lead::{Interest, NewLead, Source, Status};
use sea_orm::ConnectionTrait;

use super::csv_file::{CsvRow, RawRow};
use crate::domain::lead;

/// Tracks contact identifiers already taken, seeded from the persisted
/// snapshot. A contact classified as new is claimed immediately so a later
/// row with the same contact in the same file reads as a duplicate of the
/// in-file first occurrence.
pub struct DuplicateDetector {
    seen: HashSet<String>,
}

impl DuplicateDetector {
    pub fn new(persisted_contacts: HashSet<String>) -> Self {
        Self {
            seen: persisted_contacts,
        }
    }

    /// True when the contact is already taken; otherwise claims it and
    /// returns false.
    pub fn is_duplicate(&mut self, contact: &str) -> bool {
        if self.seen.contains(contact) {
            true
        } else {
            self.seen.insert(contact.to_string());
            false
        }
    }
}

/// Outcome of the classification pass over one upload.
#[derive(Debug, Default)]
pub struct Classification {
    pub to_insert: Vec<NewLead>,
    /// Matched lead id paired with its replacement values.
    pub to_update: Vec<(i32, NewLead)>,
    pub errors: Vec<String>,
    pub duplicates_found: usize,
}

/// Classify every data row as insert, update, or error, in file order.
/// Row-level failures are accumulated; none of them aborts the batch.
pub async fn classify_rows<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<CsvRow>,
    salesperson_map: &HashMap<String, i32>,
    detector: &mut DuplicateDetector,
) -> Classification {
    let mut result = Classification::default();

    for row in rows {
        let raw = match row {
            CsvRow::Parsed(raw) => raw,
            CsvRow::Invalid { row_number, reason } => {
                result
                    .errors
                    .push(format!("Row {}: Error processing row - {}", row_number, reason));
                continue;
            }
        };

        match classify_row(conn, &raw, salesperson_map, detector, &mut result.duplicates_found)
            .await
        {
            Ok(Some(Routed::Insert(lead))) => result.to_insert.push(lead),
            Ok(Some(Routed::Update(id, lead))) => result.to_update.push((id, lead)),
            // In-file duplicate of a row already routed to the insert list;
            // counted, not written twice.
            Ok(None) => {}
            Err(RowError { row_number, message }) => {
                tracing::warn!("Row {}: {}", row_number, message);
                result.errors.push(format!("Row {}: {}", row_number, message));
            }
        }
    }

    result
}

enum Routed {
    Insert(NewLead),
    Update(i32, NewLead),
}

struct RowError {
    row_number: usize,
    message: String,
}

async fn classify_row<C: ConnectionTrait>(
    conn: &C,
    raw: &RawRow,
    salesperson_map: &HashMap<String, i32>,
    detector: &mut DuplicateDetector,
    duplicates_found: &mut usize,
) -> Result<Option<Routed>, RowError> {
    // The required-field check fires regardless of enum validity.
    if raw.name.trim().is_empty() || raw.contact_information.trim().is_empty() {
        return Err(RowError {
            row_number: raw.row_number,
            message: "Missing required field (Name or Contact Info).".to_string(),
        });
    }

    let invalid_enum = |message: String| RowError {
        row_number: raw.row_number,
        message: format!("Invalid enum value - {}", message),
    };
    let source = Source::parse_label(&raw.source).map_err(|e| invalid_enum(e.to_string()))?;
    let interest = Interest::parse_label(&raw.interest).map_err(|e| invalid_enum(e.to_string()))?;
    let status = Status::parse_label(&raw.status).map_err(|e| invalid_enum(e.to_string()))?;

    // Absent or unknown salesperson name is not an error; the lead simply
    // carries no reference.
    let salesperson_id = salesperson_map.get(&raw.assigned_salesperson).copied();

    let lead = NewLead {
        name: raw.name.clone(),
        contact_information: raw.contact_information.clone(),
        source,
        interest,
        status,
        assigned_salesperson_name: raw.assigned_salesperson.clone(),
        salesperson_id,
    };

    if detector.is_duplicate(&lead.contact_information) {
        *duplicates_found += 1;
        let existing_id = lead::repository::find_id_by_contact(conn, &lead.contact_information)
            .await
            .map_err(|e| RowError {
                row_number: raw.row_number,
                message: format!("Error processing row - {}", e),
            })?;
        match existing_id {
            Some(id) => Ok(Some(Routed::Update(id, lead))),
            // Duplicate of an earlier row in this file; the first occurrence
            // already owns the contact.
            None => Ok(None),
        }
    } else {
        Ok(Some(Routed::Insert(lead)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_test_db;

    fn raw(row_number: usize, name: &str, contact: &str) -> RawRow {
        RawRow {
            row_number,
            name: name.to_string(),
            contact_information: contact.to_string(),
            source: "Website".to_string(),
            interest: "High".to_string(),
            status: "New".to_string(),
            assigned_salesperson: String::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_required_field_is_an_error() {
        let conn = connect_test_db().await;
        let mut detector = DuplicateDetector::new(HashSet::new());

        let rows = vec![
            CsvRow::Parsed(raw(2, "Anna", "a@x.com")),
            CsvRow::Parsed(raw(3, "Bob", "   ")),
            CsvRow::Parsed(raw(4, "", "c@x.com")),
        ];
        let result = classify_rows(&conn, rows, &HashMap::new(), &mut detector).await;

        assert_eq!(result.to_insert.len(), 1);
        assert_eq!(
            result.errors,
            vec![
                "Row 3: Missing required field (Name or Contact Info).",
                "Row 4: Missing required field (Name or Contact Info)."
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_enum_label_is_an_error() {
        let conn = connect_test_db().await;
        let mut detector = DuplicateDetector::new(HashSet::new());

        let mut bad = raw(2, "Anna", "a@x.com");
        bad.source = "Unknown".to_string();
        let result =
            classify_rows(&conn, vec![CsvRow::Parsed(bad)], &HashMap::new(), &mut detector).await;

        assert!(result.to_insert.is_empty());
        assert!(result.to_update.is_empty());
        assert_eq!(
            result.errors,
            vec!["Row 2: Invalid enum value - 'Unknown' is not a valid Source"]
        );
    }

    #[tokio::test]
    async fn test_persisted_contact_routes_to_update() {
        let conn = connect_test_db().await;
        lead::repository::insert_many(
            &conn,
            &[NewLead {
                name: "Anna".to_string(),
                contact_information: "a@x.com".to_string(),
                source: Source::Referral,
                interest: Interest::Low,
                status: Status::New,
                assigned_salesperson_name: String::new(),
                salesperson_id: None,
            }],
        )
        .await
        .unwrap();
        let persisted = lead::repository::existing_contacts(&conn).await.unwrap();
        let mut detector = DuplicateDetector::new(persisted);

        let rows = vec![CsvRow::Parsed(raw(2, "Anna Updated", "a@x.com"))];
        let result = classify_rows(&conn, rows, &HashMap::new(), &mut detector).await;

        assert!(result.to_insert.is_empty());
        assert_eq!(result.to_update.len(), 1);
        assert_eq!(result.duplicates_found, 1);
        assert_eq!(result.to_update[0].1.name, "Anna Updated");
    }

    #[tokio::test]
    async fn test_in_file_duplicate_counts_without_double_insert() {
        let conn = connect_test_db().await;
        let mut detector = DuplicateDetector::new(HashSet::new());

        let rows = vec![
            CsvRow::Parsed(raw(2, "Anna", "a@x.com")),
            CsvRow::Parsed(raw(3, "Anna Again", "a@x.com")),
        ];
        let result = classify_rows(&conn, rows, &HashMap::new(), &mut detector).await;

        assert_eq!(result.to_insert.len(), 1);
        assert!(result.to_update.is_empty());
        assert_eq!(result.duplicates_found, 1);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_salesperson_mapping_is_applied() {
        let conn = connect_test_db().await;
        let mut detector = DuplicateDetector::new(HashSet::new());
        let map = HashMap::from([("Bob".to_string(), 7)]);

        let mut with_rep = raw(2, "Anna", "a@x.com");
        with_rep.assigned_salesperson = "Bob".to_string();
        let without_rep = raw(3, "Cara", "c@x.com");

        let result = classify_rows(
            &conn,
            vec![CsvRow::Parsed(with_rep), CsvRow::Parsed(without_rep)],
            &map,
            &mut detector,
        )
        .await;

        assert_eq!(result.to_insert[0].salesperson_id, Some(7));
        assert_eq!(result.to_insert[1].salesperson_id, None);
    }

    #[test]
    fn test_detector_claims_new_contacts_immediately() {
        let mut detector = DuplicateDetector::new(HashSet::from(["old@x.com".to_string()]));
        assert!(detector.is_duplicate("old@x.com"));
        assert!(!detector.is_duplicate("new@x.com"));
        assert!(detector.is_duplicate("new@x.com"));
    }
}
