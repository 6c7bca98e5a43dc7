use contracts::domain::import::ImportSummary;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use thiserror::Error;

use super::classify::{self, Classification, DuplicateDetector};
use super::csv_file::{self, CsvFileError, CsvRow};
use crate::domain::{lead, salesperson};

/// Failures that reject the upload as a whole (HTTP 400). Row-level and
/// commit-time failures are reported inside the summary instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    InvalidFile(#[from] CsvFileError),

    /// Batch preparation failed before classification finished
    /// (salesperson resolution or the contact snapshot).
    #[error("Error processing CSV file: {0}")]
    Preparation(anyhow::Error),
}

/// Run one CSV upload end to end: parse, resolve salespersons, classify
/// every row, and commit the batch in a single transaction.
///
/// The transaction spans salesperson provisioning, duplicate lookups, and
/// the final writes, so provisioned ids are visible to later rows and a
/// commit failure reverts everything. Dropping the transaction on an early
/// error path rolls it back.
pub async fn import_leads_csv(
    db: &DatabaseConnection,
    filename: &str,
    content: &[u8],
) -> Result<ImportSummary, ImportError> {
    let rows = csv_file::parse_leads_csv(content)?;
    let rows_processed = rows.len();
    tracing::info!("CSV file contains {} rows", rows_processed);

    let txn = db
        .begin()
        .await
        .map_err(|e| ImportError::Preparation(e.into()))?;

    let classification = prepare_batch(&txn, rows).await?;
    tracing::info!(
        "Classified batch: {} to insert, {} to update, {} duplicates, {} row errors",
        classification.to_insert.len(),
        classification.to_update.len(),
        classification.duplicates_found,
        classification.errors.len()
    );

    Ok(finalize_import(txn, classification, filename, rows_processed).await)
}

/// Commit the classified batch and assemble the result summary. On a commit
/// failure the transaction rolls back, both change counts report zero, and
/// a single summary error is appended after the row-level errors.
async fn finalize_import(
    txn: DatabaseTransaction,
    classification: Classification,
    filename: &str,
    rows_processed: usize,
) -> ImportSummary {
    let Classification {
        to_insert,
        to_update,
        mut errors,
        duplicates_found,
    } = classification;

    let mut rows_imported = 0;
    let mut rows_updated = 0;

    match commit_batch(txn, &to_insert, &to_update).await {
        Ok(()) => {
            rows_imported = to_insert.len();
            rows_updated = to_update.len();
            tracing::info!(
                "Successfully processed {} new leads and updated {} existing leads",
                rows_imported,
                rows_updated
            );
        }
        Err(e) => {
            tracing::error!("Database error during bulk operations: {:#}", e);
            errors.push(format!("Database error prevented import: {}", e));
        }
    }

    ImportSummary {
        filename: filename.to_string(),
        rows_processed,
        rows_imported,
        rows_updated,
        duplicates_found,
        errors,
    }
}

/// Salesperson resolution, contact snapshot, and the per-row classification
/// pass, all on the shared transaction.
async fn prepare_batch(
    txn: &DatabaseTransaction,
    rows: Vec<CsvRow>,
) -> Result<Classification, ImportError> {
    // Unique non-empty salesperson names in first-occurrence order.
    let mut names: Vec<String> = Vec::new();
    for row in &rows {
        if let CsvRow::Parsed(raw) = row {
            if !raw.assigned_salesperson.is_empty()
                && !names.contains(&raw.assigned_salesperson)
            {
                names.push(raw.assigned_salesperson.clone());
            }
        }
    }
    tracing::info!("Found {} unique salespersons in CSV", names.len());

    let salesperson_map = salesperson::service::resolve_or_create(txn, &names)
        .await
        .map_err(ImportError::Preparation)?;

    let persisted_contacts = lead::repository::existing_contacts(txn)
        .await
        .map_err(ImportError::Preparation)?;
    tracing::info!(
        "Found {} existing contacts in database",
        persisted_contacts.len()
    );
    let mut detector = DuplicateDetector::new(persisted_contacts);

    Ok(classify::classify_rows(txn, rows, &salesperson_map, &mut detector).await)
}

/// Bulk insert plus targeted updates as one atomic unit. Consumes the
/// transaction: commit on success, rollback on any failure.
async fn commit_batch(
    txn: DatabaseTransaction,
    to_insert: &[contracts::domain::lead::NewLead],
    to_update: &[(i32, contracts::domain::lead::NewLead)],
) -> anyhow::Result<()> {
    let write = async {
        if !to_insert.is_empty() {
            tracing::info!("Attempting to insert {} new leads into database", to_insert.len());
            lead::repository::insert_many(&txn, to_insert).await?;
        }
        if !to_update.is_empty() {
            tracing::info!("Attempting to update {} existing leads", to_update.len());
            for (id, row) in to_update {
                lead::repository::update_by_id(&txn, *id, row).await?;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    match write {
        Ok(()) => {
            txn.commit().await?;
            Ok(())
        }
        Err(e) => {
            let _ = txn.rollback().await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_test_db;
    use contracts::domain::lead::Status;
    use sea_orm::EntityTrait;

    const HEADER: &str =
        "Lead Name,Contact Information,Source,Interest Level,Status,Assigned Salesperson";

    fn csv(rows: &[&str]) -> Vec<u8> {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text.into_bytes()
    }

    #[tokio::test]
    async fn test_import_inserts_new_leads() {
        let db = connect_test_db().await;
        let content = csv(&[
            "Anna,a@x.com,Website,High,New,Bob",
            "Cara,c@x.com,Referral,Low,Contacted,Bob",
        ]);

        let summary = import_leads_csv(&db, "leads.csv", &content).await.unwrap();

        assert_eq!(summary.filename, "leads.csv");
        assert_eq!(summary.rows_processed, 2);
        assert_eq!(summary.rows_imported, 2);
        assert_eq!(summary.rows_updated, 0);
        assert_eq!(summary.duplicates_found, 0);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn test_row_with_empty_contact_is_reported_not_imported() {
        let db = connect_test_db().await;
        let content = csv(&[
            "Anna,a@x.com,Website,High,New,",
            "Bob,,Website,High,New,",
            "Cara,c@x.com,Website,High,New,",
        ]);

        let summary = import_leads_csv(&db, "leads.csv", &content).await.unwrap();

        assert_eq!(summary.rows_processed, 3);
        assert_eq!(summary.rows_imported, 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(
            summary.errors[0],
            "Row 3: Missing required field (Name or Contact Info)."
        );
    }

    #[tokio::test]
    async fn test_unknown_source_label_is_reported_not_imported() {
        let db = connect_test_db().await;
        let content = csv(&[
            "Anna,a@x.com,Unknown,High,New,",
            "Cara,c@x.com,Website,High,New,",
        ]);

        let summary = import_leads_csv(&db, "leads.csv", &content).await.unwrap();

        assert_eq!(summary.rows_processed, 2);
        assert_eq!(summary.rows_imported, 1);
        assert_eq!(summary.rows_updated, 0);
        assert_eq!(
            summary.errors,
            vec!["Row 2: Invalid enum value - 'Unknown' is not a valid Source"]
        );
    }

    #[tokio::test]
    async fn test_reupload_turns_inserts_into_updates() {
        let db = connect_test_db().await;
        let content = csv(&[
            "Anna,a@x.com,Website,High,New,Bob",
            "Cara,c@x.com,Referral,Low,Contacted,Bob",
        ]);

        let first = import_leads_csv(&db, "leads.csv", &content).await.unwrap();
        assert_eq!(first.rows_imported, 2);

        let second = import_leads_csv(&db, "leads.csv", &content).await.unwrap();
        assert_eq!(second.rows_processed, 2);
        assert_eq!(second.rows_imported, 0);
        assert_eq!(second.rows_updated, 2);
        assert_eq!(second.duplicates_found, first.rows_imported);

        // Still two rows persisted, updated in place.
        let (rows, total) = lead::repository::list_filtered(
            &db,
            &lead::repository::LeadFilter::default(),
            0,
            100,
        )
        .await
        .unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_update_applies_latest_values_by_contact() {
        let db = connect_test_db().await;
        import_leads_csv(&db, "leads.csv", &csv(&["Anna,a@x.com,Website,High,New,"]))
            .await
            .unwrap();

        let summary = import_leads_csv(
            &db,
            "leads.csv",
            &csv(&["Anna Renamed,a@x.com,Website,High,Closed,"]),
        )
        .await
        .unwrap();
        assert_eq!(summary.rows_updated, 1);

        let filter = lead::repository::LeadFilter {
            status: Some(Status::Closed),
            ..Default::default()
        };
        let (rows, _) = lead::repository::list_filtered(&db, &filter, 0, 100)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Anna Renamed");
    }

    #[tokio::test]
    async fn test_in_file_duplicate_keeps_first_occurrence() {
        let db = connect_test_db().await;
        let content = csv(&[
            "Anna,a@x.com,Website,High,New,",
            "Anna Again,a@x.com,Website,High,New,",
        ]);

        let summary = import_leads_csv(&db, "leads.csv", &content).await.unwrap();

        assert_eq!(summary.rows_processed, 2);
        assert_eq!(summary.rows_imported, 1);
        assert_eq!(summary.rows_updated, 0);
        assert_eq!(summary.duplicates_found, 1);

        let (rows, _) = lead::repository::list_filtered(
            &db,
            &lead::repository::LeadFilter::default(),
            0,
            100,
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Anna");
    }

    #[tokio::test]
    async fn test_salesperson_shared_across_rows_resolves_once() {
        let db = connect_test_db().await;
        let content = csv(&[
            "Anna,a@x.com,Website,High,New,Bob",
            "Cara,c@x.com,Website,High,New,Bob",
            "Dave,d@x.com,Website,High,New,Bob",
        ]);

        import_leads_csv(&db, "leads.csv", &content).await.unwrap();

        let salespersons = crate::domain::salesperson::repository::Entity::find()
            .all(&db)
            .await
            .unwrap();
        assert_eq!(salespersons.len(), 1);
        let bob_id = salespersons[0].id;

        let (rows, _) = lead::repository::list_filtered(
            &db,
            &lead::repository::LeadFilter::default(),
            0,
            100,
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.salesperson_id == Some(bob_id)));
    }

    #[tokio::test]
    async fn test_commit_failure_zeroes_counts_and_keeps_row_errors() {
        use contracts::domain::lead::{Interest, NewLead, Source};

        let db = connect_test_db().await;
        let colliding = NewLead {
            name: "Anna".to_string(),
            contact_information: "a@x.com".to_string(),
            source: Source::Website,
            interest: Interest::High,
            status: Status::New,
            assigned_salesperson_name: String::new(),
            salesperson_id: None,
        };

        // Two inserts sharing one contact violate the unique constraint at
        // write time, the shape of any constraint failure surfacing only in
        // the commit step.
        let classification = Classification {
            to_insert: vec![colliding.clone(), colliding],
            to_update: Vec::new(),
            errors: vec!["Row 4: Missing required field (Name or Contact Info).".to_string()],
            duplicates_found: 0,
        };

        let txn = db.begin().await.unwrap();
        let summary = finalize_import(txn, classification, "leads.csv", 3).await;

        assert_eq!(summary.rows_processed, 3);
        assert_eq!(summary.rows_imported, 0);
        assert_eq!(summary.rows_updated, 0);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(
            summary.errors[0],
            "Row 4: Missing required field (Name or Contact Info)."
        );
        assert!(summary.errors[1].starts_with("Database error prevented import:"));

        // Full rollback: nothing persisted.
        let (rows, total) = lead::repository::list_filtered(
            &db,
            &lead::repository::LeadFilter::default(),
            0,
            100,
        )
        .await
        .unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let db = connect_test_db().await;
        let err = import_leads_csv(&db, "leads.csv", b"").await.unwrap_err();
        assert_eq!(err.to_string(), "CSV file is empty.");
    }

    #[tokio::test]
    async fn test_missing_columns_are_rejected() {
        let db = connect_test_db().await;
        let err = import_leads_csv(&db, "leads.csv", b"Lead Name,Source\nAnna,Website\n")
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Missing required columns in CSV:"));
    }
}
