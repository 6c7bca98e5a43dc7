use contracts::domain::lead::Lead;
use sea_orm::DatabaseConnection;

use super::repository::{self, LeadFilter};

/// Filtered, paginated listing; returns the page plus the total count under
/// the same filters.
pub async fn list(
    db: &DatabaseConnection,
    filter: &LeadFilter,
    offset: u64,
    limit: u64,
) -> anyhow::Result<(Vec<Lead>, u64)> {
    let (models, total) = repository::list_filtered(db, filter, offset, limit).await?;
    let items = models
        .into_iter()
        .map(Lead::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
}
