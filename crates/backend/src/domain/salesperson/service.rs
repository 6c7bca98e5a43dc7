use std::collections::HashMap;

use sea_orm::ConnectionTrait;

use super::repository;

/// Credential written for salespersons provisioned during import. Not a PHC
/// string, so it can never verify as a login password.
pub const PLACEHOLDER_CREDENTIAL: &str = "temporary_hash";

/// Resolve every distinct non-empty name to an id, creating missing records
/// with the placeholder credential. Runs on the import transaction so new
/// ids are visible to the rest of the batch. A name appearing N times in the
/// input resolves once and maps to a single id.
pub async fn resolve_or_create<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> anyhow::Result<HashMap<String, i32>> {
    let mut map: HashMap<String, i32> = HashMap::new();

    for name in names {
        if name.is_empty() || map.contains_key(name) {
            continue;
        }

        let id = match repository::find_id_by_name(conn, name).await? {
            Some(id) => id,
            None => {
                let id = repository::insert(conn, name, PLACEHOLDER_CREDENTIAL).await?;
                tracing::info!("Created new salesperson: {}", name);
                id
            }
        };
        map.insert(name.clone(), id);
    }

    Ok(map)
}
