use axum::extract::{Multipart, Query, State};
use axum::Json;
use contracts::domain::import::ImportSummary;
use contracts::domain::lead::{Interest, LeadListResponse, Source, Status};
use serde::Deserialize;

use crate::domain::import;
use crate::domain::lead::{self, repository::LeadFilter};
use crate::error::ApiError;
use crate::system::auth::extractor::CurrentUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct LeadListParams {
    pub source: Option<String>,
    pub interest: Option<String>,
    pub status: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /leads
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<LeadListParams>,
) -> Result<Json<LeadListResponse>, ApiError> {
    let filter = LeadFilter {
        source: params
            .source
            .as_deref()
            .map(Source::parse_label)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        interest: params
            .interest
            .as_deref()
            .map(Interest::parse_label)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        status: params
            .status
            .as_deref()
            .map(Status::parse_label)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(100).clamp(1, 100);

    tracing::info!(
        "Fetching leads with filters: source={:?}, interest={:?}, status={:?}, offset={}, limit={}",
        filter.source,
        filter.interest,
        filter.status,
        offset,
        limit
    );

    let (items, total) = lead::service::list(&state.db, &filter, offset, limit)
        .await
        .map_err(|e| {
            tracing::error!("Error fetching leads: {:#}", e);
            ApiError::Internal("Could not fetch leads from the database.".to_string())
        })?;

    Ok(Json(LeadListResponse { items, total }))
}

/// POST /load_file (auth required)
pub async fn load_file(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let Some((filename, content)) = upload else {
        return Err(ApiError::BadRequest(
            "No file part in upload".to_string(),
        ));
    };

    tracing::info!(
        "Processing file upload: {} by user: {}",
        filename,
        identity.email
    );

    if !filename.ends_with(".csv") {
        tracing::warn!("Invalid file type uploaded: {}", filename);
        return Err(ApiError::BadRequest(
            "Invalid file type. Please upload a CSV file.".to_string(),
        ));
    }

    let summary = import::service::import_leads_csv(&state.db, &filename, &content).await?;

    Ok(Json(summary))
}
