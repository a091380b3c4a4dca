use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::{error, warn};

use backend_application::commands::ingest_commands;
use backend_application::AppState;
use backend_domain::IngestSummary;

use crate::error::HttpError;
use crate::middleware::parse_records;

pub async fn ingest_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<IngestSummary>, HttpError> {
    let records = parse_records(&headers, &body, state.config.max_body_bytes).map_err(|err| {
        error!("failed to parse ingest body: {}", err);
        state.metrics.record_ingest_error();
        HttpError::BadRequest(err.to_string())
    })?;
    if records.is_empty() {
        warn!("ingest body carried no records");
        return Ok(Json(IngestSummary::default()));
    }

    let summary = ingest_commands::ingest_records(&state, records).await?;
    Ok(Json(summary))
}
