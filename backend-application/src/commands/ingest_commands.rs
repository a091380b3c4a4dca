use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info};

use backend_domain::{prepare_record, IngestSummary, StoredRecord};

use crate::{AppError, AppState};

/// Indexes and stores uploaded records. Records that cannot be indexed are
/// dropped and counted; a store failure fails the whole batch.
pub async fn ingest_records(
    state: &AppState,
    records: Vec<Value>,
) -> Result<IngestSummary, AppError> {
    let ingested_at = OffsetDateTime::now_utc();
    let mut rows: Vec<StoredRecord> = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for value in &records {
        match prepare_record(value, ingested_at) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                dropped += 1;
                debug!("dropping uploaded record: {}", reason);
            }
        }
    }

    if !rows.is_empty() {
        if let Err(err) = state.report_repo.insert_records(&rows).await {
            state.metrics.record_ingest_error();
            return Err(AppError::Internal(err));
        }
    }

    state.metrics.record_ingest(rows.len(), dropped);
    info!(accepted = rows.len(), dropped, "battle records ingested");
    Ok(IngestSummary {
        accepted: rows.len(),
        dropped,
    })
}
