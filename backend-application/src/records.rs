// Loading and decoding stored records for the query paths

use serde_json::Value;
use tracing::{debug, error};

use backend_domain::{extract_events, CombatEvent, RawRecord, RecordFilter, StoredRecord};

use crate::{AppError, AppState};

/// A stored row together with its decoded payload.
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    pub stored: StoredRecord,
    pub raw: RawRecord,
}

impl LoadedRecord {
    pub fn events(&self) -> Vec<CombatEvent> {
        extract_events(&self.raw)
    }
}

pub fn decode_record(stored: StoredRecord) -> Option<LoadedRecord> {
    let value = match serde_json::from_str::<Value>(&stored.payload) {
        Ok(value) => value,
        Err(err) => {
            debug!(record_id = %stored.record_id, "skipping unreadable payload: {}", err);
            return None;
        }
    };
    let Some(raw) = RawRecord::from_value(&value) else {
        debug!(record_id = %stored.record_id, "skipping record of unknown shape");
        return None;
    };
    Some(LoadedRecord { stored, raw })
}

/// Decodes rows, dropping unreadable ones. Counts both on the metrics.
pub fn decode_records(state: &AppState, rows: Vec<StoredRecord>) -> Vec<LoadedRecord> {
    let scanned = rows.len();
    let records: Vec<LoadedRecord> = rows.into_iter().filter_map(decode_record).collect();
    state.metrics.record_scan(scanned, scanned - records.len());
    records
}

pub fn store_error(state: &AppState, context: &str, err: anyhow::Error) -> AppError {
    error!("failed to {}: {}", context, err);
    state.metrics.record_query_error();
    AppError::Internal(err)
}

pub async fn load_records(
    state: &AppState,
    filter: &RecordFilter,
) -> Result<Vec<LoadedRecord>, AppError> {
    let rows = state
        .report_repo
        .fetch_records(filter)
        .await
        .map_err(|err| store_error(state, "fetch battle records", err))?;
    Ok(decode_records(state, rows))
}

pub fn flatten_events(records: &[LoadedRecord]) -> Vec<CombatEvent> {
    records.iter().flat_map(LoadedRecord::events).collect()
}
