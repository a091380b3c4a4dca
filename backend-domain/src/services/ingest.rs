// Preparation of uploaded records for storage

use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;

use crate::entities::{RawRecord, StoredRecord};
use crate::services::{
    record_event_time, record_governor_id, record_raw_time, record_self_pair, record_source_id,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordRejection {
    #[error("unrecognized record shape")]
    UnknownShape,
    #[error("record has no usable event time")]
    MissingTime,
    #[error("record has no governor id")]
    MissingGovernor,
}

/// Hex SHA-256 of the serialized payload.
pub fn payload_fingerprint(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    format!("{digest:x}")
}

/// Classifies and indexes one uploaded record.
pub fn prepare_record(
    value: &Value,
    ingested_at: OffsetDateTime,
) -> Result<StoredRecord, RecordRejection> {
    let record = RawRecord::from_value(value).ok_or(RecordRejection::UnknownShape)?;
    let event_time_ms = record_event_time(&record).ok_or(RecordRejection::MissingTime)?;
    let governor_id = record_governor_id(&record).ok_or(RecordRejection::MissingGovernor)?;
    let payload = value.to_string();
    let record_id = record_source_id(&record).unwrap_or_else(|| payload_fingerprint(&payload));
    let self_pair = record_self_pair(&record);

    Ok(StoredRecord {
        record_id,
        governor_id,
        event_time_ms,
        raw_time: record_raw_time(&record).unwrap_or_default(),
        self_primary_commander: self_pair.primary_commander_id,
        self_secondary_commander: self_pair.secondary_commander_id,
        payload,
        ingested_at,
    })
}
