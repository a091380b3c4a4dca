use std::io::Read;

use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use flate2::read::GzDecoder;
use serde_json::Value;

use backend_domain::IngestEnvelope;

/// Decodes an ingest body, gunzipping it first when the client says so.
/// The decompressed size is capped at `max_bytes`.
pub fn parse_records(headers: &HeaderMap, body: &[u8], max_bytes: u64) -> Result<Vec<Value>> {
    let content = maybe_gunzip(headers, body, max_bytes)?;
    let envelope: IngestEnvelope = serde_json::from_slice(&content)?;
    Ok(envelope.records)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8], max_bytes: u64) -> Result<Vec<u8>> {
    let gzip = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("gzip"))
        .unwrap_or(false);
    if !gzip {
        return Ok(body.to_vec());
    }
    let mut out = Vec::new();
    GzDecoder::new(body)
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut out)?;
    if out.len() as u64 > max_bytes {
        return Err(anyhow!("decompressed body exceeds {} bytes", max_bytes));
    }
    Ok(out)
}
