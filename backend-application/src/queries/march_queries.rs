use std::collections::HashMap;

use chrono::{Datelike, Utc};
use tracing::info;

use backend_domain::{
    month_ranges, percentiles, self_pair_key, Aggregator, CommanderPair, RecordFilter,
};

use crate::dtos::MarchAggregate;
use crate::dtos::MarchesResponse;
use crate::params::parse_governor_id;
use crate::records::{flatten_events, load_records};
use crate::{AppError, AppState};

/// Per-pairing march statistics for the current UTC month.
pub async fn list_marches(state: &AppState, governor: &str) -> Result<MarchesResponse, AppError> {
    let now = Utc::now();
    marches_for_month(state, governor, now.year(), now.month()).await
}

pub async fn marches_for_month(
    state: &AppState,
    governor: &str,
    year: i32,
    month: u32,
) -> Result<MarchesResponse, AppError> {
    let governor_id = parse_governor_id(governor)?;
    let window = month_ranges(year)
        .into_iter()
        .nth(month.saturating_sub(1) as usize)
        .map(|range| range.window)
        .ok_or_else(|| AppError::bad_request(format!("invalid month: {month}")))?;
    state.metrics.record_query();

    let filter = RecordFilter::for_governor(governor_id).within(window);
    let records = load_records(state, &filter).await?;
    let events = flatten_events(&records);

    let mut aggregator = Aggregator::new(window);
    let mut kill_scores: HashMap<CommanderPair, Vec<f64>> = HashMap::new();
    for event in &events {
        let Some(pair) = self_pair_key(event) else {
            continue;
        };
        if aggregator.add(event, |_| Some(pair)) {
            kill_scores
                .entry(pair)
                .or_default()
                .push(event.results.kill_score);
        }
    }

    let mut items: Vec<MarchAggregate> = aggregator
        .into_buckets()
        .into_iter()
        .map(|(pair, bucket)| MarchAggregate {
            primary_commander_id: pair.primary_commander_id,
            secondary_commander_id: pair.secondary_commander_id,
            count: bucket.count,
            totals: bucket.totals,
            average_kill_score: bucket.average_kill_score(),
            kill_score_percentiles: percentiles(
                kill_scores.get(&pair).map(Vec::as_slice).unwrap_or_default(),
            ),
        })
        .collect();
    items.sort_by(|a, b| {
        b.totals
            .kill_score
            .total_cmp(&a.totals.kill_score)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.primary_commander_id.cmp(&b.primary_commander_id))
            .then_with(|| a.secondary_commander_id.cmp(&b.secondary_commander_id))
    });

    info!(governor_id, year, month, marches = items.len(), "march statistics built");
    Ok(MarchesResponse {
        period_start: window.start_millis,
        period_end: window.end_millis,
        items,
    })
}
