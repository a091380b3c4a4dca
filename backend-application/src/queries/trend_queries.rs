use std::collections::HashMap;

use futures_util::future::try_join_all;
use tracing::info;

use backend_domain::{
    aggregate, merge_monthly, month_ranges, self_pair_key, AggregationBucket, CommanderPair,
    PeriodQuery, RecordFilter,
};

use crate::dtos::{PairingTrend, PairingTrendsResponse};
use crate::params::{parse_governor_id, parse_year};
use crate::records::{decode_records, flatten_events, store_error};
use crate::{AppError, AppState};

/// Month-by-month pairing totals for one year.
///
/// The twelve month fetches run concurrently; results are merged in month
/// order. Any failed fetch fails the request.
pub async fn pairing_trends(
    state: &AppState,
    governor: &str,
    query: PeriodQuery,
) -> Result<PairingTrendsResponse, AppError> {
    let governor_id = parse_governor_id(governor)?;
    let year = parse_year(query.year.as_deref())?;
    state.metrics.record_query();

    let months = month_ranges(year);
    let fetches = months.iter().map(|month| {
        let repo = state.report_repo.clone();
        let filter = RecordFilter::for_governor(governor_id).within(month.window);
        async move { repo.fetch_records(&filter).await }
    });
    let per_month_rows = try_join_all(fetches)
        .await
        .map_err(|err| store_error(state, "fetch monthly battle records", err))?;

    let per_month: Vec<HashMap<CommanderPair, AggregationBucket>> = months
        .iter()
        .zip(per_month_rows)
        .map(|(month, rows)| {
            let records = decode_records(state, rows);
            let events = flatten_events(&records);
            aggregate(&events, month.window, self_pair_key)
        })
        .collect();

    let rollup = merge_monthly(&months, per_month);
    let mut items: Vec<PairingTrend> = rollup
        .series
        .into_iter()
        .map(|(pair, series)| PairingTrend {
            primary_commander_id: pair.primary_commander_id,
            secondary_commander_id: pair.secondary_commander_id,
            count: series.count,
            average_kill_score: if series.count == 0 {
                0.0
            } else {
                series.totals.kill_score / series.count as f64
            },
            totals: series.totals,
            monthly: series.monthly,
        })
        .collect();
    items.sort_by(|a, b| {
        b.totals
            .kill_score
            .total_cmp(&a.totals.kill_score)
            .then_with(|| b.count.cmp(&a.count))
    });

    info!(governor_id, year, pairings = items.len(), "pairing trends built");
    Ok(PairingTrendsResponse {
        year,
        overall: rollup.overall,
        items,
    })
}
