use tracing::info;

use backend_domain::{aggregate, self_pair_key, PeriodQuery, RecordFilter};

use crate::dtos::{BucketSummary, PairingAggregate, PairingsResponse};
use crate::params::{parse_governor_id, resolve_period};
use crate::queries::rank_buckets;
use crate::records::{flatten_events, load_records};
use crate::{AppError, AppState};

/// Totals per self commander pairing over the resolved period.
pub async fn list_pairings(
    state: &AppState,
    governor: &str,
    query: PeriodQuery,
) -> Result<PairingsResponse, AppError> {
    let governor_id = parse_governor_id(governor)?;
    let range = resolve_period(&query)?;
    state.metrics.record_query();

    let filter = RecordFilter::for_governor(governor_id).within(range.window);
    let records = load_records(state, &filter).await?;
    let events = flatten_events(&records);
    let buckets = aggregate(&events, range.window, self_pair_key);

    let mut ranked: Vec<_> = buckets.into_iter().collect();
    ranked.sort_by(|(a_key, a), (b_key, b)| rank_buckets(a, b).then_with(|| a_key.cmp(b_key)));
    let items: Vec<PairingAggregate> = ranked
        .iter()
        .map(|(pair, bucket)| PairingAggregate {
            primary_commander_id: pair.primary_commander_id,
            secondary_commander_id: pair.secondary_commander_id,
            summary: BucketSummary::from(bucket),
        })
        .collect();

    info!(
        governor_id,
        records = records.len(),
        events = events.len(),
        pairings = items.len(),
        "pairings aggregated"
    );
    Ok(PairingsResponse {
        period: (&range).into(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{embedded, failing_state, state_with};

    #[tokio::test]
    async fn groups_by_self_pair_and_ranks_by_kill_score() {
        let state = state_with(vec![
            embedded("r1", 7, "2025-03-01", (10, 20), 88, 100.0),
            embedded("r2", 7, "2025-03-02", (10, 20), 89, 50.0),
            embedded("r3", 7, "2025-03-03", (30, 0), 90, 500.0),
            embedded("r4", 7, "2025-03-04", (30, 0), -2, 900.0),
            embedded("r5", 8, "2025-03-04", (10, 20), 88, 900.0),
        ]);
        let query = PeriodQuery {
            year: Some("2025".to_string()),
            ..PeriodQuery::default()
        };
        let response = list_pairings(&state, "7", query).await.expect("pairings");
        assert_eq!(response.period.start_date, "2025-01-01");
        assert_eq!(response.period.end_date, "2025-12-31");
        let keys: Vec<(i64, i64, u64)> = response
            .items
            .iter()
            .map(|i| (i.primary_commander_id, i.secondary_commander_id, i.summary.count))
            .collect();
        assert_eq!(keys, vec![(30, 0, 1), (10, 20, 2)]);
        assert_eq!(response.items[1].summary.totals.kill_score, 150.0);
        assert_eq!(response.items[1].summary.average_kill_score, 75.0);
    }

    #[tokio::test]
    async fn empty_range_is_not_an_error() {
        let state = state_with(Vec::new());
        let response = list_pairings(&state, "7", PeriodQuery::default())
            .await
            .expect("pairings");
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn rejects_bad_governor_and_propagates_store_failures() {
        let state = state_with(Vec::new());
        assert!(matches!(
            list_pairings(&state, "0", PeriodQuery::default()).await,
            Err(AppError::BadRequest(_))
        ));
        let state = failing_state();
        assert!(matches!(
            list_pairings(&state, "7", PeriodQuery::default()).await,
            Err(AppError::Internal(_))
        ));
    }
}
