use std::collections::HashMap;

use tracing::info;

use backend_domain::{
    build_loadout_key, build_loadout_snapshot, Aggregator, LoadoutSnapshot, PairingQuery,
    RecordFilter,
};

use crate::dtos::{BucketSummary, LoadoutAggregate, LoadoutsResponse};
use crate::params::{parse_governor_id, parse_loadout_granularity, parse_self_pair, resolve_period};
use crate::queries::rank_buckets;
use crate::records::{flatten_events, load_records};
use crate::{AppError, AppState};

/// Loadouts used by one self pairing, grouped by canonical key.
pub async fn list_loadouts(
    state: &AppState,
    governor: &str,
    query: PairingQuery,
) -> Result<LoadoutsResponse, AppError> {
    let governor_id = parse_governor_id(governor)?;
    let pair = parse_self_pair(query.primary.as_deref(), query.secondary.as_deref())?;
    let granularity = parse_loadout_granularity(query.granularity.as_deref())?;
    let range = resolve_period(&query.period())?;
    state.metrics.record_query();

    let mut filter = RecordFilter::for_governor(governor_id).within(range.window);
    filter.self_primary_commander = Some(pair.primary_commander_id);
    let records = load_records(state, &filter).await?;
    let events = flatten_events(&records);

    let mut snapshots: HashMap<String, LoadoutSnapshot> = HashMap::new();
    let mut aggregator = Aggregator::new(range.window);
    for event in events.iter().filter(|event| event.is_pvp() && event.self_pair() == pair) {
        let snapshot = build_loadout_snapshot(&event.loadout, granularity);
        let key = build_loadout_key(&snapshot);
        if aggregator.add(event, |_| Some(key.clone())) {
            snapshots.entry(key).or_insert(snapshot);
        }
    }

    let mut ranked: Vec<_> = aggregator.into_buckets().into_iter().collect();
    ranked.sort_by(|(a_key, a), (b_key, b)| rank_buckets(a, b).then_with(|| a_key.cmp(b_key)));
    let items: Vec<LoadoutAggregate> = ranked
        .into_iter()
        .map(|(key, bucket)| LoadoutAggregate {
            loadout: snapshots.remove(&key).unwrap_or_default(),
            summary: BucketSummary::from(&bucket),
            key,
        })
        .collect();

    info!(
        governor_id,
        pairing = %pair,
        granularity = granularity.as_str(),
        loadouts = items.len(),
        "loadouts aggregated"
    );
    Ok(LoadoutsResponse {
        period: (&range).into(),
        primary_commander_id: pair.primary_commander_id,
        secondary_commander_id: pair.secondary_commander_id,
        granularity: granularity.as_str(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_with, Battle};

    fn query(granularity: Option<&str>) -> PairingQuery {
        PairingQuery {
            year: Some("2025".to_string()),
            primary: Some("10".to_string()),
            secondary: Some("20".to_string()),
            granularity: granularity.map(str::to_string),
            ..PairingQuery::default()
        }
    }

    fn battles() -> Vec<serde_json::Value> {
        vec![
            Battle::new("a", 7, "2025-05-01")
                .equipment("2:200_1:37,1:100_0:31")
                .formation(3)
                .kills(300.0, 0.0)
                .to_value(),
            Battle::new("b", 7, "2025-05-02")
                .equipment("1:100_0:38,2:200_1:32")
                .formation(3)
                .kills(100.0, 0.0)
                .to_value(),
            Battle::new("c", 7, "2025-05-03")
                .equipment("1:100_0:31,2:200_1:37")
                .formation(3)
                .kills(50.0, 0.0)
                .to_value(),
        ]
    }

    #[tokio::test]
    async fn exact_loadouts_ignore_token_order() {
        let state = state_with(battles());
        let response = list_loadouts(&state, "7", query(None)).await.expect("loadouts");
        assert_eq!(response.granularity, "exact");
        assert_eq!(response.items.len(), 2);
        let top = &response.items[0];
        assert_eq!(top.key, "eq:1:100_0:31|2:200_1:37|arm:|ins:|fm:3");
        assert_eq!(top.summary.count, 2);
        assert_eq!(top.loadout.equipment.len(), 2);
        assert_eq!(top.loadout.formation, Some(3));
    }

    #[tokio::test]
    async fn normalized_loadouts_merge_attribute_tiers() {
        let state = state_with(battles());
        let response = list_loadouts(&state, "7", query(Some("normalized")))
            .await
            .expect("loadouts");
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].key, "eq:1:100_0:30|2:200_1:30|arm:|ins:|fm:3");
        assert_eq!(response.items[0].summary.count, 3);
    }

    #[tokio::test]
    async fn unknown_granularity_is_rejected() {
        let state = state_with(battles());
        assert!(matches!(
            list_loadouts(&state, "7", query(Some("overall"))).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
