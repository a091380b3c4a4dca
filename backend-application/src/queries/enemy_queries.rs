use tracing::info;

use backend_domain::{
    aggregate, build_loadout_key, build_loadout_snapshot, enemy_pair_key, trade_percentage,
    CombatEvent, CommanderPair, EnemyGranularity, PairingQuery, RecordFilter,
};

use crate::dtos::{BucketSummary, EnemiesResponse, EnemyAggregate};
use crate::params::{parse_enemy_breakdown, parse_governor_id, parse_self_pair, resolve_period};
use crate::queries::rank_buckets;
use crate::records::{flatten_events, load_records};
use crate::{AppError, AppState};

fn matches_breakdown(
    event: &CombatEvent,
    pair: CommanderPair,
    granularity: EnemyGranularity,
    loadout_key: Option<&str>,
) -> bool {
    if event.self_pair() != pair {
        return false;
    }
    match (granularity, loadout_key) {
        (EnemyGranularity::Loadout(granularity), Some(key)) => {
            build_loadout_key(&build_loadout_snapshot(&event.loadout, granularity)) == key
        }
        _ => true,
    }
}

/// Enemy pairings faced by one self pairing, optionally restricted to a
/// single loadout.
pub async fn list_enemies(
    state: &AppState,
    governor: &str,
    query: PairingQuery,
) -> Result<EnemiesResponse, AppError> {
    let governor_id = parse_governor_id(governor)?;
    let pair = parse_self_pair(query.primary.as_deref(), query.secondary.as_deref())?;
    let (granularity, loadout_key) = parse_enemy_breakdown(&query)?;
    let range = resolve_period(&query.period())?;
    state.metrics.record_query();

    let mut filter = RecordFilter::for_governor(governor_id).within(range.window);
    filter.self_primary_commander = Some(pair.primary_commander_id);
    let records = load_records(state, &filter).await?;
    let events = flatten_events(&records);

    let buckets = aggregate(&events, range.window, |event| {
        if matches_breakdown(event, pair, granularity, loadout_key.as_deref()) {
            enemy_pair_key(event)
        } else {
            None
        }
    });

    let mut ranked: Vec<_> = buckets.into_iter().collect();
    ranked.sort_by(|(a_key, a), (b_key, b)| rank_buckets(a, b).then_with(|| a_key.cmp(b_key)));
    let items: Vec<EnemyAggregate> = ranked
        .iter()
        .map(|(enemy, bucket)| EnemyAggregate {
            enemy_primary_commander_id: enemy.primary_commander_id,
            enemy_secondary_commander_id: enemy.secondary_commander_id,
            summary: BucketSummary::from(bucket),
            trade_percentage: trade_percentage(
                bucket.totals.kill_score,
                bucket.totals.enemy_kill_score,
            ),
        })
        .collect();

    info!(
        governor_id,
        pairing = %pair,
        granularity = granularity.as_str(),
        enemies = items.len(),
        "enemy matchups aggregated"
    );
    Ok(EnemiesResponse {
        period: (&range).into(),
        primary_commander_id: pair.primary_commander_id,
        secondary_commander_id: pair.secondary_commander_id,
        granularity: granularity.as_str(),
        loadout_key,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_with, Battle};

    fn query(granularity: Option<&str>, loadout_key: Option<&str>) -> PairingQuery {
        PairingQuery {
            year: Some("2025".to_string()),
            primary: Some("10".to_string()),
            secondary: Some("20".to_string()),
            granularity: granularity.map(str::to_string),
            loadout_key: loadout_key.map(str::to_string),
            ..PairingQuery::default()
        }
    }

    fn battles() -> Vec<serde_json::Value> {
        vec![
            Battle::new("a", 7, "2025-02-01")
                .enemy(88, 30, 40)
                .kills(300.0, 100.0)
                .equipment("1:100_0:31")
                .to_value(),
            Battle::new("b", 7, "2025-02-02")
                .enemy(89, 30, 40)
                .kills(100.0, 100.0)
                .equipment("1:100_0:38")
                .to_value(),
            Battle::new("c", 7, "2025-02-03")
                .enemy(90, 50, 0)
                .kills(10.0, 0.0)
                .equipment("1:100_0:31")
                .to_value(),
            Battle::new("npc", 7, "2025-02-03")
                .enemy(-2, 60, 0)
                .kills(999.0, 0.0)
                .to_value(),
            Battle::new("other-pair", 7, "2025-02-03")
                .pair(10, 21)
                .enemy(91, 30, 40)
                .kills(999.0, 0.0)
                .to_value(),
        ]
    }

    #[tokio::test]
    async fn overall_breakdown_groups_by_enemy_pair() {
        let state = state_with(battles());
        let response = list_enemies(&state, "7", query(None, None))
            .await
            .expect("enemies");
        assert_eq!(response.granularity, "overall");
        assert_eq!(response.items.len(), 2);
        let first = &response.items[0];
        assert_eq!(
            (first.enemy_primary_commander_id, first.enemy_secondary_commander_id),
            (30, 40)
        );
        assert_eq!(first.summary.count, 2);
        assert_eq!(first.trade_percentage, 200.0);
        assert_eq!(response.items[1].trade_percentage, 0.0);
    }

    #[tokio::test]
    async fn loadout_breakdown_filters_by_key() {
        let state = state_with(battles());
        let exact_key = "eq:1:100_0:31|arm:|ins:|fm:none";
        let response = list_enemies(&state, "7", query(Some("exact"), Some(exact_key)))
            .await
            .expect("enemies");
        let counts: Vec<u64> = response.items.iter().map(|i| i.summary.count).collect();
        assert_eq!(counts, vec![1, 1]);

        let normalized_key = "eq:1:100_0:30|arm:|ins:|fm:none";
        let response = list_enemies(&state, "7", query(Some("normalized"), Some(normalized_key)))
            .await
            .expect("enemies");
        assert_eq!(response.items[0].summary.count, 2);
    }

    #[tokio::test]
    async fn rejects_missing_pair_and_key() {
        let state = state_with(Vec::new());
        let mut bad = query(None, None);
        bad.primary = None;
        assert!(matches!(
            list_enemies(&state, "7", bad).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            list_enemies(&state, "7", query(Some("exact"), None)).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
