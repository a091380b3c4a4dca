use tracing::info;

use backend_domain::{
    is_invalid_opponent, opponent_player_ids, DailyGrid, PeriodQuery, RecordFilter,
    NPC_PLAYER_ID,
};

use crate::dtos::BattleLogResponse;
use crate::params::{parse_governor_id, resolve_period};
use crate::records::load_records;
use crate::{AppError, AppState};

/// Daily counts of player battles and NPC encounters, one per record.
pub async fn battle_log(
    state: &AppState,
    governor: &str,
    query: PeriodQuery,
) -> Result<BattleLogResponse, AppError> {
    let governor_id = parse_governor_id(governor)?;
    let range = resolve_period(&query)?;
    state.metrics.record_query();

    let filter = RecordFilter::for_governor(governor_id).within(range.window);
    let records = load_records(state, &filter).await?;

    let mut grid = DailyGrid::new(range.window);
    for record in &records {
        let opponents = opponent_player_ids(&record.raw);
        let battle = opponents.iter().any(|id| !is_invalid_opponent(*id));
        let npc = opponents.contains(&NPC_PLAYER_ID);
        if battle || npc {
            grid.record(record.stored.event_time_ms, battle, npc);
        }
    }
    let days = grid.into_days();

    info!(governor_id, records = records.len(), days = days.len(), "battle log built");
    Ok(BattleLogResponse {
        period: (&range).into(),
        days,
    })
}
