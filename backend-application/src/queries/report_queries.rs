use tracing::debug;

use backend_domain::{
    assemble_page, extract_events, record_self_pair, representative_opponent, summarize_record,
    trade_percentage, CursorPage, RecordFilter, ReportListQuery, StoredRecord,
};

use crate::dtos::ReportListItem;
use crate::params::{parse_page_request, parse_report_filters};
use crate::records::{decode_record, store_error};
use crate::{AppError, AppState};

fn to_list_item(stored: StoredRecord) -> ReportListItem {
    let mut item = ReportListItem {
        record_id: stored.record_id.clone(),
        governor_id: stored.governor_id,
        event_time_millis: stored.event_time_ms,
        self_primary_commander_id: stored.self_primary_commander,
        self_secondary_commander_id: stored.self_secondary_commander,
        opponent: None,
        encounter_count: 0,
        overview: None,
        trade_percentage: None,
    };
    if let Some(record) = decode_record(stored) {
        let pair = record_self_pair(&record.raw);
        item.self_primary_commander_id = pair.primary_commander_id;
        item.self_secondary_commander_id = pair.secondary_commander_id;
        item.opponent = representative_opponent(&record.raw);
        item.encounter_count = extract_events(&record.raw).len();
        item.overview = summarize_record(&record.raw);
        item.trade_percentage = item
            .overview
            .map(|o| trade_percentage(o.sender.kill_score, o.opponent.kill_score));
    }
    item
}

/// Newest-first listing of stored reports with cursor pagination.
pub async fn list_reports(
    state: &AppState,
    query: ReportListQuery,
) -> Result<CursorPage<ReportListItem>, AppError> {
    let (governor_id, primary, secondary) = parse_report_filters(&query)?;
    let request = parse_page_request(&state.config, &query)?;
    state.metrics.record_query();

    let filter = RecordFilter {
        governor_id,
        window: None,
        self_primary_commander: primary,
        self_secondary_commander: secondary,
    };
    let plan = request.seek_plan();
    let rows = state
        .report_repo
        .fetch_page(&filter, &plan)
        .await
        .map_err(|err| store_error(state, "fetch report page", err))?;
    state.metrics.record_scan(rows.len(), 0);

    let page = assemble_page(&request, rows).map(to_list_item);
    debug!(
        items = page.items.len(),
        has_next = page.next_cursor.is_some(),
        has_previous = page.previous_cursor.is_some(),
        "report page assembled"
    );
    Ok(page)
}
