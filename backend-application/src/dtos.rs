// Response bodies of the query endpoints

use serde::Serialize;

use backend_domain::{
    AggregationBucket, BattleTotals, CalendarSeries, DateRange, DayBucket, LoadoutSnapshot,
    MonthlyAggregate, OpponentIdentity, Percentiles, RateSummary, RecordOverview,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub year: i32,
    pub start_date: String,
    pub end_date: String,
}

impl From<&DateRange> for Period {
    fn from(range: &DateRange) -> Self {
        Self {
            year: range.year,
            start_date: range.start_date(),
            end_date: range.end_date(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub count: u64,
    pub totals: BattleTotals,
    pub rates: RateSummary,
    pub average_kill_score: f64,
}

impl From<&AggregationBucket> for BucketSummary {
    fn from(bucket: &AggregationBucket) -> Self {
        Self {
            count: bucket.count,
            totals: bucket.totals,
            rates: bucket.totals.rates(),
            average_kill_score: bucket.average_kill_score(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingAggregate {
    pub primary_commander_id: i64,
    pub secondary_commander_id: i64,
    #[serde(flatten)]
    pub summary: BucketSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingsResponse {
    #[serde(flatten)]
    pub period: Period,
    pub items: Vec<PairingAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingTrend {
    pub primary_commander_id: i64,
    pub secondary_commander_id: i64,
    pub count: u64,
    pub totals: BattleTotals,
    pub average_kill_score: f64,
    pub monthly: Vec<MonthlyAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingTrendsResponse {
    pub year: i32,
    pub overall: CalendarSeries,
    pub items: Vec<PairingTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyAggregate {
    pub enemy_primary_commander_id: i64,
    pub enemy_secondary_commander_id: i64,
    #[serde(flatten)]
    pub summary: BucketSummary,
    pub trade_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemiesResponse {
    #[serde(flatten)]
    pub period: Period,
    pub primary_commander_id: i64,
    pub secondary_commander_id: i64,
    pub granularity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loadout_key: Option<String>,
    pub items: Vec<EnemyAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutAggregate {
    pub key: String,
    pub loadout: LoadoutSnapshot,
    #[serde(flatten)]
    pub summary: BucketSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutsResponse {
    #[serde(flatten)]
    pub period: Period,
    pub primary_commander_id: i64,
    pub secondary_commander_id: i64,
    pub granularity: &'static str,
    pub items: Vec<LoadoutAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarchAggregate {
    pub primary_commander_id: i64,
    pub secondary_commander_id: i64,
    pub count: u64,
    pub totals: BattleTotals,
    pub average_kill_score: f64,
    pub kill_score_percentiles: Percentiles,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarchesResponse {
    pub period_start: i64,
    pub period_end: i64,
    pub items: Vec<MarchAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleLogResponse {
    #[serde(flatten)]
    pub period: Period,
    pub days: Vec<DayBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListItem {
    pub record_id: String,
    pub governor_id: i64,
    pub event_time_millis: i64,
    pub self_primary_commander_id: i64,
    pub self_secondary_commander_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<OpponentIdentity>,
    pub encounter_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<RecordOverview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_percentage: Option<f64>,
}
