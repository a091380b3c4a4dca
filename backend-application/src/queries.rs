// Read-side use cases

use std::cmp::Ordering;

use backend_domain::AggregationBucket;

pub mod battle_log_queries;
pub mod enemy_queries;
pub mod loadout_queries;
pub mod march_queries;
pub mod pairing_queries;
pub mod report_queries;
pub mod trend_queries;

/// Highest total kill score first, then most battles.
pub(crate) fn rank_buckets(a: &AggregationBucket, b: &AggregationBucket) -> Ordering {
    b.totals
        .kill_score
        .total_cmp(&a.totals.kill_score)
        .then_with(|| b.count.cmp(&a.count))
}
