use async_trait::async_trait;

use crate::entities::StoredRecord;
use crate::services::SeekPlan;
use crate::value_objects::TimeWindow;

/// Which stored records a query reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub governor_id: Option<i64>,
    pub window: Option<TimeWindow>,
    pub self_primary_commander: Option<i64>,
    pub self_secondary_commander: Option<i64>,
}

impl RecordFilter {
    pub fn for_governor(governor_id: i64) -> Self {
        Self {
            governor_id: Some(governor_id),
            ..Self::default()
        }
    }

    pub fn within(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.governor_id.map_or(true, |id| record.governor_id == id)
            && self
                .window
                .map_or(true, |window| window.contains(record.event_time_ms))
            && self
                .self_primary_commander
                .map_or(true, |id| record.self_primary_commander == id)
            && self
                .self_secondary_commander
                .map_or(true, |id| record.self_secondary_commander == id)
    }
}

#[async_trait]
pub trait BattleReportRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn insert_records(&self, records: &[StoredRecord]) -> anyhow::Result<()>;
    /// Every record matching `filter`, in no particular order.
    async fn fetch_records(&self, filter: &RecordFilter) -> anyhow::Result<Vec<StoredRecord>>;
    /// Records matching `filter` past the plan's boundary, in the plan's
    /// direction, at most `plan.limit` rows.
    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        plan: &SeekPlan,
    ) -> anyhow::Result<Vec<StoredRecord>>;
    async fn ping(&self) -> anyhow::Result<()>;
}
