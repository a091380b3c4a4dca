use anyhow::Result;
use async_trait::async_trait;
use clickhouse::query::Query;
use clickhouse::Client;
use tracing::debug;

use backend_domain::{BattleReportRepository, RecordFilter, SeekDirection, SeekPlan, StoredRecord};

const RECORDS_TABLE: &str = "battle_records";

#[derive(Clone)]
pub struct ClickhouseRepo {
    client: Client,
    database: String,
}

impl ClickhouseRepo {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }
}

/// WHERE conditions for `filter`, in the order `bind_filter` binds them.
fn filter_conditions(filter: &RecordFilter) -> Vec<&'static str> {
    let mut conditions = Vec::new();
    if filter.governor_id.is_some() {
        conditions.push("governor_id = ?");
    }
    if filter.window.is_some() {
        conditions.push("event_time_ms >= ?");
        conditions.push("event_time_ms < ?");
    }
    if filter.self_primary_commander.is_some() {
        conditions.push("self_primary_commander = ?");
    }
    if filter.self_secondary_commander.is_some() {
        conditions.push("self_secondary_commander = ?");
    }
    conditions
}

fn bind_filter(mut query: Query, filter: &RecordFilter) -> Query {
    if let Some(governor_id) = filter.governor_id {
        query = query.bind(governor_id);
    }
    if let Some(window) = filter.window {
        query = query.bind(window.start_millis).bind(window.end_millis);
    }
    if let Some(primary) = filter.self_primary_commander {
        query = query.bind(primary);
    }
    if let Some(secondary) = filter.self_secondary_commander {
        query = query.bind(secondary);
    }
    query
}

fn select_sql(conditions: &[&str]) -> String {
    let mut sql = format!("SELECT ?fields FROM {} FINAL", RECORDS_TABLE);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql
}

fn page_sql(filter: &RecordFilter, plan: &SeekPlan) -> String {
    let mut conditions = filter_conditions(filter);
    if plan.boundary.is_some() {
        conditions.push(match plan.direction {
            SeekDirection::Older => "(event_time_ms, record_id) < (?, ?)",
            SeekDirection::Newer => "(event_time_ms, record_id) > (?, ?)",
        });
    }
    let order = match plan.direction {
        SeekDirection::Older => "DESC",
        SeekDirection::Newer => "ASC",
    };
    format!(
        "{} ORDER BY event_time_ms {order}, record_id {order} LIMIT ?",
        select_sql(&conditions)
    )
}

#[async_trait]
impl BattleReportRepository for ClickhouseRepo {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        let create_records = r#"
CREATE TABLE IF NOT EXISTS battle_records (
    record_id String,
    governor_id Int64,
    event_time_ms Int64,
    raw_time Float64,
    self_primary_commander Int64,
    self_secondary_commander Int64,
    payload String,
    ingested_at DateTime64(3)
) ENGINE = ReplacingMergeTree(ingested_at)
PARTITION BY toYYYYMM(toDateTime(intDiv(event_time_ms, 1000)))
ORDER BY (governor_id, event_time_ms, record_id)
"#;

        self.client.query(create_records).execute().await?;
        Ok(())
    }

    async fn insert_records(&self, records: &[StoredRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut insert = self.client.insert(RECORDS_TABLE)?;
        for record in records {
            insert.write(record).await?;
        }
        insert.end().await?;
        debug!(count = records.len(), "inserted battle records");
        Ok(())
    }

    async fn fetch_records(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
        let sql = select_sql(&filter_conditions(filter));
        let query = bind_filter(self.client.query(&sql), filter);
        let rows = query.fetch_all::<StoredRecord>().await?;
        Ok(rows)
    }

    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        plan: &SeekPlan,
    ) -> Result<Vec<StoredRecord>> {
        let sql = page_sql(filter, plan);
        let mut query = bind_filter(self.client.query(&sql), filter);
        if let Some(boundary) = &plan.boundary {
            query = query
                .bind(boundary.sort_value)
                .bind(boundary.tiebreaker.as_str());
        }
        let rows = query
            .bind(plan.limit as u64)
            .fetch_all::<StoredRecord>()
            .await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}
