// In-memory store and record builders shared by the application tests

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};
use time::OffsetDateTime;

use backend_domain::ports::{BattleReportRepository, HealthCheckService};
use backend_domain::{
    parse_date, prepare_record, seek, RecordFilter, RuntimeConfig, SeekPlan, StoredRecord,
};

use crate::{AppState, Metrics};

#[derive(Default)]
pub struct InMemoryRepository {
    records: Mutex<Vec<StoredRecord>>,
    failing: bool,
}

impl InMemoryRepository {
    fn check(&self) -> anyhow::Result<()> {
        if self.failing {
            Err(anyhow!("store unavailable"))
        } else {
            Ok(())
        }
    }

    fn snapshot(&self) -> Vec<StoredRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BattleReportRepository for InMemoryRepository {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.check()
    }

    async fn insert_records(&self, records: &[StoredRecord]) -> anyhow::Result<()> {
        self.check()?;
        let mut stored = self.records.lock().map_err(|_| anyhow!("poisoned"))?;
        for record in records {
            stored.retain(|existing| existing.record_id != record.record_id);
            stored.push(record.clone());
        }
        Ok(())
    }

    async fn fetch_records(&self, filter: &RecordFilter) -> anyhow::Result<Vec<StoredRecord>> {
        self.check()?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        plan: &SeekPlan,
    ) -> anyhow::Result<Vec<StoredRecord>> {
        let matching = self.fetch_records(filter).await?;
        Ok(seek(&matching, plan))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.check()
    }
}

struct StaticHealth;

#[async_trait]
impl HealthCheckService for StaticHealth {
    async fn check_database(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

fn build_state(repo: InMemoryRepository) -> AppState {
    AppState {
        config: RuntimeConfig::default(),
        report_repo: Arc::new(repo),
        health: Arc::new(StaticHealth),
        metrics: Arc::new(Metrics::default()),
    }
}

pub fn empty_state() -> AppState {
    build_state(InMemoryRepository::default())
}

pub fn failing_state() -> AppState {
    build_state(InMemoryRepository {
        failing: true,
        ..InMemoryRepository::default()
    })
}

/// State whose store already holds `values`, indexed as ingest would.
pub fn state_with(values: Vec<Value>) -> AppState {
    let records = values
        .iter()
        .map(|value| prepare_record(value, OffsetDateTime::UNIX_EPOCH).expect("valid fixture"))
        .collect();
    build_state(InMemoryRepository {
        records: Mutex::new(records),
        failing: false,
    })
}

/// Noon UTC of `date`, in seconds.
fn noon_seconds(date: &str) -> i64 {
    let date = parse_date(date).expect("fixture date");
    date.and_hms_opt(12, 0, 0).expect("noon").and_utc().timestamp()
}

/// Builder for single-opponent records. Defaults: self pair 10/20, a
/// player opponent 88 with pair 30/40, a one minute battle.
pub struct Battle {
    id: String,
    governor: i64,
    date: String,
    pair: (i64, i64),
    enemy: (i64, i64, i64),
    kills: (f64, f64),
    equipment: Option<String>,
    formation: Option<i64>,
}

impl Battle {
    pub fn new(id: &str, governor: i64, date: &str) -> Self {
        Self {
            id: id.to_string(),
            governor,
            date: date.to_string(),
            pair: (10, 20),
            enemy: (88, 30, 40),
            kills: (0.0, 0.0),
            equipment: None,
            formation: None,
        }
    }

    pub fn pair(mut self, primary: i64, secondary: i64) -> Self {
        self.pair = (primary, secondary);
        self
    }

    pub fn enemy(mut self, player: i64, primary: i64, secondary: i64) -> Self {
        self.enemy = (player, primary, secondary);
        self
    }

    pub fn kills(mut self, kill_score: f64, enemy_kill_score: f64) -> Self {
        self.kills = (kill_score, enemy_kill_score);
        self
    }

    pub fn equipment(mut self, equipment: &str) -> Self {
        self.equipment = Some(equipment.to_string());
        self
    }

    pub fn formation(mut self, formation: i64) -> Self {
        self.formation = Some(formation);
        self
    }

    pub fn to_value(&self) -> Value {
        let start = noon_seconds(&self.date);
        json!({
            "metadata": { "hash": self.id },
            "report": {
                "metadata": {
                    "email_time": start * 1000,
                    "start_date": start,
                    "end_date": start + 60
                },
                "self": {
                    "player_id": self.governor,
                    "primary_commander": { "id": self.pair.0 },
                    "secondary_commander": { "id": self.pair.1 },
                    "equipment": self.equipment,
                    "formation": self.formation
                },
                "enemy": {
                    "player_id": self.enemy.0,
                    "primary_commander": { "id": self.enemy.1 },
                    "secondary_commander": { "id": self.enemy.2 }
                },
                "battle_results": {
                    "kill_score": self.kills.0,
                    "enemy_kill_score": self.kills.1,
                    "severely_wounded": 1,
                    "enemy_severely_wounded": 2,
                    "enemy_wounded": 3
                }
            }
        })
    }
}

pub fn embedded(
    id: &str,
    governor: i64,
    date: &str,
    pair: (i64, i64),
    enemy_player: i64,
    kill_score: f64,
) -> Value {
    Battle::new(id, governor, date)
        .pair(pair.0, pair.1)
        .enemy(enemy_player, enemy_player.abs() * 10, 0)
        .kills(kill_score, 0.0)
        .to_value()
}

/// Multi-opponent record. Every opponent starts at tick 0 and fights for
/// 30 seconds; the sender scores 100 and the opponent 50 per encounter.
pub fn mail(id: &str, governor: i64, date: &str, opponent_ids: &[i64]) -> Value {
    let start = noon_seconds(date);
    let opponents: Vec<Value> = opponent_ids
        .iter()
        .map(|player_id| {
            json!({
                "player_id": player_id,
                "start_tick": 0,
                "end_tick": 30,
                "commanders": {
                    "primary": { "id": player_id.abs() * 10 },
                    "secondary": { "id": 0 }
                },
                "battle_results": {
                    "sender": { "kill_points": 100, "remaining": 10 },
                    "opponent": { "kill_points": 50, "remaining": 5 }
                }
            })
        })
        .collect();
    json!({
        "metadata": { "mail_id": id, "mail_time": start },
        "timeline": { "start_timestamp": start },
        "sender": {
            "player_id": governor,
            "commanders": { "primary": { "id": 10 }, "secondary": { "id": 20 } }
        },
        "opponents": opponents
    })
}
