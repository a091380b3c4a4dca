// Aggregation buckets and running totals

use serde::Serialize;

use crate::entities::BattleResults;

/// Running sums over a set of combat events.
///
/// `dps`, `sps` and `tps` hold summed casualty counts; divide by the summed
/// duration via [`BattleTotals::rates`] for per-second figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleTotals {
    pub kill_score: f64,
    pub deaths: f64,
    pub severely_wounded: f64,
    pub wounded: f64,
    pub enemy_kill_score: f64,
    pub enemy_deaths: f64,
    pub enemy_severely_wounded: f64,
    pub enemy_wounded: f64,
    pub dps: f64,
    pub sps: f64,
    pub tps: f64,
    pub battle_duration: f64,
}

impl BattleTotals {
    pub fn add_results(&mut self, results: &BattleResults, duration_millis: i64) {
        self.kill_score += results.kill_score;
        self.deaths += results.deaths;
        self.severely_wounded += results.severely_wounded;
        self.wounded += results.wounded;
        self.enemy_kill_score += results.enemy_kill_score;
        self.enemy_deaths += results.enemy_deaths;
        self.enemy_severely_wounded += results.enemy_severely_wounded;
        self.enemy_wounded += results.enemy_wounded;
        self.dps += results.enemy_wounded + results.enemy_severely_wounded;
        self.sps += results.enemy_severely_wounded;
        self.tps += results.severely_wounded;
        self.battle_duration += duration_millis.max(0) as f64;
    }

    pub fn merge(&mut self, other: &BattleTotals) {
        self.kill_score += other.kill_score;
        self.deaths += other.deaths;
        self.severely_wounded += other.severely_wounded;
        self.wounded += other.wounded;
        self.enemy_kill_score += other.enemy_kill_score;
        self.enemy_deaths += other.enemy_deaths;
        self.enemy_severely_wounded += other.enemy_severely_wounded;
        self.enemy_wounded += other.enemy_wounded;
        self.dps += other.dps;
        self.sps += other.sps;
        self.tps += other.tps;
        self.battle_duration += other.battle_duration;
    }

    pub fn rates(&self) -> RateSummary {
        let seconds = self.battle_duration / 1000.0;
        if seconds <= 0.0 {
            return RateSummary::default();
        }
        RateSummary {
            dps: self.dps / seconds,
            sps: self.sps / seconds,
            tps: self.tps / seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RateSummary {
    pub dps: f64,
    pub sps: f64,
    pub tps: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationBucket {
    pub count: u64,
    pub totals: BattleTotals,
}

impl AggregationBucket {
    pub fn merge(&mut self, other: &AggregationBucket) {
        self.count += other.count;
        self.totals.merge(&other.totals);
    }

    pub fn average_kill_score(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.totals.kill_score / self.count as f64
        }
    }
}

/// One month of a calendar rollup. `month_key` is `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    pub month_key: String,
    pub count: u64,
    pub totals: BattleTotals,
}

/// Twelve zero-filled months for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSeries {
    pub count: u64,
    pub totals: BattleTotals,
    pub monthly: Vec<MonthlyAggregate>,
}

/// One day of the battle log. `date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: String,
    pub battle_count: u64,
    pub npc_count: u64,
}
