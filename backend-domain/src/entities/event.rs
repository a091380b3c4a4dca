// Normalized combat event

use serde::Serialize;

use crate::entities::LoadoutSource;
use crate::value_objects::{is_invalid_opponent, CommanderPair, NPC_PLAYER_ID};

/// Casualty and score figures for both sides of one engagement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResults {
    pub kill_score: f64,
    pub deaths: f64,
    pub severely_wounded: f64,
    pub wounded: f64,
    pub enemy_kill_score: f64,
    pub enemy_deaths: f64,
    pub enemy_severely_wounded: f64,
    pub enemy_wounded: f64,
}

/// One self-vs-enemy engagement extracted from a raw record.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatEvent {
    pub self_primary_commander_id: i64,
    pub self_secondary_commander_id: i64,
    pub enemy_player_id: i64,
    pub enemy_primary_commander_id: i64,
    pub enemy_secondary_commander_id: i64,
    pub event_time_millis: Option<i64>,
    pub duration_millis: i64,
    pub results: BattleResults,
    pub loadout: LoadoutSource,
}

impl CombatEvent {
    pub fn self_pair(&self) -> CommanderPair {
        CommanderPair::new(
            self.self_primary_commander_id,
            self.self_secondary_commander_id,
        )
    }

    pub fn enemy_pair(&self) -> CommanderPair {
        CommanderPair::new(
            self.enemy_primary_commander_id,
            self.enemy_secondary_commander_id,
        )
    }

    pub fn is_npc(&self) -> bool {
        self.enemy_player_id == NPC_PLAYER_ID
    }

    pub fn is_pvp(&self) -> bool {
        !is_invalid_opponent(self.enemy_player_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentIdentity {
    pub player_id: i64,
    pub primary_commander_id: i64,
    pub secondary_commander_id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideOverview {
    pub troop_units: f64,
    pub remaining: f64,
    pub deaths: f64,
    pub severely_wounded: f64,
    pub wounded: f64,
    pub kill_score: f64,
}

/// Record-level totals for both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOverview {
    pub sender: SideOverview,
    pub opponent: SideOverview,
}
