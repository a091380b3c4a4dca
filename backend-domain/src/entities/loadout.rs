// Loadout source strings and canonical snapshots

use serde::Serialize;

/// Compact loadout encodings as they appear on a combat event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadoutSource {
    /// `slot:id_craft:attr` tokens separated by commas.
    pub equipment: Option<String>,
    /// Semicolon-separated inscription ids.
    pub inscriptions: Option<String>,
    /// Semicolon-separated `id_value` pairs.
    pub armament_buffs: Option<String>,
    pub formation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EquipmentToken {
    pub slot: i64,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArmamentBuff {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Canonical structured loadout. Two snapshots describing the same loadout
/// produce the same grouping key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadoutSnapshot {
    pub equipment: Vec<EquipmentToken>,
    pub armaments: Vec<ArmamentBuff>,
    pub inscriptions: Vec<i64>,
    pub formation: Option<i64>,
}
