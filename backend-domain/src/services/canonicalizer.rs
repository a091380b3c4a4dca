// Loadout snapshot canonicalization and grouping keys

use crate::entities::{ArmamentBuff, EquipmentToken, LoadoutSnapshot, LoadoutSource};
use crate::services::{parse_armament_buffs, parse_equipment, parse_inscriptions};
use crate::value_objects::LoadoutGranularity;

/// Rounds an attribute down to its tier of ten. Non-positive tiers become 0.
pub fn normalize_attr_tier(attr: i64) -> i64 {
    let tier = attr / 10;
    if tier > 0 {
        tier * 10
    } else {
        0
    }
}

pub fn normalize_formation(formation: Option<f64>) -> Option<i64> {
    formation
        .filter(|value| value.is_finite() && *value != 0.0)
        .map(|value| value.trunc() as i64)
}

/// Parses a loadout source and canonicalizes it at `granularity`.
pub fn build_loadout_snapshot(
    source: &LoadoutSource,
    granularity: LoadoutGranularity,
) -> LoadoutSnapshot {
    let parsed = LoadoutSnapshot {
        equipment: parse_equipment(source.equipment.as_deref()),
        armaments: parse_armament_buffs(source.armament_buffs.as_deref()),
        inscriptions: parse_inscriptions(source.inscriptions.as_deref()),
        formation: normalize_formation(source.formation),
    };
    canonicalize_snapshot(&parsed, granularity)
}

/// Sorts and deduplicates every component of a snapshot and applies the
/// granularity rules. Applying it twice with the same granularity is a
/// no-op.
pub fn canonicalize_snapshot(
    snapshot: &LoadoutSnapshot,
    granularity: LoadoutGranularity,
) -> LoadoutSnapshot {
    let mut equipment: Vec<EquipmentToken> = snapshot
        .equipment
        .iter()
        .map(|token| match granularity {
            LoadoutGranularity::Exact => *token,
            LoadoutGranularity::Normalized => EquipmentToken {
                attr: token.attr.map(normalize_attr_tier),
                ..*token
            },
        })
        .collect();
    equipment.sort();
    equipment.dedup_by_key(|token| token.slot);

    let mut armaments: Vec<ArmamentBuff> = Vec::with_capacity(snapshot.armaments.len());
    for buff in sorted_armaments(&snapshot.armaments) {
        match armaments.last_mut() {
            Some(last) if last.id == buff.id => {
                if let (Some(total), Some(value)) = (last.value.as_mut(), buff.value) {
                    *total += value;
                }
            }
            _ => armaments.push(buff),
        }
    }
    if granularity == LoadoutGranularity::Normalized {
        for buff in &mut armaments {
            buff.value = None;
        }
    }

    let mut inscriptions = snapshot.inscriptions.clone();
    inscriptions.sort_unstable();
    inscriptions.dedup();

    LoadoutSnapshot {
        equipment,
        armaments,
        inscriptions,
        formation: snapshot.formation.filter(|formation| *formation != 0),
    }
}

fn sorted_armaments(armaments: &[ArmamentBuff]) -> Vec<ArmamentBuff> {
    let mut sorted = armaments.to_vec();
    sorted.sort_by(|a, b| {
        a.id.cmp(&b.id).then_with(|| {
            a.value
                .unwrap_or(0.0)
                .total_cmp(&b.value.unwrap_or(0.0))
        })
    });
    sorted
}

/// Deterministic grouping key: `eq:..|arm:..|ins:..|fm:..`.
///
/// The key does not depend on the order of any component list.
pub fn build_loadout_key(snapshot: &LoadoutSnapshot) -> String {
    let mut equipment = snapshot.equipment.clone();
    equipment.sort();
    let equipment = equipment
        .iter()
        .map(|token| {
            format!(
                "{}:{}_{}:{}",
                token.slot,
                token.id,
                token.craft.unwrap_or(0),
                token.attr.unwrap_or(0)
            )
        })
        .collect::<Vec<_>>()
        .join("|");

    let armaments = sorted_armaments(&snapshot.armaments)
        .iter()
        .map(|buff| match buff.value {
            Some(value) => format!("{}_{}", buff.id, value),
            None => buff.id.to_string(),
        })
        .collect::<Vec<_>>()
        .join("|");

    let mut inscriptions = snapshot.inscriptions.clone();
    inscriptions.sort_unstable();
    inscriptions.dedup();
    let inscriptions = inscriptions
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("|");

    let formation = snapshot
        .formation
        .map(|formation| formation.to_string())
        .unwrap_or_else(|| "none".to_string());

    format!("eq:{equipment}|arm:{armaments}|ins:{inscriptions}|fm:{formation}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(equipment: &str, inscriptions: &str, buffs: &str, formation: f64) -> LoadoutSource {
        LoadoutSource {
            equipment: Some(equipment.to_string()),
            inscriptions: Some(inscriptions.to_string()),
            armament_buffs: Some(buffs.to_string()),
            formation: Some(formation),
        }
    }

    #[test]
    fn empty_loadout_key() {
        let snapshot = build_loadout_snapshot(&LoadoutSource::default(), LoadoutGranularity::Exact);
        assert_eq!(build_loadout_key(&snapshot), "eq:|arm:|ins:|fm:none");
    }

    #[test]
    fn exact_key_layout() {
        let snapshot = build_loadout_snapshot(
            &source("2:200_1:37,1:100:5", "9;-1;4;9", "3_1.5;1_2;3_0.5", 7.0),
            LoadoutGranularity::Exact,
        );
        assert_eq!(
            build_loadout_key(&snapshot),
            "eq:1:100_0:5|2:200_1:37|arm:1_2|3_2|ins:4|9|fm:7"
        );
    }

    #[test]
    fn normalized_key_rounds_tiers_and_drops_values() {
        let snapshot = build_loadout_snapshot(
            &source("2:200_1:37,1:100:5", "9;4", "3_1.5;1_2", 7.0),
            LoadoutGranularity::Normalized,
        );
        assert_eq!(
            build_loadout_key(&snapshot),
            "eq:1:100_0:0|2:200_1:30|arm:1|3|ins:4|9|fm:7"
        );
    }

    #[test]
    fn zero_formation_means_none() {
        let snapshot = build_loadout_snapshot(&source("", "", "", 0.0), LoadoutGranularity::Exact);
        assert_eq!(snapshot.formation, None);
    }

    #[test]
    fn attr_tiers() {
        assert_eq!(normalize_attr_tier(37), 30);
        assert_eq!(normalize_attr_tier(10), 10);
        assert_eq!(normalize_attr_tier(9), 0);
        assert_eq!(normalize_attr_tier(-15), 0);
    }

    #[test]
    fn key_ignores_component_order() {
        let forward = LoadoutSnapshot {
            equipment: vec![
                EquipmentToken {
                    slot: 1,
                    id: 10,
                    craft: Some(1),
                    attr: Some(5),
                },
                EquipmentToken {
                    slot: 2,
                    id: 20,
                    craft: None,
                    attr: Some(7),
                },
            ],
            armaments: vec![
                ArmamentBuff {
                    id: 1,
                    value: Some(1.0),
                },
                ArmamentBuff {
                    id: 2,
                    value: Some(2.0),
                },
            ],
            inscriptions: vec![3, 1, 2],
            formation: Some(4),
        };
        let mut reversed = forward.clone();
        reversed.equipment.reverse();
        reversed.armaments.reverse();
        reversed.inscriptions.reverse();
        assert_eq!(build_loadout_key(&forward), build_loadout_key(&reversed));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let raw = build_loadout_snapshot(
            &source("3:1_2:55,1:5_0:19", "8;8;2", "4_1;4_2;1_0.5", 3.0),
            LoadoutGranularity::Exact,
        );
        for granularity in [LoadoutGranularity::Exact, LoadoutGranularity::Normalized] {
            let once = canonicalize_snapshot(&raw, granularity);
            let twice = canonicalize_snapshot(&once, granularity);
            assert_eq!(once, twice);
            assert_eq!(build_loadout_key(&once), build_loadout_key(&twice));
        }
    }

    #[test]
    fn exact_keys_differ_when_attrs_differ_but_normalized_keys_match() {
        let a = source("1:100_0:31", "", "1_2", 0.0);
        let b = source("1:100_0:38", "", "1_9", 0.0);
        let exact = |s: &LoadoutSource| {
            build_loadout_key(&build_loadout_snapshot(s, LoadoutGranularity::Exact))
        };
        let normalized = |s: &LoadoutSource| {
            build_loadout_key(&build_loadout_snapshot(s, LoadoutGranularity::Normalized))
        };
        assert_ne!(exact(&a), exact(&b));
        assert_eq!(normalized(&a), normalized(&b));
    }
}
