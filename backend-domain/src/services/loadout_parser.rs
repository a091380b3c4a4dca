// Parsers for the compact loadout encodings
//
// equipment:      "slot:id_craft:attr,slot:id_craft:attr"  (optionally wrapped in {})
// inscriptions:   "id;id;id"                               (-1 marks an empty socket)
// armament buffs: "id_value;id_value"

use std::collections::BTreeMap;

use crate::entities::{ArmamentBuff, EquipmentToken};

const EMPTY_INSCRIPTION: i64 = -1;

fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_integer(raw: &str) -> Option<i64> {
    parse_finite(raw).map(|v| v.trunc() as i64)
}

/// Parses equipment tokens. Tokens without a numeric slot or id are
/// dropped; a non-numeric craft or attr is left empty. The result is sorted
/// by slot and holds at most one token per slot.
pub fn parse_equipment(raw: Option<&str>) -> Vec<EquipmentToken> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let body = raw
        .trim_start_matches(|c: char| c == '{' || c.is_whitespace())
        .trim_end_matches(|c: char| c == '}' || c.is_whitespace());

    let mut tokens: Vec<EquipmentToken> = body
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(parse_equipment_token)
        .collect();
    tokens.sort();
    tokens.dedup_by_key(|token| token.slot);
    tokens
}

fn parse_equipment_token(token: &str) -> Option<EquipmentToken> {
    let mut parts = token.split(':');
    let slot = parse_integer(parts.next()?)?;
    let mut id_craft = parts.next().unwrap_or("").split('_');
    let id = parse_integer(id_craft.next()?)?;
    let craft = id_craft.next().and_then(parse_integer);
    let attr = parts.next().and_then(parse_integer);
    Some(EquipmentToken {
        slot,
        id,
        craft,
        attr,
    })
}

/// Parses a `;`-separated inscription list, skipping empty sockets and
/// non-numeric entries. Sorted ascending; duplicates are kept.
pub fn parse_inscriptions(raw: Option<&str>) -> Vec<i64> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let mut ids: Vec<i64> = raw
        .split(';')
        .filter_map(parse_integer)
        .filter(|id| *id != EMPTY_INSCRIPTION)
        .collect();
    ids.sort_unstable();
    ids
}

/// Parses `id_value` pairs. Values of a repeated id are summed; a missing
/// or non-numeric value counts as zero. Sorted by id.
pub fn parse_armament_buffs(raw: Option<&str>) -> Vec<ArmamentBuff> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let mut parts = entry.split('_');
        let Some(id) = parts.next().and_then(parse_integer) else {
            continue;
        };
        let value = parts.next().and_then(parse_finite).unwrap_or(0.0);
        *totals.entry(id).or_insert(0.0) += value;
    }
    totals
        .into_iter()
        .map(|(id, value)| ArmamentBuff {
            id,
            value: Some(value),
        })
        .collect()
}

/// Extracts positive integer ids from free-form affix text such as
/// `"1, 2;-1 3"`.
pub fn parse_affix_ids(raw: &str) -> Vec<i64> {
    let mut ids = Vec::new();
    let mut current = String::new();
    let flush = |current: &mut String, ids: &mut Vec<i64>| {
        if let Ok(id) = current.parse::<i64>() {
            if id > 0 {
                ids.push(id);
            }
        }
        current.clear();
    };
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '-' && current.is_empty()) {
            current.push(c);
        } else {
            flush(&mut current, &mut ids);
            if c == '-' {
                current.push(c);
            }
        }
    }
    flush(&mut current, &mut ids);
    ids
}

/// Parses `id_value` / `id:value` pairs separated by `;` or `,`.
pub fn parse_buff_pairs(raw: &str) -> Vec<(i64, f64)> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let mut parts = entry.split(['_', ':']);
            let id = parts.next().and_then(parse_integer)?;
            let value = parts.next().and_then(parse_finite)?;
            Some((id, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_is_parsed_and_sorted_by_slot() {
        let tokens = parse_equipment(Some("{ 2:200_1:30, 1:100_0:15 }"));
        assert_eq!(
            tokens,
            vec![
                EquipmentToken {
                    slot: 1,
                    id: 100,
                    craft: Some(0),
                    attr: Some(15)
                },
                EquipmentToken {
                    slot: 2,
                    id: 200,
                    craft: Some(1),
                    attr: Some(30)
                },
            ]
        );
    }

    #[test]
    fn equipment_drops_malformed_tokens_and_keeps_partial_ones() {
        let tokens = parse_equipment(Some("x:1_1:1,3:abc,4:400,5:500_x:y,"));
        assert_eq!(
            tokens,
            vec![
                EquipmentToken {
                    slot: 4,
                    id: 400,
                    craft: None,
                    attr: None
                },
                EquipmentToken {
                    slot: 5,
                    id: 500,
                    craft: None,
                    attr: None
                },
            ]
        );
    }

    #[test]
    fn equipment_keeps_one_token_per_slot_regardless_of_order() {
        let a = parse_equipment(Some("1:100_0:10,1:90_0:10"));
        let b = parse_equipment(Some("1:90_0:10,1:100_0:10"));
        assert_eq!(a.len(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_inputs_yield_empty_lists() {
        assert!(parse_equipment(None).is_empty());
        assert!(parse_equipment(Some("  ")).is_empty());
        assert!(parse_inscriptions(Some("")).is_empty());
        assert!(parse_armament_buffs(None).is_empty());
    }

    #[test]
    fn inscriptions_skip_empty_sockets() {
        assert_eq!(parse_inscriptions(Some("5;-1;3;x;3")), vec![3, 3, 5]);
    }

    #[test]
    fn armament_values_are_summed_per_id() {
        let buffs = parse_armament_buffs(Some("2_1.5;1_3;2_2.5;bad_1;4"));
        assert_eq!(
            buffs,
            vec![
                ArmamentBuff {
                    id: 1,
                    value: Some(3.0)
                },
                ArmamentBuff {
                    id: 2,
                    value: Some(4.0)
                },
                ArmamentBuff {
                    id: 4,
                    value: Some(0.0)
                },
            ]
        );
    }

    #[test]
    fn affix_ids_keep_positive_integers() {
        assert_eq!(parse_affix_ids("1, 22;-1 0 x7"), vec![1, 22, 7]);
        assert!(parse_affix_ids("").is_empty());
    }

    #[test]
    fn buff_pairs_accept_both_separators() {
        assert_eq!(
            parse_buff_pairs("1_2.5;3:4, 5,bad"),
            vec![(1, 2.5), (3, 4.0)]
        );
    }
}
