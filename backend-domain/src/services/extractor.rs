// Flattens raw battle records into combat events

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{
    BattleResults, CombatEvent, CommanderRef, EmbeddedBattleResults, EmbeddedParticipant,
    EmbeddedRecord, LoadoutSource, MailCommander, MailCommanders, MailOpponent, MailParticipant,
    MailRecord, MailSideResults, OpponentIdentity, RawRecord, RecordOverview, SideOverview,
};
use crate::services::{
    duration_millis, finite_number, id_or_zero, normalize_raw_timestamp,
    normalize_timestamp_millis, number_or_zero, parse_affix_ids, parse_buff_pairs, text,
};
use crate::value_objects::{is_invalid_opponent, CommanderPair};

/// Events of one record, in display order. Events without a recoverable
/// time are kept here; the aggregator drops them.
pub fn extract_events(record: &RawRecord) -> Vec<CombatEvent> {
    match record {
        RawRecord::Embedded(record) => extract_embedded(record).into_iter().collect(),
        RawRecord::Mail(record) => extract_mail(record),
    }
}

/// Canonical event time of the whole record.
pub fn record_event_time(record: &RawRecord) -> Option<i64> {
    match record {
        RawRecord::Embedded(record) => embedded_event_time(record),
        RawRecord::Mail(record) => {
            normalize_raw_timestamp(record.metadata.as_ref()?.mail_time.as_ref())
        }
    }
}

fn embedded_event_time(record: &EmbeddedRecord) -> Option<i64> {
    let metadata = record.report.as_ref()?.metadata.as_ref()?;
    normalize_raw_timestamp(metadata.email_time.as_ref())
        .or_else(|| normalize_raw_timestamp(metadata.start_date.as_ref()))
}

/// The raw time field as uploaded, before unit normalization.
pub fn record_raw_time(record: &RawRecord) -> Option<f64> {
    match record {
        RawRecord::Embedded(record) => {
            let metadata = record.report.as_ref()?.metadata.as_ref()?;
            finite_number(metadata.email_time.as_ref())
                .or_else(|| finite_number(metadata.start_date.as_ref()))
        }
        RawRecord::Mail(record) => finite_number(record.metadata.as_ref()?.mail_time.as_ref()),
    }
}

/// Player id of the record owner. `None` when absent or not positive.
pub fn record_governor_id(record: &RawRecord) -> Option<i64> {
    let id = match record {
        RawRecord::Embedded(record) => {
            id_or_zero(record.report.as_ref()?.self_side.as_ref()?.player_id.as_ref())
        }
        RawRecord::Mail(record) => id_or_zero(record.sender.as_ref()?.player_id.as_ref()),
    };
    (id > 0).then_some(id)
}

pub fn record_self_pair(record: &RawRecord) -> CommanderPair {
    match record {
        RawRecord::Embedded(record) => record
            .report
            .as_ref()
            .and_then(|report| report.self_side.as_ref())
            .map(embedded_pair)
            .unwrap_or(CommanderPair::new(0, 0)),
        RawRecord::Mail(record) => mail_pair(
            record
                .sender
                .as_ref()
                .and_then(|sender| sender.commanders.as_ref()),
        ),
    }
}

/// Upload-provided identity of the record, if any.
pub fn record_source_id(record: &RawRecord) -> Option<String> {
    match record {
        RawRecord::Embedded(record) => {
            let metadata = record.metadata.as_ref()?;
            text(metadata.hash.as_ref()).or_else(|| text(metadata.parent_hash.as_ref()))
        }
        RawRecord::Mail(record) => text(record.metadata.as_ref()?.mail_id.as_ref()),
    }
}

/// Raw opponent player ids, including NPC and empty opponents.
pub fn opponent_player_ids(record: &RawRecord) -> Vec<i64> {
    match record {
        RawRecord::Embedded(record) => record
            .report
            .as_ref()
            .and_then(|report| report.enemy.as_ref())
            .map(|enemy| vec![id_or_zero(enemy.player_id.as_ref())])
            .unwrap_or_default(),
        RawRecord::Mail(record) => record
            .opponents
            .iter()
            .flatten()
            .map(|opponent| id_or_zero(opponent.player_id.as_ref()))
            .collect(),
    }
}

/// The opponent shown for a record: the enemy of an embedded record, or
/// the earliest valid opponent of a mail record.
pub fn representative_opponent(record: &RawRecord) -> Option<OpponentIdentity> {
    match record {
        RawRecord::Embedded(record) => {
            let enemy = record.report.as_ref()?.enemy.as_ref()?;
            let pair = embedded_pair(enemy);
            Some(OpponentIdentity {
                player_id: id_or_zero(enemy.player_id.as_ref()),
                primary_commander_id: pair.primary_commander_id,
                secondary_commander_id: pair.secondary_commander_id,
            })
        }
        RawRecord::Mail(record) => {
            let opponent = valid_sorted_opponents(record).into_iter().next()?;
            let pair = mail_pair(opponent.commanders.as_ref());
            Some(OpponentIdentity {
                player_id: id_or_zero(opponent.player_id.as_ref()),
                primary_commander_id: pair.primary_commander_id,
                secondary_commander_id: pair.secondary_commander_id,
            })
        }
    }
}

/// Both sides' record-level totals. Mail records use their summary block
/// when every figure is numeric, otherwise the totals are rebuilt from the
/// per-opponent results.
pub fn summarize_record(record: &RawRecord) -> Option<RecordOverview> {
    match record {
        RawRecord::Embedded(record) => {
            let results = record.report.as_ref()?.battle_results.as_ref()?;
            Some(embedded_overview(results))
        }
        RawRecord::Mail(record) => mail_overview(record),
    }
}

/// Opponents that count as real players, ordered by start tick then
/// player id.
pub fn valid_sorted_opponents(record: &MailRecord) -> Vec<&MailOpponent> {
    let mut opponents: Vec<&MailOpponent> = record
        .opponents
        .iter()
        .flatten()
        .filter(|opponent| !is_invalid_opponent(id_or_zero(opponent.player_id.as_ref())))
        .collect();
    opponents.sort_by(|a, b| compare_opponents(a, b));
    opponents
}

fn compare_opponents(a: &MailOpponent, b: &MailOpponent) -> Ordering {
    number_or_zero(a.start_tick.as_ref())
        .total_cmp(&number_or_zero(b.start_tick.as_ref()))
        .then_with(|| {
            number_or_zero(a.player_id.as_ref()).total_cmp(&number_or_zero(b.player_id.as_ref()))
        })
}

fn embedded_pair(participant: &EmbeddedParticipant) -> CommanderPair {
    let id = |commander: Option<&CommanderRef>| {
        commander.map(|c| id_or_zero(c.id.as_ref())).unwrap_or(0)
    };
    CommanderPair::new(
        id(participant.primary_commander.as_ref()),
        id(participant.secondary_commander.as_ref()),
    )
}

fn mail_pair(commanders: Option<&MailCommanders>) -> CommanderPair {
    let id = |commander: Option<&MailCommander>| {
        commander.map(|c| id_or_zero(c.id.as_ref())).unwrap_or(0)
    };
    match commanders {
        Some(commanders) => CommanderPair::new(
            id(commanders.primary.as_ref()),
            id(commanders.secondary.as_ref()),
        ),
        None => CommanderPair::new(0, 0),
    }
}

fn extract_embedded(record: &EmbeddedRecord) -> Option<CombatEvent> {
    let report = record.report.as_ref()?;
    let metadata = report.metadata.as_ref();
    let start = metadata.and_then(|m| normalize_raw_timestamp(m.start_date.as_ref()));
    let end = metadata.and_then(|m| normalize_raw_timestamp(m.end_date.as_ref()));
    let self_side = report.self_side.clone().unwrap_or_default();
    let enemy = report.enemy.clone().unwrap_or_default();
    let self_pair = embedded_pair(&self_side);
    let enemy_pair = embedded_pair(&enemy);

    Some(CombatEvent {
        self_primary_commander_id: self_pair.primary_commander_id,
        self_secondary_commander_id: self_pair.secondary_commander_id,
        enemy_player_id: id_or_zero(enemy.player_id.as_ref()),
        enemy_primary_commander_id: enemy_pair.primary_commander_id,
        enemy_secondary_commander_id: enemy_pair.secondary_commander_id,
        event_time_millis: embedded_event_time(record),
        duration_millis: duration_millis(start, end),
        results: report
            .battle_results
            .as_ref()
            .map(embedded_results)
            .unwrap_or_default(),
        loadout: LoadoutSource {
            equipment: text(self_side.equipment.as_ref()),
            inscriptions: text(self_side.inscriptions.as_ref()),
            armament_buffs: text(self_side.armament_buffs.as_ref()),
            formation: finite_number(self_side.formation.as_ref()),
        },
    })
}

fn embedded_results(results: &EmbeddedBattleResults) -> BattleResults {
    BattleResults {
        kill_score: number_or_zero(results.kill_score.as_ref()),
        deaths: number_or_zero(results.death.as_ref()),
        severely_wounded: number_or_zero(results.severely_wounded.as_ref()),
        wounded: number_or_zero(results.wounded.as_ref()),
        enemy_kill_score: number_or_zero(results.enemy_kill_score.as_ref()),
        enemy_deaths: number_or_zero(results.enemy_death.as_ref()),
        enemy_severely_wounded: number_or_zero(results.enemy_severely_wounded.as_ref()),
        enemy_wounded: number_or_zero(results.enemy_wounded.as_ref()),
    }
}

fn embedded_overview(results: &EmbeddedBattleResults) -> RecordOverview {
    RecordOverview {
        sender: SideOverview {
            troop_units: number_or_zero(results.max.as_ref()),
            remaining: number_or_zero(results.remaining.as_ref()),
            deaths: number_or_zero(results.death.as_ref()),
            severely_wounded: number_or_zero(results.severely_wounded.as_ref()),
            wounded: number_or_zero(results.wounded.as_ref()),
            kill_score: number_or_zero(results.kill_score.as_ref()),
        },
        opponent: SideOverview {
            troop_units: number_or_zero(results.enemy_max.as_ref()),
            remaining: number_or_zero(results.enemy_remaining.as_ref()),
            deaths: number_or_zero(results.enemy_death.as_ref()),
            severely_wounded: number_or_zero(results.enemy_severely_wounded.as_ref()),
            wounded: number_or_zero(results.enemy_wounded.as_ref()),
            kill_score: number_or_zero(results.enemy_kill_score.as_ref()),
        },
    }
}

fn extract_mail(record: &MailRecord) -> Vec<CombatEvent> {
    let event_time = record
        .metadata
        .as_ref()
        .and_then(|m| normalize_raw_timestamp(m.mail_time.as_ref()));
    let timeline_start = record
        .timeline
        .as_ref()
        .map(|t| number_or_zero(t.start_timestamp.as_ref()))
        .unwrap_or(0.0);
    let sender = record.sender.clone().unwrap_or_default();
    let self_pair = mail_pair(sender.commanders.as_ref());
    let loadout = mail_loadout(&sender);

    valid_sorted_opponents(record)
        .into_iter()
        .map(|opponent| {
            let start_tick = number_or_zero(opponent.start_tick.as_ref());
            let end_tick = finite_number(opponent.end_tick.as_ref()).unwrap_or(start_tick);
            let start = normalize_timestamp_millis(timeline_start + start_tick);
            let end = normalize_timestamp_millis(timeline_start + end_tick);
            let enemy_pair = mail_pair(opponent.commanders.as_ref());
            let results = opponent.battle_results.as_ref();

            CombatEvent {
                self_primary_commander_id: self_pair.primary_commander_id,
                self_secondary_commander_id: self_pair.secondary_commander_id,
                enemy_player_id: id_or_zero(opponent.player_id.as_ref()),
                enemy_primary_commander_id: enemy_pair.primary_commander_id,
                enemy_secondary_commander_id: enemy_pair.secondary_commander_id,
                event_time_millis: event_time,
                duration_millis: duration_millis(start, end),
                results: mail_results(
                    results.and_then(|r| r.sender.as_ref()),
                    results.and_then(|r| r.opponent.as_ref()),
                ),
                loadout: loadout.clone(),
            }
        })
        .collect()
}

fn mail_results(
    sender: Option<&MailSideResults>,
    opponent: Option<&MailSideResults>,
) -> BattleResults {
    let sender = side_overview(sender);
    let opponent = side_overview(opponent);
    BattleResults {
        kill_score: sender.kill_score,
        deaths: sender.deaths,
        severely_wounded: sender.severely_wounded,
        wounded: sender.wounded,
        enemy_kill_score: opponent.kill_score,
        enemy_deaths: opponent.deaths,
        enemy_severely_wounded: opponent.severely_wounded,
        enemy_wounded: opponent.wounded,
    }
}

fn side_overview(results: Option<&MailSideResults>) -> SideOverview {
    let Some(results) = results else {
        return SideOverview::default();
    };
    SideOverview {
        troop_units: number_or_zero(results.troop_units.as_ref()),
        remaining: number_or_zero(results.remaining.as_ref()),
        deaths: number_or_zero(results.dead.as_ref()),
        severely_wounded: number_or_zero(results.severely_wounded.as_ref()),
        wounded: number_or_zero(results.slightly_wounded.as_ref()),
        kill_score: number_or_zero(results.kill_points.as_ref()),
    }
}

fn is_complete(results: Option<&MailSideResults>) -> bool {
    let Some(results) = results else {
        return false;
    };
    [
        &results.troop_units,
        &results.remaining,
        &results.dead,
        &results.severely_wounded,
        &results.slightly_wounded,
        &results.kill_points,
    ]
    .into_iter()
    .all(|field| finite_number(field.as_ref()).is_some())
}

fn mail_overview(record: &MailRecord) -> Option<RecordOverview> {
    let summary = record.summary.as_ref();
    let sender = summary.and_then(|s| s.sender.as_ref());
    let opponent = summary.and_then(|s| s.opponent.as_ref());
    if is_complete(sender) && is_complete(opponent) {
        return Some(RecordOverview {
            sender: side_overview(sender),
            opponent: side_overview(opponent),
        });
    }

    let opponents = valid_sorted_opponents(record);
    if opponents.is_empty() {
        return None;
    }
    let mut overview = RecordOverview::default();
    let mut sender_remaining: Option<f64> = None;
    let mut opponent_remaining: Option<f64> = None;
    for entry in opponents {
        let results = entry.battle_results.as_ref();
        accumulate_side(
            &mut overview.sender,
            &mut sender_remaining,
            results.and_then(|r| r.sender.as_ref()),
        );
        accumulate_side(
            &mut overview.opponent,
            &mut opponent_remaining,
            results.and_then(|r| r.opponent.as_ref()),
        );
    }
    overview.sender.remaining = sender_remaining.unwrap_or(0.0);
    overview.opponent.remaining = opponent_remaining.unwrap_or(0.0);
    Some(overview)
}

fn accumulate_side(
    total: &mut SideOverview,
    remaining: &mut Option<f64>,
    results: Option<&MailSideResults>,
) {
    let side = side_overview(results);
    total.troop_units += side.troop_units;
    total.deaths += side.deaths;
    total.severely_wounded += side.severely_wounded;
    total.wounded += side.wounded;
    total.kill_score += side.kill_score;
    if let Some(value) = results.and_then(|r| finite_number(r.remaining.as_ref())) {
        *remaining = Some(remaining.map_or(value, |current| current.min(value)));
    }
}

/// Loadout of the sender: primary commander equipment and formation,
/// inscriptions and armament buffs pooled across both commanders.
fn mail_loadout(sender: &MailParticipant) -> LoadoutSource {
    let commanders = sender.commanders.as_ref();
    let primary = commanders.and_then(|c| c.primary.as_ref());
    let mut inscriptions: BTreeSet<i64> = BTreeSet::new();
    let mut buffs: BTreeMap<i64, f64> = BTreeMap::new();

    let all_commanders = commanders
        .into_iter()
        .flat_map(|c| [c.primary.as_ref(), c.secondary.as_ref()])
        .flatten();
    for commander in all_commanders {
        for armament in commander.armaments.iter().flatten() {
            if let Some(affix) = text(armament.affix.as_ref()) {
                inscriptions.extend(parse_affix_ids(&affix));
            }
            if let Some(raw) = text(armament.buffs.as_ref()) {
                for (id, value) in parse_buff_pairs(&raw) {
                    *buffs.entry(id).or_insert(0.0) += value;
                }
            }
        }
    }

    let join = |parts: Vec<String>| (!parts.is_empty()).then(|| parts.join(";"));
    LoadoutSource {
        equipment: primary.and_then(|c| text(c.equipment.as_ref())),
        inscriptions: join(inscriptions.iter().map(i64::to_string).collect()),
        armament_buffs: join(
            buffs
                .iter()
                .map(|(id, value)| format!("{id}_{value}"))
                .collect(),
        ),
        formation: primary.and_then(|c| finite_number(c.formation.as_ref())),
    }
}
