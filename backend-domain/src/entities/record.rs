// Raw battle records as uploaded, plus the stored row

use clickhouse::Row;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::services::{Cursor, Paginated};

/// Reads a nested object, or `None` when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Reads a list of objects, skipping elements with the wrong shape. An
/// object keyed by index is read as its values.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, item)| item).collect(),
        _ => return Ok(None),
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
    ))
}

/// Leaf fields stay `Option<Value>` so numeric drift (strings, nulls,
/// floats) is absorbed by the finite-number guard. Nested objects and lists
/// go through `lenient`/`lenient_list`, so one malformed branch is dropped
/// instead of failing the whole record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordMetadata {
    pub hash: Option<Value>,
    #[serde(alias = "parentHash")]
    pub parent_hash: Option<Value>,
}

/// Record shape carrying a single self-vs-enemy battle under `report`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddedRecord {
    #[serde(deserialize_with = "lenient")]
    pub metadata: Option<RecordMetadata>,
    #[serde(deserialize_with = "lenient")]
    pub report: Option<EmbeddedReport>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddedReport {
    #[serde(deserialize_with = "lenient")]
    pub metadata: Option<EmbeddedMetadata>,
    #[serde(rename = "self")]
    #[serde(deserialize_with = "lenient")]
    pub self_side: Option<EmbeddedParticipant>,
    #[serde(deserialize_with = "lenient")]
    pub enemy: Option<EmbeddedParticipant>,
    #[serde(deserialize_with = "lenient")]
    pub battle_results: Option<EmbeddedBattleResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddedMetadata {
    pub email_time: Option<Value>,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddedParticipant {
    pub player_id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub primary_commander: Option<CommanderRef>,
    #[serde(deserialize_with = "lenient")]
    pub secondary_commander: Option<CommanderRef>,
    pub equipment: Option<Value>,
    pub formation: Option<Value>,
    pub armament_buffs: Option<Value>,
    pub inscriptions: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommanderRef {
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddedBattleResults {
    pub max: Option<Value>,
    pub remaining: Option<Value>,
    pub kill_score: Option<Value>,
    pub death: Option<Value>,
    pub severely_wounded: Option<Value>,
    pub wounded: Option<Value>,
    pub enemy_max: Option<Value>,
    pub enemy_remaining: Option<Value>,
    pub enemy_kill_score: Option<Value>,
    pub enemy_death: Option<Value>,
    pub enemy_severely_wounded: Option<Value>,
    pub enemy_wounded: Option<Value>,
}

/// Record shape holding one sender against a list of opponents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailRecord {
    #[serde(deserialize_with = "lenient")]
    pub metadata: Option<MailMetadata>,
    #[serde(deserialize_with = "lenient")]
    pub timeline: Option<MailTimeline>,
    #[serde(deserialize_with = "lenient")]
    pub sender: Option<MailParticipant>,
    #[serde(deserialize_with = "lenient_list")]
    pub opponents: Option<Vec<MailOpponent>>,
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<MailSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailMetadata {
    pub mail_id: Option<Value>,
    pub mail_time: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailTimeline {
    pub start_timestamp: Option<Value>,
    pub end_timestamp: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailParticipant {
    pub player_id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub commanders: Option<MailCommanders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailCommanders {
    #[serde(deserialize_with = "lenient")]
    pub primary: Option<MailCommander>,
    #[serde(deserialize_with = "lenient")]
    pub secondary: Option<MailCommander>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailCommander {
    pub id: Option<Value>,
    pub equipment: Option<Value>,
    pub formation: Option<Value>,
    #[serde(deserialize_with = "lenient_list")]
    pub armaments: Option<Vec<MailArmament>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailArmament {
    pub id: Option<Value>,
    pub buffs: Option<Value>,
    pub affix: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailOpponent {
    pub player_id: Option<Value>,
    pub start_tick: Option<Value>,
    pub end_tick: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub commanders: Option<MailCommanders>,
    #[serde(deserialize_with = "lenient")]
    pub battle_results: Option<MailBattleResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailBattleResults {
    #[serde(deserialize_with = "lenient")]
    pub sender: Option<MailSideResults>,
    #[serde(deserialize_with = "lenient")]
    pub opponent: Option<MailSideResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailSummary {
    #[serde(deserialize_with = "lenient")]
    pub sender: Option<MailSideResults>,
    #[serde(deserialize_with = "lenient")]
    pub opponent: Option<MailSideResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailSideResults {
    pub troop_units: Option<Value>,
    pub remaining: Option<Value>,
    pub dead: Option<Value>,
    pub severely_wounded: Option<Value>,
    pub slightly_wounded: Option<Value>,
    pub kill_points: Option<Value>,
}

/// A battle record after shape detection.
#[derive(Debug, Clone)]
pub enum RawRecord {
    Embedded(EmbeddedRecord),
    Mail(MailRecord),
}

impl RawRecord {
    /// Detects the record shape. An `opponents` array marks a mail record
    /// even when a `report` key is also present; otherwise `report` marks an
    /// embedded record. Returns `None` for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let opponents_list = object.get("opponents").is_some_and(Value::is_array);
        if object.contains_key("report") && !opponents_list {
            EmbeddedRecord::deserialize(value)
                .ok()
                .map(RawRecord::Embedded)
        } else if object.contains_key("sender") || object.contains_key("opponents") {
            MailRecord::deserialize(value).ok().map(RawRecord::Mail)
        } else {
            None
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            RawRecord::Embedded(_) => "embedded",
            RawRecord::Mail(_) => "mail",
        }
    }
}

/// One stored battle record. `payload` keeps the uploaded JSON verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct StoredRecord {
    pub record_id: String,
    pub governor_id: i64,
    pub event_time_ms: i64,
    pub raw_time: f64,
    pub self_primary_commander: i64,
    pub self_secondary_commander: i64,
    pub payload: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub ingested_at: OffsetDateTime,
}

impl Paginated for StoredRecord {
    fn cursor(&self) -> Cursor {
        Cursor::new(self.event_time_ms, self.record_id.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestEnvelope {
    pub records: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub accepted: usize,
    pub dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_embedded_shape() {
        let value = json!({ "report": { "self": { "player_id": 1 } } });
        let record = RawRecord::from_value(&value).expect("embedded");
        assert_eq!(record.shape(), "embedded");
    }

    #[test]
    fn detects_mail_shape() {
        let value = json!({ "sender": { "player_id": 1 }, "opponents": [] });
        let record = RawRecord::from_value(&value).expect("mail");
        assert_eq!(record.shape(), "mail");
    }

    #[test]
    fn rejects_unknown_or_broken_shapes() {
        assert!(RawRecord::from_value(&json!({ "foo": 1 })).is_none());
        assert!(RawRecord::from_value(&json!([1, 2])).is_none());
        assert!(RawRecord::from_value(&json!("report")).is_none());
    }

    #[test]
    fn malformed_opponent_list_is_dropped_not_fatal() {
        let value = json!({ "sender": { "player_id": 1 }, "opponents": "nope" });
        let Some(RawRecord::Mail(mail)) = RawRecord::from_value(&value) else {
            panic!("expected mail record");
        };
        assert!(mail.opponents.is_none());
        assert!(mail.sender.is_some());
    }

    #[test]
    fn wrong_shaped_opponents_are_skipped() {
        let value = json!({
            "metadata": { "mail_id": "m-9" },
            "sender": { "player_id": 1 },
            "opponents": [
                { "player_id": 55, "start_tick": 0 },
                null,
                7,
                { "player_id": 56, "commanders": "broken" }
            ]
        });
        let Some(RawRecord::Mail(mail)) = RawRecord::from_value(&value) else {
            panic!("expected mail record");
        };
        let opponents = mail.opponents.expect("opponents");
        assert_eq!(opponents.len(), 2);
        assert!(opponents[1].commanders.is_none());
    }

    #[test]
    fn indexed_armament_object_is_read_as_a_list() {
        let value = json!({
            "sender": {
                "commanders": {
                    "primary": {
                        "id": 10,
                        "armaments": { "0": { "id": 3 }, "1": "junk" }
                    }
                }
            }
        });
        let Some(RawRecord::Mail(mail)) = RawRecord::from_value(&value) else {
            panic!("expected mail record");
        };
        let primary = mail
            .sender
            .and_then(|sender| sender.commanders)
            .and_then(|commanders| commanders.primary)
            .expect("primary commander");
        assert_eq!(primary.armaments.map(|list| list.len()), Some(1));
    }

    #[test]
    fn scalar_commander_keeps_the_rest_of_the_report() {
        let value = json!({
            "report": {
                "metadata": { "email_time": 1_700_000_000_000_i64 },
                "self": { "player_id": 7, "primary_commander": 10 },
                "battle_results": { "kill_score": 5 }
            }
        });
        let Some(RawRecord::Embedded(record)) = RawRecord::from_value(&value) else {
            panic!("expected embedded record");
        };
        let report = record.report.expect("report");
        let self_side = report.self_side.expect("self side");
        assert!(self_side.primary_commander.is_none());
        assert_eq!(self_side.player_id, Some(json!(7)));
        assert!(report.battle_results.is_some());
    }

    #[test]
    fn opponents_array_wins_over_report_key() {
        let value = json!({ "report": {}, "opponents": [] });
        let record = RawRecord::from_value(&value).expect("record");
        assert_eq!(record.shape(), "mail");

        let value = json!({ "report": {}, "opponents": null });
        let record = RawRecord::from_value(&value).expect("record");
        assert_eq!(record.shape(), "embedded");
    }

    #[test]
    fn tolerates_null_and_string_leaves() {
        let value = json!({
            "report": {
                "metadata": { "email_time": "1700000000", "start_date": null },
                "self": null,
                "battle_results": { "kill_score": "12.5" }
            }
        });
        assert!(RawRecord::from_value(&value).is_some());
    }
}
