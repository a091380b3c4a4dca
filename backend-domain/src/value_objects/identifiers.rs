// Identifier value objects

use std::fmt;

use serde::{Deserialize, Serialize};

/// Player id used by the game for non-player (NPC) opponents.
pub const NPC_PLAYER_ID: i64 = -2;

/// Opponent ids that never count as a real opponent.
pub const INVALID_OPPONENT_IDS: [i64; 2] = [NPC_PLAYER_ID, 0];

pub fn is_invalid_opponent(id: i64) -> bool {
    INVALID_OPPONENT_IDS.contains(&id)
}

/// Ordered (primary, secondary) commander identity of one side of a battle.
///
/// A secondary of `0` means the march had no secondary commander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommanderPair {
    pub primary_commander_id: i64,
    pub secondary_commander_id: i64,
}

impl CommanderPair {
    pub fn new(primary_commander_id: i64, secondary_commander_id: i64) -> Self {
        Self {
            primary_commander_id,
            secondary_commander_id,
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary_commander_id > 0
    }
}

impl fmt::Display for CommanderPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.primary_commander_id, self.secondary_commander_id
        )
    }
}
