// Loadout and enemy grouping granularity

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown granularity: {0}")]
pub struct UnknownGranularity(pub String);

/// How finely loadouts are distinguished when building a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadoutGranularity {
    #[default]
    Exact,
    /// Attribute tiers rounded down to a multiple of ten, armament values dropped.
    Normalized,
}

impl LoadoutGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadoutGranularity::Exact => "exact",
            LoadoutGranularity::Normalized => "normalized",
        }
    }
}

impl FromStr for LoadoutGranularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(LoadoutGranularity::Exact),
            "normalized" => Ok(LoadoutGranularity::Normalized),
            other => Err(UnknownGranularity(other.to_string())),
        }
    }
}

/// Enemy matchup grouping: all battles of a pairing, or only those of one loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyGranularity {
    #[default]
    Overall,
    Loadout(LoadoutGranularity),
}

impl EnemyGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyGranularity::Overall => "overall",
            EnemyGranularity::Loadout(granularity) => granularity.as_str(),
        }
    }
}

impl FromStr for EnemyGranularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overall" => Ok(EnemyGranularity::Overall),
            other => other.parse().map(EnemyGranularity::Loadout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_values_case_insensitively() {
        assert_eq!(
            "Normalized".parse::<LoadoutGranularity>(),
            Ok(LoadoutGranularity::Normalized)
        );
        assert_eq!(
            "overall".parse::<EnemyGranularity>(),
            Ok(EnemyGranularity::Overall)
        );
        assert_eq!(
            "exact".parse::<EnemyGranularity>(),
            Ok(EnemyGranularity::Loadout(LoadoutGranularity::Exact))
        );
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("weekly".parse::<EnemyGranularity>().is_err());
        assert!("overall".parse::<LoadoutGranularity>().is_err());
    }
}
