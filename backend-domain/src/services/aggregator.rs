// Keyed aggregation of combat events over a half-open window

use std::collections::HashMap;
use std::hash::Hash;

use crate::entities::{AggregationBucket, CombatEvent};
use crate::value_objects::{is_invalid_opponent, CommanderPair, TimeWindow};

/// Accumulates events into lazily created buckets.
///
/// Events with no time, or a time outside the window, are skipped, as are
/// events for which the key function returns `None`.
#[derive(Debug, Clone)]
pub struct Aggregator<K> {
    window: TimeWindow,
    buckets: HashMap<K, AggregationBucket>,
    accepted: u64,
}

impl<K: Eq + Hash> Aggregator<K> {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            buckets: HashMap::new(),
            accepted: 0,
        }
    }

    /// Returns whether the event landed in a bucket.
    pub fn add<F>(&mut self, event: &CombatEvent, key_fn: F) -> bool
    where
        F: FnOnce(&CombatEvent) -> Option<K>,
    {
        let Some(time) = event.event_time_millis else {
            return false;
        };
        if !self.window.contains(time) {
            return false;
        }
        let Some(key) = key_fn(event) else {
            return false;
        };
        let bucket = self.buckets.entry(key).or_default();
        bucket.count += 1;
        bucket.totals.add_results(&event.results, event.duration_millis);
        self.accepted += 1;
        true
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn into_buckets(self) -> HashMap<K, AggregationBucket> {
        self.buckets
    }
}

pub fn aggregate<'a, K, I, F>(
    events: I,
    window: TimeWindow,
    mut key_fn: F,
) -> HashMap<K, AggregationBucket>
where
    K: Eq + Hash,
    I: IntoIterator<Item = &'a CombatEvent>,
    F: FnMut(&CombatEvent) -> Option<K>,
{
    let mut aggregator = Aggregator::new(window);
    for event in events {
        aggregator.add(event, &mut key_fn);
    }
    aggregator.into_buckets()
}

/// Self commander pairing of player-vs-player events with a real primary.
pub fn self_pair_key(event: &CombatEvent) -> Option<CommanderPair> {
    if !event.is_pvp() {
        return None;
    }
    let pair = event.self_pair();
    pair.has_primary().then_some(pair)
}

/// Enemy commander pairing, excluding NPC and empty opponents.
pub fn enemy_pair_key(event: &CombatEvent) -> Option<CommanderPair> {
    if !event.is_pvp() || is_invalid_opponent(event.enemy_primary_commander_id) {
        return None;
    }
    let pair = event.enemy_pair();
    pair.has_primary().then_some(pair)
}

/// Single bucket for every player-vs-player event.
pub fn overall_key(event: &CombatEvent) -> Option<()> {
    event.is_pvp().then_some(())
}
