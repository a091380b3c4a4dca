// Half-open time window in epoch milliseconds

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_millis: i64,
    pub end_millis: i64,
}

impl TimeWindow {
    pub fn new(start_millis: i64, end_millis: i64) -> Self {
        Self {
            start_millis,
            end_millis,
        }
    }

    /// `start <= t < end`
    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.start_millis && millis < self.end_millis
    }

    pub fn is_empty(&self) -> bool {
        self.end_millis <= self.start_millis
    }
}
