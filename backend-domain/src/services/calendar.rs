// Dense calendar grids: twelve months of a year, or every day of a range

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::NaiveDate;

use crate::entities::{AggregationBucket, BattleTotals, CalendarSeries, DayBucket, MonthlyAggregate};
use crate::utils::{day_key, day_start_millis, millis_to_date, MILLIS_PER_DAY};
use crate::value_objects::TimeWindow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRange {
    pub month_key: String,
    pub window: TimeWindow,
}

fn first_of_month(year: i32, month: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(day_start_millis)
        .unwrap_or_default()
}

/// The twelve UTC months of `year` as half-open windows.
pub fn month_ranges(year: i32) -> Vec<MonthRange> {
    (1..=12)
        .map(|month| {
            let start = first_of_month(year, month);
            let end = if month == 12 {
                first_of_month(year + 1, 1)
            } else {
                first_of_month(year, month + 1)
            };
            MonthRange {
                month_key: format!("{year:04}-{month:02}"),
                window: TimeWindow::new(start, end),
            }
        })
        .collect()
}

fn zero_months(months: &[MonthRange]) -> Vec<MonthlyAggregate> {
    months
        .iter()
        .map(|month| MonthlyAggregate {
            month_key: month.month_key.clone(),
            count: 0,
            totals: BattleTotals::default(),
        })
        .collect()
}

fn empty_series(months: &[MonthRange]) -> CalendarSeries {
    CalendarSeries {
        count: 0,
        totals: BattleTotals::default(),
        monthly: zero_months(months),
    }
}

fn fold_month(series: &mut CalendarSeries, index: usize, bucket: &AggregationBucket) {
    series.count += bucket.count;
    series.totals.merge(&bucket.totals);
    if let Some(month) = series.monthly.get_mut(index) {
        month.count += bucket.count;
        month.totals.merge(&bucket.totals);
    }
}

/// Combined rollup of per-month aggregation results.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarRollup<K> {
    pub overall: CalendarSeries,
    pub series: BTreeMap<K, CalendarSeries>,
}

/// Merges per-month buckets into per-key series.
///
/// `per_month[i]` must hold the buckets of `months[i]`; merging follows
/// month order, so the result does not depend on which month finished
/// first. Every series, including `overall`, has one entry per month.
pub fn merge_monthly<K>(
    months: &[MonthRange],
    per_month: Vec<HashMap<K, AggregationBucket>>,
) -> CalendarRollup<K>
where
    K: Eq + Hash + Ord + Clone,
{
    let mut overall = empty_series(months);
    let mut series: BTreeMap<K, CalendarSeries> = BTreeMap::new();

    for (index, buckets) in per_month.into_iter().enumerate() {
        for (key, bucket) in buckets {
            fold_month(&mut overall, index, &bucket);
            let entry = series
                .entry(key)
                .or_insert_with(|| empty_series(months));
            fold_month(entry, index, &bucket);
        }
    }

    CalendarRollup { overall, series }
}

/// Day-by-day counters over a window, zero-filled.
#[derive(Debug, Clone)]
pub struct DailyGrid {
    days: Vec<DayBucket>,
    index: HashMap<String, usize>,
}

impl DailyGrid {
    /// One bucket per UTC day touched by `[start, end)`.
    pub fn new(window: TimeWindow) -> Self {
        let mut days = Vec::new();
        let mut index = HashMap::new();
        if !window.is_empty() {
            if let (Some(first), Some(last)) = (
                millis_to_date(window.start_millis),
                millis_to_date(window.end_millis - 1),
            ) {
                let mut cursor = day_start_millis(first);
                let last = day_start_millis(last);
                while cursor <= last {
                    if let Some(key) = day_key(cursor) {
                        index.insert(key.clone(), days.len());
                        days.push(DayBucket {
                            date: key,
                            battle_count: 0,
                            npc_count: 0,
                        });
                    }
                    cursor += MILLIS_PER_DAY;
                }
            }
        }
        Self { days, index }
    }

    /// Counts a record at `millis`. Times outside the grid are ignored.
    pub fn record(&mut self, millis: i64, battle: bool, npc: bool) -> bool {
        let Some(slot) = day_key(millis).and_then(|key| self.index.get(&key).copied()) else {
            return false;
        };
        let day = &mut self.days[slot];
        if battle {
            day.battle_count += 1;
        }
        if npc {
            day.npc_count += 1;
        }
        true
    }

    pub fn into_days(self) -> Vec<DayBucket> {
        self.days
    }
}
