//! Record aggregation
//!
//! Groups sharpening records by an arbitrary key and counts them. Used for
//! per-kind and per-operator totals, daily trend series, and ranking input.

use crate::store::{SharpenKind, SharpeningRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Count items per key
pub fn count_by<T, K, F>(items: &[T], mut key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Count items per key, keeping keys in first-encounter order
pub fn count_in_encounter_order<T, K, F>(items: &[T], mut key: F) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for item in items {
        let k = key(item);
        match slots.get(&k) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(k.clone(), counts.len());
                counts.push((k, 1));
            }
        }
    }

    counts
}

/// Record count for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Per-day counts ascending by UTC date; days without records are omitted
pub fn daily_trend<I>(timestamps: I) -> Vec<DailyCount>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in timestamps {
        *days.entry(ts.date_naive()).or_insert(0) += 1;
    }

    days.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Total count plus per-kind breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindBreakdown {
    pub total: usize,
    pub by_kind: BTreeMap<SharpenKind, usize>,
}

impl KindBreakdown {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SharpeningRecord>,
    {
        let mut breakdown = Self::default();
        for record in records {
            breakdown.add(record.kind);
        }
        breakdown
    }

    /// Count one more record of `kind`
    pub fn add(&mut self, kind: SharpenKind) {
        self.total += 1;
        *self.by_kind.entry(kind).or_insert(0) += 1;
    }

    /// Fold another breakdown into this one
    pub fn merge(&mut self, other: &KindBreakdown) {
        self.total += other.total;
        for (kind, count) in &other.by_kind {
            *self.by_kind.entry(*kind).or_insert(0) += count;
        }
    }
}
