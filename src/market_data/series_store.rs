use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::types::PriceRecord;

/// Scale used for volume bars when the series cannot provide a real ratio.
pub const FALLBACK_VOLUME_SCALE: f64 = 0.0001;

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Combine `existing` with `incoming`, keeping one record per calendar date.
///
/// * For a date present in both inputs the `incoming` record wins.
/// * Within a single input, a later record for a date replaces an earlier one.
/// * The result is sorted ascending by date, so backfilled dates land at their
///   chronological position rather than at the end.
/// * An empty `incoming` returns `existing` unchanged.
pub fn merge(existing: &[PriceRecord], incoming: &[PriceRecord]) -> Vec<PriceRecord> {
    if incoming.is_empty() {
        return existing.to_vec();
    }

    let mut by_date: BTreeMap<NaiveDate, PriceRecord> = BTreeMap::new();
    for record in existing.iter().chain(incoming) {
        by_date.insert(record.date, *record);
    }
    by_date.into_values().collect()
}

// ---------------------------------------------------------------------------
// SeriesStore
// ---------------------------------------------------------------------------

/// Ordered daily history for one ticker.
///
/// Dates are unique and strictly increasing.  The store is never mutated in
/// place: [`SeriesStore::merge`] returns the next store, which the owner
/// swaps in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStore {
    records: Vec<PriceRecord>,
}

impl SeriesStore {
    /// Build a store from records in any order.  Duplicated dates keep the
    /// last occurrence.
    pub fn from_records(records: Vec<PriceRecord>) -> Self {
        Self {
            records: merge(&[], &records),
        }
    }

    /// Return the store that results from merging `incoming` into `self`.
    pub fn merge(&self, incoming: &[PriceRecord]) -> Self {
        let records = merge(&self.records, incoming);
        debug!(
            before = self.records.len(),
            incoming = incoming.len(),
            after = records.len(),
            "series merged"
        );
        Self { records }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adjusted closes, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.adj_close).collect()
    }

    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Ratio that brings volume bars onto the price axis:
    /// `max(adj_close) / max(volume)`.
    ///
    /// Falls back to [`FALLBACK_VOLUME_SCALE`] when the store is empty, every
    /// volume is zero, or the ratio is not finite.
    pub fn volume_scale(&self) -> f64 {
        let max_close = self
            .records
            .iter()
            .map(|r| r.adj_close)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_volume = self.records.iter().map(|r| r.volume).max().unwrap_or(0);

        if max_volume == 0 {
            return FALLBACK_VOLUME_SCALE;
        }

        let scale = max_close / max_volume as f64;
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            FALLBACK_VOLUME_SCALE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
