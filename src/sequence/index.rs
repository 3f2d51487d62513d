use chrono::NaiveDate;

use crate::foundation::error::{ShorelineError, ShorelineResult};
use crate::sequence::snapshot::Snapshot;

/// Tie-break applied when two snapshots share a date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateDatePolicy {
    /// Keep the record that appeared first in source order.
    #[default]
    KeepFirst,
    /// Keep the record that appeared last in source order.
    KeepLast,
}

/// Date-ascending, date-unique list of snapshots for one lake.
///
/// Sorted once at construction; every lookup afterwards is O(1) by position or O(log n) by date.
#[derive(Clone, Debug, Default)]
pub struct SequenceIndex {
    snapshots: Vec<Snapshot>,
}

impl SequenceIndex {
    /// Build an index from snapshots in any order.
    pub fn new(snapshots: Vec<Snapshot>, policy: DuplicateDatePolicy) -> Self {
        let incoming = snapshots.len();
        let mut snapshots = snapshots;
        // Stable sort keeps source order among equal dates, which the policy then relies on.
        snapshots.sort_by_key(|s| s.date);

        let mut out: Vec<Snapshot> = Vec::with_capacity(snapshots.len());
        for snap in snapshots {
            match out.last_mut() {
                Some(prev) if prev.date == snap.date => {
                    tracing::warn!(date = %snap.date, ?policy, "duplicate snapshot date");
                    if policy == DuplicateDatePolicy::KeepLast {
                        *prev = snap;
                    }
                }
                _ => out.push(snap),
            }
        }

        tracing::debug!(incoming, kept = out.len(), "built sequence index");
        Self { snapshots: out }
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// `true` when the lake has no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at `position`.
    pub fn at(&self, position: usize) -> ShorelineResult<&Snapshot> {
        self.snapshots
            .get(position)
            .ok_or_else(|| ShorelineError::out_of_range(position, self.len()))
    }

    /// Position of the snapshot dated exactly `date`.
    pub fn index_of_date(&self, date: NaiveDate) -> ShorelineResult<usize> {
        self.snapshots
            .binary_search_by_key(&date, |s| s.date)
            .map_err(|_| ShorelineError::not_found(format!("no snapshot dated {date}")))
    }

    /// Position of the latest snapshot dated on or before `date`, falling back to the first
    /// snapshot when `date` precedes them all. `None` only for an empty index.
    pub fn nearest_index(&self, date: NaiveDate) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        match self.snapshots.binary_search_by_key(&date, |s| s.date) {
            Ok(i) => Some(i),
            Err(0) => Some(0),
            Err(i) => Some(i - 1),
        }
    }

    /// Following position, wrapping from the last back to `0`.
    pub fn next(&self, position: usize) -> ShorelineResult<usize> {
        self.check(position)?;
        Ok((position + 1) % self.len())
    }

    /// Preceding position, wrapping from `0` to the last.
    pub fn prev(&self, position: usize) -> ShorelineResult<usize> {
        self.check(position)?;
        Ok((position + self.len() - 1) % self.len())
    }

    /// Snapshots from `position` to the end, inclusive. Empty when `position >= len`.
    pub fn iter_from(&self, position: usize) -> &[Snapshot] {
        self.snapshots.get(position..).unwrap_or(&[])
    }

    /// All snapshots in date order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// First and last date, if any.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.snapshots.first()?.date, self.snapshots.last()?.date))
    }

    fn check(&self, position: usize) -> ShorelineResult<()> {
        if position < self.len() {
            Ok(())
        } else {
            Err(ShorelineError::out_of_range(position, self.len()))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/index.rs"]
mod tests;
