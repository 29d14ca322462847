//! Result store and query engine.
//!
//! [`ResultStore`] holds the summary and the batch of detail records from the
//! most recent request cycle. The batch is a flat, fixed-capacity array
//! reused in place: a new cycle overwrites slots from the front and leaves
//! older records behind beyond the new count. Queries scoped by count never
//! see those leftovers; [`ResultStore::nth`] indexes the array directly and
//! can.

use crate::record::{DetailRecord, RecordKind, SummaryRecord};

/// Width of the sensor image in pixels.
pub const FRAME_WIDTH: u16 = 320;
/// Height of the sensor image in pixels.
pub const FRAME_HEIGHT: u16 = 240;

/// Default number of batch slots.
pub const DEFAULT_BATCH_CAPACITY: usize = 10;

/// Summary and batch of the latest request cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultStore {
    summary: SummaryRecord,
    batch: Vec<Option<DetailRecord>>,
}

impl Default for ResultStore {
    fn default() -> Self { Self::with_capacity(DEFAULT_BATCH_CAPACITY) }
}

impl ResultStore {
    /// Create an empty store with `capacity` batch slots (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            summary: SummaryRecord::default(),
            batch: vec![None; capacity.max(1)],
        }
    }

    /// Number of batch slots.
    #[must_use]
    pub fn capacity(&self) -> usize { self.batch.len() }

    /// Summary of the latest cycle.
    #[must_use]
    pub const fn summary(&self) -> &SummaryRecord { &self.summary }

    /// Replace the summary at the start of a cycle.
    pub(crate) fn set_summary(&mut self, summary: SummaryRecord) {
        if usize::from(summary.count) > self.capacity() {
            tracing::warn!(
                count = summary.count,
                capacity = self.capacity(),
                "batch larger than store capacity, extra records will be dropped"
            );
        }
        self.summary = summary;
    }

    /// Overwrite slot `index`; returns `false` if it is beyond capacity.
    pub(crate) fn put(&mut self, index: usize, record: DetailRecord) -> bool {
        match self.batch.get_mut(index) {
            Some(slot) => {
                *slot = Some(record);
                true
            }
            None => false,
        }
    }

    /// Records covered by the current summary count, in scan order.
    pub fn records(&self) -> impl Iterator<Item = &DetailRecord> {
        let count = usize::from(self.summary.count).min(self.capacity());
        self.batch[..count].iter().flatten()
    }

    fn records_of(&self, kind: RecordKind) -> impl Iterator<Item = &DetailRecord> {
        self.records().filter(move |record| record.kind() == kind)
    }

    /// Number of ids learned by the active algorithm.
    #[must_use]
    pub const fn learned_id_count(&self) -> u16 { self.summary.learned_ids }

    /// Whether `id` is within the learned range.
    #[must_use]
    pub const fn is_learned(&self, id: u16) -> bool { id <= self.summary.learned_ids }

    /// Count records of `kind`, optionally restricted to one id.
    #[must_use]
    pub fn count(&self, kind: RecordKind, id: Option<u16>) -> usize {
        self.records_of(kind)
            .filter(|record| id.is_none_or(|id| record.id() == id))
            .count()
    }

    /// Count boxes, optionally restricted to one id.
    #[must_use]
    pub fn count_boxes(&self, id: Option<u16>) -> usize { self.count(RecordKind::Box, id) }

    /// Count arrows, optionally restricted to one id.
    #[must_use]
    pub fn count_arrows(&self, id: Option<u16>) -> usize { self.count(RecordKind::Arrow, id) }

    /// Whether any record of `kind` is on screen.
    #[must_use]
    pub fn appears(&self, kind: RecordKind) -> bool { self.records_of(kind).next().is_some() }

    /// Whether a record of `kind` with `id` is on screen.
    #[must_use]
    pub fn appears_with_id(&self, kind: RecordKind, id: u16) -> bool {
        self.records_of(kind).any(|record| record.id() == id)
    }

    /// Record of `kind` closest to the image centre.
    ///
    /// The score is `round(sqrt(|x - 160|)) + round(sqrt(|y - 120|))` over
    /// the record's first two fields. Ties go to the record scanned first.
    #[must_use]
    pub fn nearest_to_center(&self, kind: RecordKind) -> Option<&DetailRecord> {
        let mut best: Option<(u32, &DetailRecord)> = None;
        for record in self.records_of(kind) {
            let score = center_distance(record.anchor());
            if best.is_none_or(|(best_score, _)| score < best_score) {
                best = Some((score, record));
            }
        }
        best.map(|(_, record)| record)
    }

    /// The `n`th record (1-based) of `kind` carrying `id`.
    #[must_use]
    pub fn nth_with_id(&self, kind: RecordKind, id: u16, n: usize) -> Option<&DetailRecord> {
        let index = n.checked_sub(1)?;
        self.records_of(kind)
            .filter(|record| record.id() == id)
            .nth(index)
    }

    /// First record of `kind` carrying `id`.
    #[must_use]
    pub fn first_with_id(&self, kind: RecordKind, id: u16) -> Option<&DetailRecord> {
        self.nth_with_id(kind, id, 1)
    }

    /// Batch slot `n` (1-based) if it holds a record of `kind`.
    ///
    /// Not bounded by the summary count: once a larger batch has been seen,
    /// slots past the current count still hold its records and are returned.
    #[must_use]
    pub fn nth(&self, kind: RecordKind, n: usize) -> Option<&DetailRecord> {
        let index = n.checked_sub(1)?;
        self.batch
            .get(index)?
            .as_ref()
            .filter(|record| record.kind() == kind)
    }
}

fn center_distance((x, y): (u16, u16)) -> u32 {
    axis_score(x, FRAME_WIDTH / 2) + axis_score(y, FRAME_HEIGHT / 2)
}

fn axis_score(value: u16, center: u16) -> u32 {
    let offset = f64::from(value.abs_diff(center));
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "sqrt of a u16 offset is below 256 and non-negative"
    )]
    let score = offset.sqrt().round() as u32;
    score
}

#[cfg(test)]
mod tests;
