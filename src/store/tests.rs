//! Unit tests for the result store queries.

use rstest::{fixture, rstest};

use super::*;
use crate::record::{ArrowRecord, BoxRecord};

fn boxed(x: u16, y: u16, id: u16) -> DetailRecord {
    DetailRecord::Box(BoxRecord {
        x_center: x,
        y_center: y,
        width: 10,
        height: 10,
        id,
    })
}

fn arrow(x: u16, y: u16, id: u16) -> DetailRecord {
    DetailRecord::Arrow(ArrowRecord {
        x_origin: x,
        y_origin: y,
        x_target: x,
        y_target: 0,
        id,
    })
}

fn load(store: &mut ResultStore, learned_ids: u16, records: &[DetailRecord]) {
    store.set_summary(SummaryRecord {
        count: u16::try_from(records.len()).expect("test batch fits u16"),
        learned_ids,
        ..SummaryRecord::default()
    });
    for (index, record) in records.iter().enumerate() {
        assert!(store.put(index, *record), "slot {index} within capacity");
    }
}

#[fixture]
fn mixed_store() -> ResultStore {
    let mut store = ResultStore::default();
    load(&mut store, 3, &[
        boxed(10, 10, 1),
        arrow(150, 100, 2),
        boxed(160, 120, 1),
        boxed(300, 200, 2),
        arrow(0, 0, 2),
    ]);
    store
}

#[rstest]
fn counts_by_kind_and_id(mixed_store: ResultStore) {
    assert_eq!(mixed_store.count_boxes(None), 3);
    assert_eq!(mixed_store.count_arrows(None), 2);
    assert_eq!(mixed_store.count_boxes(Some(1)), 2);
    assert_eq!(mixed_store.count_arrows(Some(2)), 2);
    assert_eq!(mixed_store.count_arrows(Some(1)), 0);
    assert_eq!(mixed_store.learned_id_count(), 3);
}

#[rstest]
#[case(0, true)]
#[case(3, true)]
#[case(4, false)]
fn learned_ids_are_a_prefix(mixed_store: ResultStore, #[case] id: u16, #[case] learned: bool) {
    assert_eq!(mixed_store.is_learned(id), learned);
}

#[rstest]
fn nearest_box_is_the_centred_one(mixed_store: ResultStore) {
    let nearest = mixed_store
        .nearest_to_center(RecordKind::Box)
        .expect("boxes present");
    assert_eq!(nearest.anchor(), (160, 120));
}

#[rstest]
fn nearest_arrow_uses_origin(mixed_store: ResultStore) {
    let nearest = mixed_store
        .nearest_to_center(RecordKind::Arrow)
        .expect("arrows present");
    assert_eq!(nearest.anchor(), (150, 100));
}

#[test]
fn nearest_tie_goes_to_first_scanned() {
    // |x - 160| = 4 and |y - 120| = 9 both score 2 + 3 = 5.
    let mut store = ResultStore::default();
    load(&mut store, 0, &[boxed(164, 129, 7), boxed(156, 111, 8)]);
    let nearest = store
        .nearest_to_center(RecordKind::Box)
        .expect("boxes present");
    assert_eq!(nearest.id(), 7);
}

#[test]
fn nearest_without_matches_is_none() {
    let mut store = ResultStore::default();
    load(&mut store, 0, &[arrow(1, 1, 1)]);
    assert!(store.nearest_to_center(RecordKind::Box).is_none());
}

#[rstest]
#[case(1, Some((10, 10)))]
#[case(2, Some((160, 120)))]
#[case(3, None)]
#[case(0, None)]
fn nth_with_id_counts_occurrences(
    mixed_store: ResultStore,
    #[case] n: usize,
    #[case] anchor: Option<(u16, u16)>,
) {
    assert_eq!(
        mixed_store
            .nth_with_id(RecordKind::Box, 1, n)
            .map(DetailRecord::anchor),
        anchor
    );
}

#[rstest]
fn nth_checks_slot_kind(mixed_store: ResultStore) {
    assert_eq!(
        mixed_store.nth(RecordKind::Box, 1).map(DetailRecord::id),
        Some(1)
    );
    assert!(mixed_store.nth(RecordKind::Box, 2).is_none());
    assert!(mixed_store.nth(RecordKind::Arrow, 2).is_some());
    assert!(mixed_store.nth(RecordKind::Box, 0).is_none());
    assert!(mixed_store.nth(RecordKind::Box, 11).is_none());
}

#[rstest]
fn nth_reads_stale_slots_beyond_count(mut mixed_store: ResultStore) {
    // A smaller second batch leaves slots 2.. from the first one in place.
    load(&mut mixed_store, 3, &[arrow(5, 5, 9)]);

    assert_eq!(mixed_store.count_boxes(None), 0);
    assert_eq!(mixed_store.count_arrows(None), 1);
    let stale = mixed_store
        .nth(RecordKind::Box, 3)
        .expect("slot 3 still holds the earlier box");
    assert_eq!(stale.anchor(), (160, 120));
    assert!(mixed_store.nth_with_id(RecordKind::Box, 1, 1).is_none());
}

#[test]
fn records_beyond_capacity_are_dropped() {
    let mut store = ResultStore::with_capacity(2);
    store.set_summary(SummaryRecord {
        count: 3,
        ..SummaryRecord::default()
    });
    assert!(store.put(0, boxed(1, 1, 1)));
    assert!(store.put(1, boxed(2, 2, 1)));
    assert!(!store.put(2, boxed(3, 3, 1)));
    assert_eq!(store.count_boxes(None), 2);
}

#[test]
fn zero_capacity_is_raised_to_one() {
    assert_eq!(ResultStore::with_capacity(0).capacity(), 1);
}

#[test]
fn empty_store_reports_nothing() {
    let store = ResultStore::default();
    assert_eq!(store.capacity(), DEFAULT_BATCH_CAPACITY);
    assert_eq!(store.count_boxes(None), 0);
    assert!(!store.appears(RecordKind::Arrow));
    assert!(store.nth(RecordKind::Box, 1).is_none());
}
