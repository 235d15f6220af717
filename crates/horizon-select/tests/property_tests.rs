//! Invariants that must hold at every quiescent point.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use horizon_select::prelude::*;
use parking_lot::Mutex;
use proptest::prelude::*;

const LABELS: [&str; 2] = ["selected", "starred"];
const ITEM_COUNT: usize = 8;
const SINGLE_COUNT: usize = 3;
const MULTI_COUNT: usize = 2;

fn assert_invariants(singles: &[SingleSelect], multis: &[MultiSelect]) {
    for single in singles {
        for label in LABELS {
            let holding: Vec<Item> = single.filter(|item| item.is_selected_for(label));
            assert!(holding.len() <= 1, "{label}: {holding:?}");
            assert_eq!(single.holder_for(label), holding.first().map(Item::id));
        }
    }
    for multi in multis {
        for label in LABELS {
            let expected: Vec<ItemId> = multi
                .filter(|item| item.is_selected_for(label))
                .iter()
                .map(Item::id)
                .collect();
            assert_eq!(multi.selection_for(label), expected);
            assert_eq!(multi.selected_count_for(label), expected.len());
        }
    }
}

/// One public operation, with indexes into the fixture's items and containers.
#[derive(Debug, Clone)]
enum Op {
    ItemSelect { item: usize, label: usize },
    ItemDeselect { item: usize, label: usize },
    ItemToggle { item: usize, label: usize },
    ItemExclusive { item: usize, label: usize },
    SingleSelect { single: usize, item: usize, label: usize },
    SingleDeselect { single: usize, label: usize },
    MultiExclusive { multi: usize, item: usize, label: usize },
    MultiSelectAll { multi: usize, label: usize },
    MultiInvert { multi: usize, label: usize },
    MultiToggleAll { multi: usize, label: usize },
    SingleMembership { single: usize, item: usize },
    MultiReset { multi: usize, keep: Vec<bool> },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let item = 0..ITEM_COUNT;
    let label = 0..LABELS.len();
    let single = 0..SINGLE_COUNT;
    let multi = 0..MULTI_COUNT;
    prop_oneof![
        (0..4usize, item.clone(), label.clone()).prop_map(|(action, item, label)| match action {
            0 => Op::ItemSelect { item, label },
            1 => Op::ItemDeselect { item, label },
            2 => Op::ItemToggle { item, label },
            _ => Op::ItemExclusive { item, label },
        }),
        (single.clone(), item.clone(), label.clone())
            .prop_map(|(single, item, label)| Op::SingleSelect { single, item, label }),
        (single.clone(), label.clone()).prop_map(|(single, label)| Op::SingleDeselect { single, label }),
        (multi.clone(), item.clone(), label.clone())
            .prop_map(|(multi, item, label)| Op::MultiExclusive { multi, item, label }),
        (multi.clone(), label.clone()).prop_map(|(multi, label)| Op::MultiSelectAll { multi, label }),
        (multi.clone(), label.clone()).prop_map(|(multi, label)| Op::MultiInvert { multi, label }),
        (multi.clone(), label.clone()).prop_map(|(multi, label)| Op::MultiToggleAll { multi, label }),
        (single, item).prop_map(|(single, item)| Op::SingleMembership { single, item }),
        (multi, prop::collection::vec(any::<bool>(), ITEM_COUNT))
            .prop_map(|(multi, keep)| Op::MultiReset { multi, keep }),
    ]
}

struct Fixture {
    registry: SelectionRegistry,
    items: Vec<Item>,
    singles: Vec<SingleSelect>,
    multis: Vec<MultiSelect>,
}

impl Fixture {
    /// Every item sits in one single and one multi; every third item also
    /// sits in a second single.
    fn new() -> Self {
        let registry = SelectionRegistry::new();
        let items = items(&registry, ITEM_COUNT);
        let singles: Vec<SingleSelect> = (0..SINGLE_COUNT)
            .map(|_| registry.create_single(ContainerConfig::default()).unwrap())
            .collect();
        let multis: Vec<MultiSelect> = (0..MULTI_COUNT)
            .map(|_| registry.create_multi(ContainerConfig::default()).unwrap())
            .collect();
        for (index, item) in items.iter().enumerate() {
            singles[index % SINGLE_COUNT].add([item]).unwrap();
            multis[index % MULTI_COUNT].add([item]).unwrap();
            if index % 3 == 0 {
                singles[(index + 1) % SINGLE_COUNT].add([item]).unwrap();
            }
        }
        Self {
            registry,
            items,
            singles,
            multis,
        }
    }

    fn apply(&self, op: &Op) {
        let options = |label: usize| SelectOptions::from(LABELS[label]);
        match op {
            Op::ItemSelect { item, label } => {
                self.items[*item].select_with(options(*label)).unwrap();
            }
            Op::ItemDeselect { item, label } => {
                self.items[*item].deselect_with(options(*label)).unwrap();
            }
            Op::ItemToggle { item, label } => {
                self.items[*item].toggle_selected_with(options(*label)).unwrap();
            }
            Op::ItemExclusive { item, label } => {
                self.items[*item]
                    .select_with(options(*label).exclusive())
                    .unwrap();
            }
            Op::SingleSelect { single, item, label } => {
                self.singles[*single]
                    .select_with(&self.items[*item], options(*label))
                    .unwrap();
            }
            Op::SingleDeselect { single, label } => {
                self.singles[*single].deselect_with(None, options(*label)).unwrap();
            }
            Op::MultiExclusive { multi, item, label } => {
                self.multis[*multi]
                    .select_with(&self.items[*item], options(*label).exclusive())
                    .unwrap();
            }
            Op::MultiSelectAll { multi, label } => {
                self.multis[*multi].select_all_with(options(*label)).unwrap();
            }
            Op::MultiInvert { multi, label } => {
                self.multis[*multi].invert_selection_with(options(*label)).unwrap();
            }
            Op::MultiToggleAll { multi, label } => {
                self.multis[*multi].toggle_select_all_with(options(*label)).unwrap();
            }
            Op::SingleMembership { single, item } => {
                let single = &self.singles[*single];
                let item = &self.items[*item];
                if single.contains(item) {
                    single.remove([item]).unwrap();
                } else {
                    single.add([item]).unwrap();
                }
            }
            Op::MultiReset { multi, keep } => {
                let multi = &self.multis[*multi];
                let members = multi.items();
                let kept: Vec<&Item> = members
                    .iter()
                    .zip(keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(item, _)| item)
                    .collect();
                multi.reset(kept).unwrap();
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every container index matches its members' booleans after each operation.
    #[test]
    fn prop_indexes_match_item_state(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let fixture = Fixture::new();
        for op in &ops {
            fixture.apply(op);
            assert_invariants(&fixture.singles, &fixture.multis);
        }
    }

    /// Repeating a selection changes nothing and reports only reaffirmations.
    #[test]
    fn prop_repeated_select_is_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..40),
        item in 0..ITEM_COUNT,
    ) {
        let fixture = Fixture::new();
        for op in &ops {
            fixture.apply(op);
        }
        let target = &fixture.items[item];
        target.select().unwrap();
        let before = fixture.registry.dump();

        let log = record_item(target);
        target.select().unwrap();

        prop_assert_eq!(fixture.registry.dump(), before);
        prop_assert_eq!(item_kinds(&log), vec![ItemEventKind::Reselected]);
    }
}

#[test]
fn test_reselect_is_idempotent() {
    let registry = SelectionRegistry::new();
    let single = registry.create_single(ContainerConfig::default()).unwrap();
    let item = registry.create_item();
    single.add([&item]).unwrap();
    single.select(&item).unwrap();

    let log = record_container(&single);
    let item_log = record_item(&item);
    for _ in 0..3 {
        single.select(&item).unwrap();
        item.select().unwrap();
    }

    assert!(item.is_selected());
    assert_eq!(single.holder(), Some(item.id()));
    assert_eq!(container_kinds(&log), vec![ContainerEventKind::ReselectOne; 6]);
    assert_eq!(item_kinds(&item_log), vec![ItemEventKind::Reselected; 6]);
}

#[test]
fn test_handlers_observe_committed_state() {
    let registry = SelectionRegistry::new();
    let single = registry.create_single(ContainerConfig::default()).unwrap();
    let multi = registry.create_multi(ContainerConfig::default()).unwrap();
    let items = items(&registry, 2);
    single.add(&items).unwrap();
    multi.add(&items).unwrap();
    items[0].select().unwrap();

    let observed = Arc::new(Mutex::new(Vec::new()));
    {
        let observed = observed.clone();
        let single = single.clone();
        let multi = multi.clone();
        let first = items[0].clone();
        items[0].on(ItemEventKind::Deselected, move |_| {
            observed
                .lock()
                .push((single.holder(), multi.selection(), first.is_selected()));
        });
    }
    {
        let observed = observed.clone();
        let single = single.clone();
        let multi_handle = multi.clone();
        let first = items[0].clone();
        multi.on(ContainerEventKind::SelectSome, move |_| {
            observed
                .lock()
                .push((single.holder(), multi_handle.selection(), first.is_selected()));
        });
    }

    items[1].select().unwrap();

    let expected = (Some(items[1].id()), vec![items[1].id()], false);
    assert_eq!(*observed.lock(), vec![expected.clone(), expected]);
}

#[test]
fn test_closed_container_releases_handlers() {
    let registry = SelectionRegistry::new();
    let multi = registry.create_multi(ContainerConfig::default()).unwrap();
    let item = registry.create_item();
    multi.add([&item]).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    multi.on_item(ItemEventKind::Selected, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = calls.clone();
    multi.on(ContainerEventKind::SelectAll, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    item.select().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    multi.close();
    assert!(multi.is_closed());
    assert_eq!(multi.listener_count(), 0);
    assert!(item.containers().is_empty());

    item.deselect().unwrap().select().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(item.is_selected());
    assert_eq!(multi.select(&item).unwrap_err(), SelectError::ContainerClosed);
    assert_eq!(registry.container_count(), 0);

    // closing again is harmless
    multi.close();
}

#[test]
fn test_cyclic_sharing_terminates() {
    let registry = SelectionRegistry::new();
    let items = items(&registry, 3);
    let singles: Vec<SingleSelect> = (0..3)
        .map(|_| registry.create_single(ContainerConfig::default()).unwrap())
        .collect();
    // every container shares each item with the next one
    for index in 0..3 {
        singles[index]
            .add([&items[index], &items[(index + 1) % 3]])
            .unwrap();
    }

    let total = Arc::new(AtomicUsize::new(0));
    for single in &singles {
        let total = total.clone();
        single.on(ContainerEventKind::SelectOne, move |_| {
            total.fetch_add(1, Ordering::SeqCst);
        });
    }

    for item in &items {
        item.select().unwrap();
    }
    assert_invariants(&singles, &[]);
    assert!(total.load(Ordering::SeqCst) > 0);
    assert_eq!(items.iter().filter(|item| item.is_selected()).count(), 1);
}
