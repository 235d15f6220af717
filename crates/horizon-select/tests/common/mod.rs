//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use horizon_select::prelude::*;
use parking_lot::Mutex;

pub const CONTAINER_KINDS: [ContainerEventKind; 7] = [
    ContainerEventKind::SelectOne,
    ContainerEventKind::DeselectOne,
    ContainerEventKind::ReselectOne,
    ContainerEventKind::SelectNone,
    ContainerEventKind::SelectSome,
    ContainerEventKind::SelectAll,
    ContainerEventKind::ReselectAny,
];

pub const ITEM_KINDS: [ItemEventKind; 3] = [
    ItemEventKind::Selected,
    ItemEventKind::Deselected,
    ItemEventKind::Reselected,
];

pub type Log<E> = Arc<Mutex<Vec<E>>>;

/// Records every aggregate event of a container, in emission order.
pub fn record_container<C: SelectContainer>(container: &C) -> Log<ContainerEvent> {
    let log: Log<ContainerEvent> = Arc::default();
    for kind in CONTAINER_KINDS {
        let log = log.clone();
        container.on(kind, move |event| log.lock().push(event.clone()));
    }
    log
}

/// Records every per-item event of an item, in emission order.
pub fn record_item(item: &Item) -> Log<ItemEvent> {
    let log: Log<ItemEvent> = Arc::default();
    for kind in ITEM_KINDS {
        let log = log.clone();
        item.on(kind, move |event| log.lock().push(event.clone()));
    }
    log
}

/// Records every member event a container re-emits.
pub fn record_bubbled<C: SelectContainer>(container: &C) -> Log<ItemEvent> {
    let log: Log<ItemEvent> = Arc::default();
    for kind in ITEM_KINDS {
        let log = log.clone();
        container.on_item(kind, move |event| log.lock().push(event.clone()));
    }
    log
}

pub fn container_kinds(log: &Log<ContainerEvent>) -> Vec<ContainerEventKind> {
    log.lock().iter().map(|event| event.kind).collect()
}

pub fn item_kinds(log: &Log<ItemEvent>) -> Vec<ItemEventKind> {
    log.lock().iter().map(|event| event.kind).collect()
}

pub fn items(registry: &SelectionRegistry, count: usize) -> Vec<Item> {
    (0..count).map(|_| registry.create_item()).collect()
}
