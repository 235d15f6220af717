//! The diff/commit/notify engine.
//!
//! Every mutating operation runs as one [`Transaction`]:
//!
//! 1. **Plan** - requested selections and deselections are staged on an
//!    overlay of item booleans. Cross-container effects (single-choice
//!    displacement, exclusive picks, removal from every container holding a
//!    deselected item) are followed breadth-first over the membership graph
//!    while planning, never by listening to the engine's own events.
//! 2. **Commit** - staged booleans are written and every touched
//!    `(container, label)` index is rebuilt from its members' final booleans.
//! 3. **Notify** - the returned [`Dispatch`] is emitted by the caller after
//!    the registry lock is released, so every handler observes settled state.
//!
//! A transaction whose net diff, reaffirmations and membership changes are
//! all empty commits nothing and produces an empty dispatch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{ContainerId, ItemId};

use crate::events::{
    ContainerEvent, ContainerEventKind, ContainerObservers, ContainerPayload, ItemEvent,
    ItemEventKind, ItemObservers, SelectionDiff,
};
use crate::graph::{ContainerKind, Graph};
use crate::label::Label;
use crate::options::{EventOptions, ExternalChange, SelectOptions};

type ItemKey = (ItemId, Label);
type IndexKey = (ContainerId, Label);

/// Where an exclusive selection deselects the target's selected peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exclusive {
    /// Not exclusive.
    No,
    /// Only inside the given multi-choice container.
    In(ContainerId),
    /// In every multi-choice container holding the target.
    Everywhere,
}

impl Exclusive {
    /// The scope an item-level call with `exclusive` set reaches.
    pub fn for_item(exclusive: bool) -> Self {
        if exclusive { Self::Everywhere } else { Self::No }
    }

    /// The scope a container-level call with `exclusive` set reaches.
    pub fn for_container(exclusive: bool, container: ContainerId) -> Self {
        if exclusive { Self::In(container) } else { Self::No }
    }

    fn covers(self, container: ContainerId) -> bool {
        match self {
            Self::No => false,
            Self::In(scope) => scope == container,
            Self::Everywhere => true,
        }
    }
}

/// One logical selection operation over a registry graph.
pub(crate) struct Transaction<'g> {
    graph: &'g mut Graph,
    options: SelectOptions,
    origin: Option<ItemId>,
    /// Committed value of every staged boolean.
    original: HashMap<ItemKey, bool>,
    staged: HashMap<ItemKey, bool>,
    staged_order: Vec<ItemKey>,
    /// Planned single-choice holders, overriding the committed index.
    holders: HashMap<IndexKey, Option<ItemId>>,
    reaffirmed: Vec<ItemKey>,
    touched: Vec<IndexKey>,
    before: HashMap<IndexKey, Vec<ItemId>>,
    external: HashMap<ContainerId, ExternalChange>,
    structural: bool,
    released: Vec<ItemId>,
}

impl<'g> Transaction<'g> {
    pub fn new(graph: &'g mut Graph, options: &SelectOptions) -> Self {
        Self {
            graph,
            options: options.clone(),
            origin: None,
            original: HashMap::new(),
            staged: HashMap::new(),
            staged_order: Vec::new(),
            holders: HashMap::new(),
            reaffirmed: Vec::new(),
            touched: Vec::new(),
            before: HashMap::new(),
            external: HashMap::new(),
            structural: false,
            released: Vec::new(),
        }
    }

    /// Marks the item whose own notification `silent_locally` suppresses.
    pub fn set_origin(&mut self, item: ItemId) {
        self.origin = Some(item);
    }

    pub fn has_item(&self, item: ItemId) -> bool {
        self.graph.items.contains_key(item)
    }

    /// The planned boolean of `item` for `label`.
    pub fn flag(&self, item: ItemId, label: &Label) -> bool {
        match self.staged.get(&(item, label.clone())) {
            Some(value) => *value,
            None => self.graph.items.get(item).is_some_and(|record| record.flag(label)),
        }
    }

    /// Current members of `container`.
    pub fn members(&self, container: ContainerId) -> Vec<ItemId> {
        self.graph
            .containers
            .get(container)
            .map(|record| record.members.clone())
            .unwrap_or_default()
    }

    /// The planned single-choice holder of `container` for `label`.
    ///
    /// A committed holder that has since left the container does not count.
    pub fn holder(&self, container: ContainerId, label: &Label) -> Option<ItemId> {
        if let Some(holder) = self.holders.get(&(container, label.clone())) {
            return *holder;
        }
        let record = self.graph.containers.get(container)?;
        record.holder(label).filter(|holder| record.holds(*holder))
    }

    /// Whether `item` is in the committed index of `container` for `label`.
    pub fn is_indexed(&self, container: ContainerId, item: ItemId, label: &Label) -> bool {
        self.graph
            .containers
            .get(container)
            .is_some_and(|record| record.index.contains(label, item))
    }

    /// Committed selected count of `container` for `label`.
    pub fn selected_count(&self, container: ContainerId, label: &Label) -> usize {
        self.graph
            .containers
            .get(container)
            .map_or(0, |record| record.selected_count(label))
    }

    fn touch(&mut self, container: ContainerId, label: &Label) {
        let key = (container, label.clone());
        if self.before.contains_key(&key) {
            return;
        }
        let Some(record) = self.graph.containers.get(container) else {
            return;
        };
        if !record.mirrors(label) {
            return;
        }
        self.before.insert(key.clone(), record.selection(label));
        self.touched.push(key);
    }

    fn touch_index(&mut self, container: ContainerId) {
        let labels = self
            .graph
            .containers
            .get(container)
            .map(|record| record.index.labels())
            .unwrap_or_default();
        for label in labels {
            self.touch(container, &label);
        }
    }

    /// The committed boolean of `item` for `label`, ignoring the plan.
    fn committed(&self, item: ItemId, label: &Label) -> bool {
        match self.original.get(&(item, label.clone())) {
            Some(value) => *value,
            None => self.graph.items.get(item).is_some_and(|record| record.flag(label)),
        }
    }

    fn stage(&mut self, item: ItemId, label: &Label, value: bool) {
        let key = (item, label.clone());
        if !self.original.contains_key(&key) {
            let committed = self.committed(item, label);
            self.original.insert(key.clone(), committed);
            self.staged_order.push(key.clone());
        }
        self.staged.insert(key, value);
    }

    /// Labels `item` is planned to hold true.
    fn selected_labels(&self, item: ItemId) -> Vec<Label> {
        let Some(record) = self.graph.items.get(item) else {
            return Vec::new();
        };
        let mut labels: Vec<Label> = record
            .flags
            .keys()
            .chain(self.staged.keys().filter(|(id, _)| *id == item).map(|(_, label)| label))
            .filter(|label| self.flag(item, label))
            .cloned()
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Plans `item` becoming selected for `label`.
    ///
    /// An item selected in the committed state is recorded as reaffirmed,
    /// even if an earlier step of the same plan displaced it. Single-choice
    /// containers holding the item displace their previous holder; every
    /// multi-choice container covered by `exclusive` deselects its other
    /// selected members.
    pub fn select(&mut self, item: ItemId, label: &Label, exclusive: Exclusive) {
        if !self.has_item(item) {
            return;
        }
        if self.committed(item, label) {
            self.reaffirmed.push((item, label.clone()));
        }
        if !self.flag(item, label) {
            self.stage(item, label, true);
        }
        tracing::trace!(target: targets::ENGINE, ?item, %label, ?exclusive, "plan select");

        let containers = self.graph.containers_for(item).to_vec();
        for container in containers {
            let Some(record) = self.graph.containers.get(container) else {
                continue;
            };
            if !record.mirrors(label) {
                continue;
            }
            let kind = record.kind;
            self.touch(container, label);
            match kind {
                ContainerKind::Single => {
                    if let Some(previous) = self.holder(container, label) {
                        if previous != item {
                            self.deselect(previous, label);
                        }
                    }
                    self.holders.insert((container, label.clone()), Some(item));
                }
                ContainerKind::Multi if exclusive.covers(container) => {
                    for member in self.members(container) {
                        if member != item && self.flag(member, label) {
                            self.deselect(member, label);
                        }
                    }
                }
                ContainerKind::Multi => {}
            }
        }
    }

    /// Plans `item` becoming deselected for `label` in every container.
    pub fn deselect(&mut self, item: ItemId, label: &Label) {
        if !self.flag(item, label) {
            return;
        }
        self.stage(item, label, false);
        tracing::trace!(target: targets::ENGINE, ?item, %label, "plan deselect");

        let containers = self.graph.containers_for(item).to_vec();
        for container in containers {
            let Some(record) = self.graph.containers.get(container) else {
                continue;
            };
            if !record.mirrors(label) {
                continue;
            }
            let kind = record.kind;
            self.touch(container, label);
            if kind == ContainerKind::Single && self.holder(container, label) == Some(item) {
                self.holders.insert((container, label.clone()), None);
            }
        }
    }

    /// Mirrors the selected labels of newly joined `items` into `container`.
    ///
    /// In a single-choice container the newest selected member wins and the
    /// previous holder is deselected.
    fn absorb(&mut self, container: ContainerId, items: &[ItemId]) {
        for &item in items {
            for label in self.selected_labels(item) {
                let Some(record) = self.graph.containers.get(container) else {
                    return;
                };
                if !record.mirrors(&label) {
                    continue;
                }
                let kind = record.kind;
                self.touch(container, &label);
                if kind == ContainerKind::Single {
                    if let Some(previous) = self.holder(container, &label) {
                        if previous != item {
                            self.deselect(previous, &label);
                        }
                    }
                    self.holders.insert((container, label.clone()), Some(item));
                }
            }
        }
    }

    /// Adds `items` to `container`.
    pub fn add_members(&mut self, container: ContainerId, items: &[ItemId]) {
        self.touch_index(container);
        let joined = self.graph.register(container, items);
        if joined.is_empty() {
            return;
        }
        self.structural = true;
        self.external.insert(container, ExternalChange::Add);
        self.absorb(container, &joined);
    }

    /// Removes `items` from `container`. Removed items keep their booleans.
    pub fn remove_members(&mut self, container: ContainerId, items: &[ItemId]) {
        self.touch_index(container);
        let left = self.graph.unregister(container, items);
        if left.is_empty() {
            return;
        }
        self.structural = true;
        self.external.insert(container, ExternalChange::Remove);
    }

    /// Replaces the members of `container` and rebuilds its index from the
    /// new members' booleans.
    pub fn reset_members(&mut self, container: ContainerId, items: &[ItemId]) {
        self.touch_index(container);
        let old = self.members(container);
        self.graph.replace(container, &old, items);
        self.structural = true;
        self.external.insert(container, ExternalChange::Reset);
        let current = self.members(container);
        self.absorb(container, &current);
    }

    /// Removes `item` from every container and releases its record on commit.
    pub fn destroy_item(&mut self, item: ItemId) {
        let containers = self.graph.containers_for(item).to_vec();
        for container in containers {
            self.touch_index(container);
            self.graph.unregister(container, &[item]);
            self.external.insert(container, ExternalChange::Destroy);
        }
        self.structural = true;
        self.released.push(item);
    }

    /// Applies the plan and returns the notifications to emit.
    #[tracing::instrument(skip_all, target = "horizon_select::engine", level = "trace")]
    pub fn commit(self) -> Dispatch {
        let Transaction {
            graph,
            options,
            origin,
            original,
            staged,
            staged_order,
            reaffirmed,
            touched,
            before,
            external,
            structural,
            released,
            ..
        } = self;

        let changed: Vec<(ItemId, Label, bool)> = staged_order
            .into_iter()
            .filter_map(|key| {
                let value = staged.get(&key).copied()?;
                (original.get(&key).copied() != Some(value)).then_some((key.0, key.1, value))
            })
            .collect();

        let mut seen = HashSet::new();
        let reaffirmed: Vec<ItemKey> = reaffirmed
            .into_iter()
            .filter(|key| staged.get(key).copied().unwrap_or(true) && seen.insert(key.clone()))
            .collect();

        if changed.is_empty() && reaffirmed.is_empty() && !structural {
            tracing::trace!(target: targets::ENGINE, "empty diff, nothing to commit");
            return Dispatch::default();
        }

        // Commit: item booleans first, then every touched index.
        let Graph { items, containers } = &mut *graph;
        for ((item, label), value) in &staged {
            if let Some(record) = items.get_mut(*item) {
                record.flags.insert(label.clone(), *value);
            }
        }

        let mut after: HashMap<IndexKey, Vec<ItemId>> = HashMap::new();
        for key in &touched {
            let (container, label) = key;
            let Some(record) = containers.get_mut(*container) else {
                continue;
            };
            let selected: Vec<ItemId> = record
                .members
                .iter()
                .copied()
                .filter(|member| items.get(*member).is_some_and(|item| item.flag(label)))
                .collect();
            debug_assert!(
                record.kind == ContainerKind::Multi || selected.len() <= 1,
                "single-choice container planned with more than one holder"
            );
            record.index.store(label, &selected);
            after.insert(key.clone(), selected);
        }

        tracing::debug!(
            target: targets::ENGINE,
            changed = changed.len(),
            reaffirmed = reaffirmed.len(),
            indexes = touched.len(),
            silent = options.silent,
            "committed selection"
        );

        let mut dispatch = Dispatch::default();
        if !options.silent {
            let suppressed = if options.silent_locally { origin } else { None };

            let item_events = changed
                .iter()
                .map(|(item, label, value)| {
                    let kind = if *value {
                        ItemEventKind::Selected
                    } else {
                        ItemEventKind::Deselected
                    };
                    (kind, *item, label)
                })
                .chain(
                    reaffirmed
                        .iter()
                        .map(|(item, label)| (ItemEventKind::Reselected, *item, label)),
                );
            for (kind, item, label) in item_events {
                if suppressed == Some(item) {
                    continue;
                }
                let Some(record) = items.get(item) else {
                    continue;
                };
                let bubble = record
                    .containers
                    .iter()
                    .filter_map(|id| containers.get(*id))
                    .filter(|container| container.mirrors(label))
                    .map(|container| container.observers.clone())
                    .collect();
                dispatch.items.push(PendingItemEvent {
                    observers: record.observers.clone(),
                    bubble,
                    event: ItemEvent {
                        kind,
                        item,
                        options: EventOptions::from_request(&options, label.clone()),
                    },
                });
            }

            for key in &touched {
                let (container, label) = key;
                let Some(record) = containers.get(*container) else {
                    continue;
                };
                let previous = before.get(key).map(Vec::as_slice).unwrap_or_default();
                let current = after.get(key).map(Vec::as_slice).unwrap_or_default();
                let diff = SelectionDiff {
                    selected: current.iter().copied().filter(|id| !previous.contains(id)).collect(),
                    deselected: previous.iter().copied().filter(|id| !current.contains(id)).collect(),
                };
                let again: Vec<ItemId> = reaffirmed
                    .iter()
                    .filter(|(item, reaffirmed_label)| reaffirmed_label == label && current.contains(item))
                    .map(|(item, _)| *item)
                    .collect();

                let mut event_options = EventOptions::from_request(&options, label.clone());
                event_options.external = external.get(container).copied();
                let mut push = |kind, payload| {
                    dispatch.containers.push(PendingContainerEvent {
                        observers: record.observers.clone(),
                        event: ContainerEvent {
                            kind,
                            container: *container,
                            payload,
                            options: event_options.clone(),
                        },
                    });
                };

                match record.kind {
                    ContainerKind::Single => {
                        for item in &diff.deselected {
                            push(ContainerEventKind::DeselectOne, ContainerPayload::Item(*item));
                        }
                        for item in &diff.selected {
                            push(ContainerEventKind::SelectOne, ContainerPayload::Item(*item));
                        }
                        for item in again {
                            push(ContainerEventKind::ReselectOne, ContainerPayload::Item(item));
                        }
                    }
                    ContainerKind::Multi => {
                        if !diff.is_empty() {
                            let kind = if current.is_empty() {
                                ContainerEventKind::SelectNone
                            } else if current.len() == record.members.len() {
                                ContainerEventKind::SelectAll
                            } else {
                                ContainerEventKind::SelectSome
                            };
                            push(kind, ContainerPayload::Diff(diff));
                        }
                        if !again.is_empty() {
                            push(ContainerEventKind::ReselectAny, ContainerPayload::Reselected(again));
                        }
                    }
                }
            }
        }

        for item in released {
            items.remove(item);
            tracing::debug!(target: targets::MEMBERSHIP, ?item, "released item");
        }

        dispatch
    }
}

struct PendingItemEvent {
    observers: Arc<ItemObservers>,
    bubble: Vec<Arc<ContainerObservers>>,
    event: ItemEvent,
}

struct PendingContainerEvent {
    observers: Arc<ContainerObservers>,
    event: ContainerEvent,
}

/// Notifications produced by a committed transaction.
///
/// Emitted only after the registry lock is released.
#[derive(Default)]
pub(crate) struct Dispatch {
    items: Vec<PendingItemEvent>,
    containers: Vec<PendingContainerEvent>,
}

impl Dispatch {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.containers.is_empty()
    }

    /// Fires per-item notifications (with their bubbled copies), then
    /// per-container notifications.
    pub fn emit(self) {
        if self.is_empty() {
            return;
        }
        tracing::trace!(
            target: targets::ENGINE,
            items = self.items.len(),
            containers = self.containers.len(),
            "dispatching notifications"
        );
        for pending in self.items {
            let event = &pending.event;
            pending.observers.emit(event.kind, &event.options.label, event);
            for container in &pending.bubble {
                container.items.emit(event.kind, &event.options.label, event);
            }
        }
        for pending in self.containers {
            let event = &pending.event;
            pending.observers.aggregate.emit(event.kind, &event.options.label, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ContainerRecord, ItemRecord};

    fn graph_with(kind: ContainerKind, count: usize) -> (Graph, ContainerId, Vec<ItemId>) {
        let mut graph = Graph::new();
        let container = graph.containers.insert(ContainerRecord::new(
            kind,
            Label::default(),
            HashSet::new(),
            true,
        ));
        let items: Vec<ItemId> = (0..count)
            .map(|_| graph.items.insert(ItemRecord::new(Label::default())))
            .collect();
        graph.register(container, &items);
        (graph, container, items)
    }

    #[test]
    fn test_single_displacement() {
        let (mut graph, container, items) = graph_with(ContainerKind::Single, 2);
        let label = Label::default();

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[0], &label, Exclusive::No);
        assert!(!tx.commit().is_empty());
        assert_eq!(graph.containers[container].holder(&label), Some(items[0]));

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[1], &label, Exclusive::No);
        tx.commit();
        assert_eq!(graph.containers[container].holder(&label), Some(items[1]));
        assert!(!graph.items[items[0]].flag(&label));
        assert!(graph.items[items[1]].flag(&label));
    }

    #[test]
    fn test_plan_does_not_mutate_before_commit() {
        let (mut graph, container, items) = graph_with(ContainerKind::Multi, 2);
        let label = Label::default();

        {
            let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
            tx.select(items[0], &label, Exclusive::No);
            assert!(tx.flag(items[0], &label));
            // dropped without commit
        }
        assert!(!graph.items[items[0]].flag(&label));
        assert_eq!(graph.containers[container].selected_count(&label), 0);
    }

    #[test]
    fn test_deselect_unselected_is_empty() {
        let (mut graph, _, items) = graph_with(ContainerKind::Multi, 1);
        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.deselect(items[0], &Label::default());
        assert!(tx.commit().is_empty());
    }

    #[test]
    fn test_silent_commits_without_dispatch() {
        let (mut graph, container, items) = graph_with(ContainerKind::Multi, 2);
        let label = Label::default();
        let options = SelectOptions::new().silent();

        let mut tx = Transaction::new(&mut graph, &options);
        tx.select(items[1], &label, Exclusive::No);
        assert!(tx.commit().is_empty());
        assert_eq!(graph.containers[container].selection(&label), vec![items[1]]);
    }

    #[test]
    fn test_exclusive_in_multi() {
        let (mut graph, container, items) = graph_with(ContainerKind::Multi, 3);
        let label = Label::default();

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[0], &label, Exclusive::No);
        tx.select(items[2], &label, Exclusive::No);
        tx.commit();

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[1], &label, Exclusive::In(container));
        tx.commit();
        assert_eq!(graph.containers[container].selection(&label), vec![items[1]]);
    }

    #[test]
    fn test_container_exclusive_stays_in_scope() {
        let (mut graph, first, items) = graph_with(ContainerKind::Multi, 1);
        let label = Label::default();
        let second = graph.containers.insert(ContainerRecord::new(
            ContainerKind::Multi,
            label.clone(),
            HashSet::new(),
            true,
        ));
        let peer = graph.items.insert(ItemRecord::new(label.clone()));
        graph.register(second, &[items[0], peer]);

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(peer, &label, Exclusive::No);
        tx.commit();

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[0], &label, Exclusive::In(first));
        tx.commit();
        assert!(graph.items[peer].flag(&label));
        assert_eq!(graph.containers[second].selection(&label), vec![items[0], peer]);

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[0], &label, Exclusive::Everywhere);
        tx.commit();
        assert!(!graph.items[peer].flag(&label));
    }

    #[test]
    fn test_displaced_then_reselected_is_reaffirmed() {
        let (mut graph, single, items) = graph_with(ContainerKind::Single, 2);
        let label = Label::default();

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[1], &label, Exclusive::No);
        tx.commit();

        // selecting the first displaces the second, which is then selected again
        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[0], &label, Exclusive::No);
        tx.select(items[1], &label, Exclusive::No);
        let dispatch = tx.commit();

        assert_eq!(graph.containers[single].holder(&label), Some(items[1]));
        assert!(!graph.items[items[0]].flag(&label));
        assert_eq!(dispatch.items.len(), 1);
        assert_eq!(dispatch.items[0].event.kind, ItemEventKind::Reselected);
        assert_eq!(dispatch.items[0].event.item, items[1]);
        assert_eq!(dispatch.containers.len(), 1);
        assert_eq!(dispatch.containers[0].event.kind, ContainerEventKind::ReselectOne);
    }

    #[test]
    fn test_remove_keeps_item_flag() {
        let (mut graph, container, items) = graph_with(ContainerKind::Single, 1);
        let label = Label::default();

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.select(items[0], &label, Exclusive::No);
        tx.commit();

        let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
        tx.remove_members(container, &[items[0]]);
        assert!(!tx.commit().is_empty());
        assert_eq!(graph.containers[container].holder(&label), None);
        assert!(graph.items[items[0]].flag(&label));
    }
}
