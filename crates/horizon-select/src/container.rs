//! Behavior shared by single-choice and multi-choice containers.
//!
//! Both container types wrap a [`ContainerCore`] and get membership,
//! queries and subscriptions from the [`SelectContainer`] trait. Only the
//! selection operations differ between them.

use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{
    ConnectionGuard, ContainerId, ItemId, PerfSpan, Result, SelectError,
};

use crate::engine::Transaction;
use crate::events::{
    ContainerEvent, ContainerEventKind, ContainerObservers, ItemEvent, ItemEventKind, Subscription,
};
use crate::graph::{ContainerKind, ContainerRecord};
use crate::item::Item;
use crate::label::{Label, LabelRegistry};
use crate::options::SelectOptions;
use crate::registry::Shared;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restructure {
    Add,
    Remove,
    Reset,
}

/// The registry handle and identity of one container.
#[derive(Clone)]
pub struct ContainerCore {
    shared: Arc<Shared>,
    id: ContainerId,
    observers: Arc<ContainerObservers>,
}

impl ContainerCore {
    pub(crate) fn new(shared: Arc<Shared>, id: ContainerId, observers: Arc<ContainerObservers>) -> Self {
        Self {
            shared,
            id,
            observers,
        }
    }

    pub(crate) fn id(&self) -> ContainerId {
        self.id
    }

    /// Reads the container record, or `None` once closed.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&ContainerRecord) -> R) -> Option<R> {
        self.shared.graph.read().container(self.id).map(f)
    }

    /// Rejects items created by another registry.
    pub(crate) fn owned(&self, item: &Item) -> Result<ItemId> {
        if Shared::same(&self.shared, item.shared()) {
            Ok(item.id())
        } else {
            Err(SelectError::ForeignRegistry)
        }
    }

    fn owned_all<'a, I>(&self, items: I) -> Result<Vec<ItemId>>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        items.into_iter().map(|item| self.owned(item)).collect()
    }

    pub(crate) fn handle(&self, id: ItemId) -> Option<Item> {
        let observers = self.shared.graph.read().item(id)?.observers.clone();
        Some(Item::new(self.shared.clone(), id, observers))
    }

    /// Runs a selection operation under the container's resolved label.
    ///
    /// A label the container ignores makes the call a no-op.
    pub(crate) fn transact<F>(&self, options: &SelectOptions, plan: F) -> Result<()>
    where
        F: FnOnce(&mut Transaction<'_>, ContainerId, &Label) -> Result<()>,
    {
        self.shared.labels.validate_explicit(options.label.as_ref())?;
        let dispatch = {
            let mut graph = self.shared.graph.write();
            let record = graph.container(self.id).ok_or(SelectError::ContainerClosed)?;
            let label = LabelRegistry::resolve(options.label.as_ref(), &record.default_label);
            if !record.mirrors(&label) {
                tracing::trace!(target: targets::ENGINE, container = ?self.id, %label, "label ignored by container");
                return Ok(());
            }
            let mut tx = Transaction::new(&mut graph, options);
            plan(&mut tx, self.id, &label)?;
            tx.commit()
        };
        dispatch.emit();
        Ok(())
    }

    fn restructure(&self, change: Restructure, items: &[ItemId], options: &SelectOptions) -> Result<()> {
        let _span = PerfSpan::new("container.restructure");
        let dispatch = {
            let mut graph = self.shared.graph.write();
            if graph.container(self.id).is_none() {
                return Err(SelectError::ContainerClosed);
            }
            if change != Restructure::Remove {
                if items.iter().any(|item| graph.item(*item).is_none()) {
                    return Err(SelectError::InvalidItem);
                }
                graph.check_sharing(self.id, items)?;
            }
            let mut tx = Transaction::new(&mut graph, options);
            match change {
                Restructure::Add => tx.add_members(self.id, items),
                Restructure::Remove => tx.remove_members(self.id, items),
                Restructure::Reset => tx.reset_members(self.id, items),
            }
            tx.commit()
        };
        dispatch.emit();
        Ok(())
    }
}

/// Membership, queries and subscriptions common to every container.
pub trait SelectContainer {
    #[doc(hidden)]
    fn core(&self) -> &ContainerCore;

    /// The container's identifier.
    fn id(&self) -> ContainerId {
        self.core().id
    }

    /// The cardinality rule, or `None` once closed.
    fn kind(&self) -> Option<ContainerKind> {
        self.core().read(|record| record.kind)
    }

    /// Returns `true` once the container has been closed.
    fn is_closed(&self) -> bool {
        self.core().read(|_| ()).is_none()
    }

    /// The label used when an operation names none.
    fn default_label(&self) -> Option<Label> {
        self.core().read(|record| record.default_label.clone())
    }

    /// Labels this container never mirrors, sorted.
    fn ignored_labels(&self) -> Vec<Label> {
        let mut labels = self
            .core()
            .read(|record| record.ignored.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        labels.sort();
        labels
    }

    /// Whether members may also belong to other containers.
    fn model_sharing(&self) -> bool {
        self.core().read(|record| record.model_sharing).unwrap_or(false)
    }

    /// Member identifiers in insertion order.
    fn members(&self) -> Vec<ItemId> {
        self.core().read(|record| record.members.clone()).unwrap_or_default()
    }

    /// Member handles in insertion order.
    fn items(&self) -> Vec<Item> {
        self.members()
            .into_iter()
            .filter_map(|id| self.core().handle(id))
            .collect()
    }

    /// Number of members.
    fn len(&self) -> usize {
        self.core().read(|record| record.members.len()).unwrap_or(0)
    }

    /// Returns `true` if the container has no members.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `item` is a member.
    fn contains(&self, item: &Item) -> bool {
        self.core().owned(item).is_ok_and(|id| {
            self.core().read(|record| record.holds(id)).unwrap_or(false)
        })
    }

    /// Members matching `predicate`, in insertion order.
    ///
    /// The predicate runs outside the registry lock and may query selection state.
    fn filter<P>(&self, mut predicate: P) -> Vec<Item>
    where
        P: FnMut(&Item) -> bool,
    {
        self.items().into_iter().filter(|item| predicate(item)).collect()
    }

    /// Adds items.
    ///
    /// Selected labels of the new members are mirrored; in a single-choice
    /// container a selected newcomer displaces the current holder.
    fn add<'a, I>(&self, items: I) -> Result<&Self>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        self.add_with(items, SelectOptions::default())
    }

    /// Adds items with options (`silent` and `custom` apply).
    fn add_with<'a, I>(&self, items: I, options: SelectOptions) -> Result<&Self>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let ids = self.core().owned_all(items)?;
        self.core().restructure(Restructure::Add, &ids, &options)?;
        Ok(self)
    }

    /// Removes items. Removed items keep their own selection state.
    fn remove<'a, I>(&self, items: I) -> Result<&Self>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        self.remove_with(items, SelectOptions::default())
    }

    /// Removes items with options.
    fn remove_with<'a, I>(&self, items: I, options: SelectOptions) -> Result<&Self>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let ids = self.core().owned_all(items)?;
        self.core().restructure(Restructure::Remove, &ids, &options)?;
        Ok(self)
    }

    /// Replaces every member and rebuilds the selection from the new members.
    fn reset<'a, I>(&self, items: I) -> Result<&Self>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        self.reset_with(items, SelectOptions::default())
    }

    /// Replaces every member with options.
    fn reset_with<'a, I>(&self, items: I, options: SelectOptions) -> Result<&Self>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let ids = self.core().owned_all(items)?;
        self.core().restructure(Restructure::Reset, &ids, &options)?;
        Ok(self)
    }

    /// Closes the container.
    ///
    /// Members are released without notifications and every subscription is
    /// dropped. Items keep their selection state. Closing twice is a no-op.
    fn close(&self) {
        let core = self.core();
        let closed = {
            let mut graph = core.shared.graph.write();
            match graph.container(core.id) {
                Some(record) => {
                    let members = record.members.clone();
                    graph.unregister(core.id, &members);
                    graph.containers.remove(core.id).is_some()
                }
                None => false,
            }
        };
        core.observers.clear();
        if closed {
            tracing::debug!(target: targets::MEMBERSHIP, container = ?core.id, "closed container");
        }
    }

    /// Subscribes to every emission of `kind`.
    fn on<F>(&self, kind: ContainerEventKind, slot: F) -> Subscription<ContainerEventKind>
    where
        F: Fn(&ContainerEvent) + Send + Sync + 'static,
    {
        self.core().observers.aggregate.on(kind, slot)
    }

    /// Subscribes to emissions of `kind` for one label.
    fn on_label<F>(
        &self,
        kind: ContainerEventKind,
        label: impl Into<Label>,
        slot: F,
    ) -> Subscription<ContainerEventKind>
    where
        F: Fn(&ContainerEvent) + Send + Sync + 'static,
    {
        self.core().observers.aggregate.on_label(kind, label, slot)
    }

    /// Subscribes to every emission of `kind` until the guard is dropped.
    ///
    /// Closing the container disconnects the slot as well.
    fn on_scoped<F>(&self, kind: ContainerEventKind, slot: F) -> ConnectionGuard<ContainerEvent>
    where
        F: Fn(&ContainerEvent) + Send + Sync + 'static,
    {
        self.core().observers.aggregate.on_scoped(kind, slot)
    }

    /// Subscribes to a per-item notification of any member.
    fn on_item<F>(&self, kind: ItemEventKind, slot: F) -> Subscription<ItemEventKind>
    where
        F: Fn(&ItemEvent) + Send + Sync + 'static,
    {
        self.core().observers.items.on(kind, slot)
    }

    /// Subscribes to a per-item notification of any member for one label.
    fn on_item_label<F>(
        &self,
        kind: ItemEventKind,
        label: impl Into<Label>,
        slot: F,
    ) -> Subscription<ItemEventKind>
    where
        F: Fn(&ItemEvent) + Send + Sync + 'static,
    {
        self.core().observers.items.on_label(kind, label, slot)
    }

    /// Removes a container subscription.
    fn off(&self, subscription: &Subscription<ContainerEventKind>) -> bool {
        self.core().observers.aggregate.off(subscription)
    }

    /// Removes a member-event subscription.
    fn off_item(&self, subscription: &Subscription<ItemEventKind>) -> bool {
        self.core().observers.items.off(subscription)
    }

    /// Number of connected slots, container and member events combined.
    fn listener_count(&self) -> usize {
        self.core().observers.listener_count()
    }
}
