//! Selectable items.

use std::fmt;
use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{ConnectionGuard, ContainerId, ItemId, PerfSpan, Result, SelectError};

use crate::engine::{Exclusive, Transaction};
use crate::events::{ItemEvent, ItemEventKind, ItemObservers, Subscription};
use crate::label::{Label, LabelRegistry};
use crate::options::SelectOptions;
use crate::registry::Shared;

/// A handle to a selectable item.
///
/// An item carries one boolean per label and may belong to any number of
/// containers. Selecting it through the item, or through any container
/// holding it, keeps every one of those containers consistent.
///
/// Handles are cheap to clone; all clones refer to the same item.
#[derive(Clone)]
pub struct Item {
    shared: Arc<Shared>,
    id: ItemId,
    observers: Arc<ItemObservers>,
}

impl Item {
    pub(crate) fn new(shared: Arc<Shared>, id: ItemId, observers: Arc<ItemObservers>) -> Self {
        Self {
            shared,
            id,
            observers,
        }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// The item's identifier.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns `true` until the item is destroyed.
    pub fn is_alive(&self) -> bool {
        self.shared.graph.read().item(self.id).is_some()
    }

    /// Selects the item under its default label.
    pub fn select(&self) -> Result<&Self> {
        self.select_with(SelectOptions::default())
    }

    /// Selects the item.
    ///
    /// Every single-choice container holding the item deselects its previous
    /// holder. Selecting an already-selected item fires `reselected`.
    pub fn select_with(&self, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("item.select");
        self.transact(options, |tx, id, label, exclusive| tx.select(id, label, exclusive))
    }

    /// Deselects the item under its default label.
    pub fn deselect(&self) -> Result<&Self> {
        self.deselect_with(SelectOptions::default())
    }

    /// Deselects the item in every container holding it.
    pub fn deselect_with(&self, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("item.deselect");
        self.transact(options, |tx, id, label, _| tx.deselect(id, label))
    }

    /// Flips the item's boolean under its default label.
    pub fn toggle_selected(&self) -> Result<&Self> {
        self.toggle_selected_with(SelectOptions::default())
    }

    /// Flips the item's boolean.
    pub fn toggle_selected_with(&self, options: SelectOptions) -> Result<&Self> {
        self.transact(options, |tx, id, label, exclusive| {
            if tx.flag(id, label) {
                tx.deselect(id, label);
            } else {
                tx.select(id, label, exclusive);
            }
        })
    }

    fn transact<F>(&self, options: SelectOptions, plan: F) -> Result<&Self>
    where
        F: FnOnce(&mut Transaction<'_>, ItemId, &Label, Exclusive),
    {
        self.shared.labels.validate_explicit(options.label.as_ref())?;
        let dispatch = {
            let mut graph = self.shared.graph.write();
            let record = graph.item(self.id).ok_or(SelectError::InvalidItem)?;
            let label = LabelRegistry::resolve(options.label.as_ref(), &record.default_label);
            let mut tx = Transaction::new(&mut graph, &options);
            tx.set_origin(self.id);
            plan(&mut tx, self.id, &label, Exclusive::for_item(options.exclusive));
            tx.commit()
        };
        dispatch.emit();
        Ok(self)
    }

    /// Returns `true` if the item is selected under its default label.
    pub fn is_selected(&self) -> bool {
        let graph = self.shared.graph.read();
        graph
            .item(self.id)
            .is_some_and(|record| record.flag(&record.default_label))
    }

    /// Returns `true` if the item is selected under `label`.
    pub fn is_selected_for(&self, label: &str) -> bool {
        let graph = self.shared.graph.read();
        graph
            .item(self.id)
            .and_then(|record| record.flags.get(label).copied())
            .unwrap_or(false)
    }

    /// Labels the item is currently selected under, sorted.
    pub fn labels(&self) -> Vec<Label> {
        let graph = self.shared.graph.read();
        graph
            .item(self.id)
            .map(|record| record.selected_labels())
            .unwrap_or_default()
    }

    /// The item's default label, or `None` once destroyed.
    pub fn default_label(&self) -> Option<Label> {
        let graph = self.shared.graph.read();
        graph.item(self.id).map(|record| record.default_label.clone())
    }

    /// Containers currently holding the item, in join order.
    pub fn containers(&self) -> Vec<ContainerId> {
        self.shared.graph.read().containers_for(self.id).to_vec()
    }

    /// Subscribes to every emission of `kind`.
    pub fn on<F>(&self, kind: ItemEventKind, slot: F) -> Subscription<ItemEventKind>
    where
        F: Fn(&ItemEvent) + Send + Sync + 'static,
    {
        self.observers.on(kind, slot)
    }

    /// Subscribes to emissions of `kind` for one label.
    pub fn on_label<F>(
        &self,
        kind: ItemEventKind,
        label: impl Into<Label>,
        slot: F,
    ) -> Subscription<ItemEventKind>
    where
        F: Fn(&ItemEvent) + Send + Sync + 'static,
    {
        self.observers.on_label(kind, label, slot)
    }

    /// Subscribes to every emission of `kind` until the guard is dropped.
    pub fn on_scoped<F>(&self, kind: ItemEventKind, slot: F) -> ConnectionGuard<ItemEvent>
    where
        F: Fn(&ItemEvent) + Send + Sync + 'static,
    {
        self.observers.on_scoped(kind, slot)
    }

    /// Removes a subscription.
    pub fn off(&self, subscription: &Subscription<ItemEventKind>) -> bool {
        self.observers.off(subscription)
    }

    /// Number of connected slots.
    pub fn listener_count(&self) -> usize {
        self.observers.listener_count()
    }

    /// Destroys the item.
    ///
    /// The item leaves every container holding it (each fires its structural
    /// notifications tagged [`crate::ExternalChange::Destroy`]) and its
    /// subscriptions are dropped. Later calls return
    /// [`SelectError::InvalidItem`].
    pub fn destroy(&self) -> Result<()> {
        let dispatch = {
            let mut graph = self.shared.graph.write();
            if graph.item(self.id).is_none() {
                return Err(SelectError::InvalidItem);
            }
            let mut tx = Transaction::new(&mut graph, &SelectOptions::default());
            tx.destroy_item(self.id);
            tx.commit()
        };
        dispatch.emit();
        self.observers.clear();
        tracing::debug!(target: targets::MEMBERSHIP, id = ?self.id, "destroyed item");
        Ok(())
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Shared::same(&self.shared, &other.shared)
    }
}

impl Eq for Item {}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("labels", &self.labels())
            .finish()
    }
}
