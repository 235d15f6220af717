//! The selection event surface.
//!
//! Every notification has a base name (`"selected"`, `"select:one"`, ...) and
//! a label-namespaced variant (`"selected:starred"`). Each item and container
//! owns an [`Observers`] registry; subscribing to a kind receives every
//! emission, subscribing to a kind and label receives only that label's.
//!
//! # Example
//!
//! ```
//! use horizon_select::{ItemEventKind, SelectionRegistry};
//!
//! let registry = SelectionRegistry::new();
//! let item = registry.create_item();
//!
//! item.on(ItemEventKind::Selected, |event| {
//!     println!("{:?} selected under {}", event.item, event.options.label);
//! });
//! item.on_label(ItemEventKind::Selected, "starred", |_| println!("starred!"));
//!
//! item.select().unwrap();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use horizon_select_core::{ConnectionGuard, ConnectionId, ContainerId, ItemId, Signal};
use parking_lot::Mutex;

use crate::label::Label;
use crate::options::EventOptions;

/// Common behavior of event kind enums.
pub trait EventKind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// The base event name.
    fn name(self) -> &'static str;

    /// The label-namespaced event name.
    fn namespaced(self, label: &Label) -> String {
        format!("{}:{}", self.name(), label)
    }
}

/// Per-item notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemEventKind {
    /// The item became selected.
    Selected,
    /// The item became deselected.
    Deselected,
    /// Selection was requested for an already-selected item.
    Reselected,
}

impl EventKind for ItemEventKind {
    fn name(self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Deselected => "deselected",
            Self::Reselected => "reselected",
        }
    }
}

/// Per-container aggregate notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerEventKind {
    /// Single-choice: a new holder was selected.
    SelectOne,
    /// Single-choice: the holder was deselected.
    DeselectOne,
    /// Single-choice: the holder was selected again.
    ReselectOne,
    /// Multi-choice: the selection changed and is now empty.
    SelectNone,
    /// Multi-choice: the selection changed and is now partial.
    SelectSome,
    /// Multi-choice: the selection changed and now covers every member.
    SelectAll,
    /// Multi-choice: already-selected members were selected again.
    ReselectAny,
}

impl EventKind for ContainerEventKind {
    fn name(self) -> &'static str {
        match self {
            Self::SelectOne => "select:one",
            Self::DeselectOne => "deselect:one",
            Self::ReselectOne => "reselect:one",
            Self::SelectNone => "select:none",
            Self::SelectSome => "select:some",
            Self::SelectAll => "select:all",
            Self::ReselectAny => "reselect:any",
        }
    }
}

/// Items that changed state in one container for one label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDiff {
    /// Items that became selected.
    pub selected: Vec<ItemId>,
    /// Items that became deselected.
    pub deselected: Vec<ItemId>,
}

impl SelectionDiff {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

/// Payload of a per-item notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEvent {
    /// What happened.
    pub kind: ItemEventKind,
    /// The item the notification is about.
    pub item: ItemId,
    /// Options of the originating call, with the resolved label.
    pub options: EventOptions,
}

/// Data carried by a container notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerPayload {
    /// Single-choice events: the affected item.
    Item(ItemId),
    /// `select:none` / `select:some` / `select:all`: the container's diff.
    Diff(SelectionDiff),
    /// `reselect:any`: the reaffirmed items.
    Reselected(Vec<ItemId>),
}

impl ContainerPayload {
    /// The affected item of a single-choice event.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::Item(item) => Some(*item),
            _ => None,
        }
    }

    /// The diff of a multi-choice change event.
    pub fn diff(&self) -> Option<&SelectionDiff> {
        match self {
            Self::Diff(diff) => Some(diff),
            _ => None,
        }
    }

    /// The reaffirmed items of a `reselect:any` event.
    pub fn reselected(&self) -> Option<&[ItemId]> {
        match self {
            Self::Reselected(items) => Some(items),
            _ => None,
        }
    }
}

/// Payload of a per-container notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerEvent {
    /// What happened.
    pub kind: ContainerEventKind,
    /// The container the notification is about.
    pub container: ContainerId,
    /// Diff, item, or reaffirmed list depending on `kind`.
    pub payload: ContainerPayload,
    /// Options of the originating call, with the resolved label.
    pub options: EventOptions,
}

/// A handle to one subscription, used with `off`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription<K> {
    kind: K,
    label: Option<Label>,
    id: ConnectionId,
}

impl<K: EventKind> Subscription<K> {
    /// The subscribed kind.
    pub fn kind(&self) -> K {
        self.kind
    }

    /// The subscribed label, if label-namespaced.
    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// The full event name this subscription listens to.
    pub fn event_name(&self) -> String {
        match &self.label {
            Some(label) => self.kind.namespaced(label),
            None => self.kind.name().to_string(),
        }
    }
}

/// An explicit, typed observer registry for one item or container.
///
/// Each `(kind, label)` channel is its own [`Signal`]; emission fans out to
/// the base channel and then to the label-namespaced channel.
pub struct Observers<K, E> {
    channels: Mutex<HashMap<(K, Option<Label>), Arc<Signal<E>>>>,
}

impl<K: EventKind, E: Send + 'static> Default for Observers<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EventKind, E: Send + 'static> Observers<K, E> {
    /// Creates a registry with no subscribers.
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn channel(&self, kind: K, label: Option<Label>) -> Arc<Signal<E>> {
        self.channels
            .lock()
            .entry((kind, label))
            .or_insert_with(|| Arc::new(Signal::new()))
            .clone()
    }

    /// Subscribes to every emission of `kind`.
    pub fn on<F>(&self, kind: K, slot: F) -> Subscription<K>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.channel(kind, None).connect(slot);
        Subscription {
            kind,
            label: None,
            id,
        }
    }

    /// Subscribes to emissions of `kind` for one label.
    pub fn on_label<F>(&self, kind: K, label: impl Into<Label>, slot: F) -> Subscription<K>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let label = label.into();
        let id = self.channel(kind, Some(label.clone())).connect(slot);
        Subscription {
            kind,
            label: Some(label),
            id,
        }
    }

    /// Subscribes to every emission of `kind` while the returned guard lives.
    pub fn on_scoped<F>(&self, kind: K, slot: F) -> ConnectionGuard<E>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.channel(kind, None).connect_scoped(slot)
    }

    /// Removes a subscription. Returns `true` if it was connected.
    pub fn off(&self, subscription: &Subscription<K>) -> bool {
        let channel = self
            .channels
            .lock()
            .get(&(subscription.kind, subscription.label.clone()))
            .cloned();
        channel.is_some_and(|signal| signal.disconnect(subscription.id))
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        let channels: Vec<_> = self.channels.lock().drain().map(|(_, signal)| signal).collect();
        for signal in channels {
            signal.disconnect_all();
        }
    }

    /// Total number of connected slots across all channels.
    pub fn listener_count(&self) -> usize {
        self.channels
            .lock()
            .values()
            .map(|signal| signal.connection_count())
            .sum()
    }

    /// Emits the base event, then its label-namespaced variant.
    pub(crate) fn emit(&self, kind: K, label: &Label, event: &E)
    where
        E: Clone,
    {
        let (base, namespaced) = {
            let channels = self.channels.lock();
            (
                channels.get(&(kind, None)).cloned(),
                channels.get(&(kind, Some(label.clone()))).cloned(),
            )
        };
        if let Some(signal) = base {
            signal.emit(event.clone());
        }
        if let Some(signal) = namespaced {
            signal.emit(event.clone());
        }
    }
}

impl<K, E> fmt::Debug for Observers<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("channels", &self.channels.lock().len())
            .finish()
    }
}

/// Observers of an item.
pub type ItemObservers = Observers<ItemEventKind, ItemEvent>;

/// Observers of a container: aggregate events plus bubbled member events.
#[derive(Debug, Default)]
pub struct ContainerObservers {
    /// Aggregate container events.
    pub aggregate: Observers<ContainerEventKind, ContainerEvent>,
    /// Per-item events of members, re-emitted by the container.
    pub items: Observers<ItemEventKind, ItemEvent>,
}

impl ContainerObservers {
    /// Total number of connected slots.
    pub fn listener_count(&self) -> usize {
        self.aggregate.listener_count() + self.items.listener_count()
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        self.aggregate.clear();
        self.items.clear();
    }
}
