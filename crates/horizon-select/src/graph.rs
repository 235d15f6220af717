//! Arena storage for items and containers.
//!
//! The graph holds every item record and container record of one registry.
//! Item booleans and container indexes are only written by the engine's
//! commit phase; membership is maintained by [`crate::membership`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horizon_select_core::{ContainerId, ItemId};
use slotmap::SlotMap;

use crate::events::{ContainerObservers, ItemObservers};
use crate::label::{Label, LabelRegistry};

/// The cardinality rule a container enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// At most one selected member per label.
    Single,
    /// An arbitrary selected subset per label.
    Multi,
}

/// Per-item state.
pub(crate) struct ItemRecord {
    /// One boolean per label, created lazily.
    pub flags: HashMap<Label, bool>,
    pub default_label: Label,
    /// Containers currently holding this item, in join order.
    pub containers: Vec<ContainerId>,
    pub observers: Arc<ItemObservers>,
}

impl ItemRecord {
    pub fn new(default_label: Label) -> Self {
        Self {
            flags: HashMap::new(),
            default_label,
            containers: Vec::new(),
            observers: Arc::new(ItemObservers::new()),
        }
    }

    pub fn flag(&self, label: &Label) -> bool {
        self.flags.get(label).copied().unwrap_or(false)
    }

    /// Labels currently set to true.
    pub fn selected_labels(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = self
            .flags
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(label, _)| label.clone())
            .collect();
        labels.sort();
        labels
    }
}

/// The per-label selection index of a container.
pub(crate) enum SelectionIndex {
    /// Single-choice: the holder per label.
    One(HashMap<Label, ItemId>),
    /// Multi-choice: the selected subset per label.
    Many(HashMap<Label, HashSet<ItemId>>),
}

impl SelectionIndex {
    fn new(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Single => Self::One(HashMap::new()),
            ContainerKind::Multi => Self::Many(HashMap::new()),
        }
    }

    pub fn contains(&self, label: &Label, item: ItemId) -> bool {
        match self {
            Self::One(holders) => holders.get(label) == Some(&item),
            Self::Many(subsets) => subsets.get(label).is_some_and(|set| set.contains(&item)),
        }
    }

    /// Labels with an index entry.
    pub fn labels(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = match self {
            Self::One(holders) => holders.keys().cloned().collect(),
            Self::Many(subsets) => subsets.keys().cloned().collect(),
        };
        labels.sort();
        labels
    }

    /// Replaces the entry for `label` with `selected`.
    pub fn store(&mut self, label: &Label, selected: &[ItemId]) {
        match self {
            Self::One(holders) => match selected.last() {
                Some(holder) => {
                    holders.insert(label.clone(), *holder);
                }
                None => {
                    holders.remove(label);
                }
            },
            Self::Many(subsets) => {
                subsets.insert(label.clone(), selected.iter().copied().collect());
            }
        }
    }
}

/// Per-container state.
pub(crate) struct ContainerRecord {
    pub kind: ContainerKind,
    pub default_label: Label,
    pub ignored: HashSet<Label>,
    pub model_sharing: bool,
    /// Current members, in insertion order.
    pub members: Vec<ItemId>,
    /// The same members, for constant-time lookup.
    pub member_set: HashSet<ItemId>,
    pub index: SelectionIndex,
    pub observers: Arc<ContainerObservers>,
}

impl ContainerRecord {
    pub fn new(
        kind: ContainerKind,
        default_label: Label,
        ignored: HashSet<Label>,
        model_sharing: bool,
    ) -> Self {
        Self {
            kind,
            default_label,
            ignored,
            model_sharing,
            members: Vec::new(),
            member_set: HashSet::new(),
            index: SelectionIndex::new(kind),
            observers: Arc::new(ContainerObservers::default()),
        }
    }

    /// Returns `true` unless the container ignores `label`.
    pub fn mirrors(&self, label: &Label) -> bool {
        !LabelRegistry::is_ignored(&self.ignored, label)
    }

    pub fn holds(&self, item: ItemId) -> bool {
        self.member_set.contains(&item)
    }

    /// The committed selection for `label`, in member order.
    pub fn selection(&self, label: &Label) -> Vec<ItemId> {
        self.members
            .iter()
            .copied()
            .filter(|member| self.index.contains(label, *member))
            .collect()
    }

    pub fn holder(&self, label: &Label) -> Option<ItemId> {
        match &self.index {
            SelectionIndex::One(holders) => holders.get(label).copied(),
            SelectionIndex::Many(_) => None,
        }
    }

    pub fn selected_count(&self, label: &Label) -> usize {
        match &self.index {
            SelectionIndex::One(holders) => usize::from(holders.contains_key(label)),
            SelectionIndex::Many(subsets) => subsets.get(label).map_or(0, HashSet::len),
        }
    }
}

/// All item and container records of one registry.
#[derive(Default)]
pub(crate) struct Graph {
    pub items: SlotMap<ItemId, ItemRecord>,
    pub containers: SlotMap<ContainerId, ContainerRecord>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.get(id)
    }

    pub fn container(&self, id: ContainerId) -> Option<&ContainerRecord> {
        self.containers.get(id)
    }
}
