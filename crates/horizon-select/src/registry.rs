//! The selection registry: owner of every item and container.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{ContainerId, ItemId, Result, SelectError};
use parking_lot::RwLock;

use crate::config::{ContainerConfig, ItemConfig};
use crate::container::ContainerCore;
use crate::debug::SelectionDump;
use crate::graph::{ContainerKind, ContainerRecord, Graph, ItemRecord};
use crate::item::Item;
use crate::label::{HostSurface, LabelRegistry};
use crate::multi::MultiSelect;
use crate::single::SingleSelect;

/// State shared by a registry and every handle it creates.
pub(crate) struct Shared {
    pub graph: RwLock<Graph>,
    pub labels: LabelRegistry,
}

impl Shared {
    pub fn same(a: &Arc<Shared>, b: &Arc<Shared>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

/// Creates and owns selectable items and their containers.
///
/// Cloning a registry yields another handle to the same state. Items and
/// containers from different registries cannot be mixed.
///
/// # Example
///
/// ```
/// use horizon_select::{ContainerConfig, SelectContainer, SelectionRegistry};
///
/// let registry = SelectionRegistry::new();
/// let tabs = registry.create_single(ContainerConfig::default()).unwrap();
/// let first = registry.create_item();
/// let second = registry.create_item();
/// tabs.add([&first, &second]).unwrap();
///
/// tabs.select(&first).unwrap();
/// tabs.select(&second).unwrap();
/// assert!(!first.is_selected());
/// assert_eq!(tabs.holder(), Some(second.id()));
/// ```
#[derive(Clone)]
pub struct SelectionRegistry {
    shared: Arc<Shared>,
}

impl SelectionRegistry {
    /// Creates a registry validating labels against [`crate::DefaultSurface`].
    pub fn new() -> Self {
        Self::with_labels(LabelRegistry::default())
    }

    /// Creates a registry validating labels against a custom host surface.
    pub fn with_surface(surface: impl HostSurface + 'static) -> Self {
        Self::with_labels(LabelRegistry::new(surface))
    }

    fn with_labels(labels: LabelRegistry) -> Self {
        Self {
            shared: Arc::new(Shared {
                graph: RwLock::new(Graph::new()),
                labels,
            }),
        }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// The label registry.
    pub fn labels(&self) -> &LabelRegistry {
        &self.shared.labels
    }

    /// Creates an item using the default label.
    pub fn create_item(&self) -> Item {
        let (id, observers) = {
            let mut graph = self.shared.graph.write();
            let record = ItemRecord::new(Default::default());
            let observers = record.observers.clone();
            (graph.items.insert(record), observers)
        };
        tracing::trace!(target: targets::MEMBERSHIP, ?id, "created item");
        Item::new(self.shared.clone(), id, observers)
    }

    /// Creates an item with a configured default label.
    pub fn create_item_with(&self, config: ItemConfig) -> Result<Item> {
        self.shared.labels.validate(&config.default_label)?;
        let (id, observers) = {
            let mut graph = self.shared.graph.write();
            let record = ItemRecord::new(config.default_label);
            let observers = record.observers.clone();
            (graph.items.insert(record), observers)
        };
        tracing::trace!(target: targets::MEMBERSHIP, ?id, "created item");
        Ok(Item::new(self.shared.clone(), id, observers))
    }

    /// Creates a single-choice container.
    pub fn create_single(&self, config: ContainerConfig) -> Result<SingleSelect> {
        self.create_container(ContainerKind::Single, config)
            .map(SingleSelect::new)
    }

    /// Creates a multi-choice container.
    pub fn create_multi(&self, config: ContainerConfig) -> Result<MultiSelect> {
        self.create_container(ContainerKind::Multi, config)
            .map(MultiSelect::new)
    }

    fn create_container(&self, kind: ContainerKind, config: ContainerConfig) -> Result<ContainerCore> {
        let ContainerConfig {
            default_label,
            ignore_label,
            model_sharing,
        } = config;

        if ignore_label.contains(&default_label) {
            tracing::warn!(target: targets::LABEL, label = %default_label, "container ignores its default label");
            return Err(SelectError::IgnoresDefaultLabel {
                label: default_label.to_string(),
            });
        }
        self.shared.labels.validate(&default_label)?;
        for label in &ignore_label {
            self.shared.labels.validate(label)?;
        }

        let ignored: HashSet<_> = ignore_label.into_iter().collect();
        let record = ContainerRecord::new(kind, default_label, ignored, model_sharing);
        let observers = record.observers.clone();
        let id = self.shared.graph.write().containers.insert(record);
        tracing::debug!(target: targets::MEMBERSHIP, ?id, ?kind, model_sharing, "created container");
        Ok(ContainerCore::new(self.shared.clone(), id, observers))
    }

    /// Returns a handle to a live item.
    pub fn item(&self, id: ItemId) -> Option<Item> {
        let observers = self.shared.graph.read().item(id)?.observers.clone();
        Some(Item::new(self.shared.clone(), id, observers))
    }

    /// Returns `true` if the container has not been closed.
    pub fn contains_container(&self, id: ContainerId) -> bool {
        self.shared.graph.read().container(id).is_some()
    }

    /// Number of live items.
    pub fn item_count(&self) -> usize {
        self.shared.graph.read().items.len()
    }

    /// Number of open containers.
    pub fn container_count(&self) -> usize {
        self.shared.graph.read().containers.len()
    }

    /// Returns a tree dump of every container and its selection.
    pub fn dump(&self) -> String {
        SelectionDump::new(self).to_string()
    }
}

impl Default for SelectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SelectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.shared.graph.read();
        f.debug_struct("SelectionRegistry")
            .field("items", &graph.items.len())
            .field("containers", &graph.containers.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(SelectionRegistry: Send, Sync, Clone);
