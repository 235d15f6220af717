//! The membership registry: a bidirectional item/container index.
//!
//! Every structural change (add, remove, reset, item destruction, container
//! close) goes through these functions, silent or not. They only maintain
//! membership; selection indexes are rebuilt by the engine in the same commit.

use horizon_select_core::logging::targets;
use horizon_select_core::{ContainerId, ItemId, Result, SelectError};

use crate::graph::Graph;

impl Graph {
    /// Containers currently holding `item`, in join order.
    pub(crate) fn containers_for(&self, item: ItemId) -> &[ContainerId] {
        match self.items.get(item) {
            Some(record) => &record.containers,
            None => &[],
        }
    }

    /// Rejects joins that would violate a container's model-sharing setting.
    pub(crate) fn check_sharing(&self, container: ContainerId, items: &[ItemId]) -> Result<()> {
        let record = self.containers.get(container).ok_or(SelectError::ContainerClosed)?;
        for &item in items {
            let others: Vec<ContainerId> = self
                .containers_for(item)
                .iter()
                .copied()
                .filter(|other| *other != container)
                .collect();
            if others.is_empty() {
                continue;
            }
            let blocked = !record.model_sharing
                || others
                    .iter()
                    .any(|other| self.containers.get(*other).is_some_and(|c| !c.model_sharing));
            if blocked {
                tracing::warn!(target: targets::MEMBERSHIP, ?item, ?container, "model sharing disabled");
                return Err(SelectError::SharingDisabled);
            }
        }
        Ok(())
    }

    /// Adds `items` to `container`. Returns the items that actually joined.
    ///
    /// Joining items get their boolean for the container's default label
    /// created (false) if they have never used it.
    pub(crate) fn register(&mut self, container: ContainerId, items: &[ItemId]) -> Vec<ItemId> {
        let Some(record) = self.containers.get_mut(container) else {
            return Vec::new();
        };
        let mut joined = Vec::new();
        for &item in items {
            let Some(item_record) = self.items.get_mut(item) else {
                continue;
            };
            if !record.member_set.insert(item) {
                continue;
            }
            record.members.push(item);
            item_record.containers.push(container);
            item_record
                .flags
                .entry(record.default_label.clone())
                .or_insert(false);
            joined.push(item);
        }
        tracing::debug!(target: targets::MEMBERSHIP, ?container, count = joined.len(), "registered members");
        joined
    }

    /// Removes `items` from `container`. Returns the items that actually left.
    pub(crate) fn unregister(&mut self, container: ContainerId, items: &[ItemId]) -> Vec<ItemId> {
        let Some(record) = self.containers.get_mut(container) else {
            return Vec::new();
        };
        let mut left = Vec::new();
        for &item in items {
            if !record.member_set.remove(&item) {
                continue;
            }
            if let Some(item_record) = self.items.get_mut(item) {
                item_record.containers.retain(|held_by| *held_by != container);
            }
            left.push(item);
        }
        if !left.is_empty() {
            let member_set = &record.member_set;
            record.members.retain(|member| member_set.contains(member));
        }
        tracing::debug!(target: targets::MEMBERSHIP, ?container, count = left.len(), "unregistered members");
        left
    }

    /// Replaces the whole membership of `container` with `new_items`.
    pub(crate) fn replace(&mut self, container: ContainerId, old_items: &[ItemId], new_items: &[ItemId]) {
        self.unregister(container, old_items);
        self.register(container, new_items);
    }
}
