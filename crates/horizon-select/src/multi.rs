//! Multi-choice containers.

use std::fmt;

use horizon_select_core::{ContainerId, ItemId, PerfSpan, Result, SelectError};

use crate::container::{ContainerCore, SelectContainer};
use crate::engine::{Exclusive, Transaction};
use crate::item::Item;
use crate::label::Label;
use crate::options::SelectOptions;

/// A container in which any subset of members may be selected per label.
///
/// # Events
///
/// - `select:none` / `select:some` / `select:all` - the selection changed;
///   the name reflects the new state and the payload carries the diff
/// - `reselect:any` - already-selected members were selected again
///
/// # Example
///
/// ```
/// use horizon_select::{ContainerConfig, SelectContainer, SelectionRegistry};
///
/// let registry = SelectionRegistry::new();
/// let list = registry.create_multi(ContainerConfig::default()).unwrap();
/// let items: Vec<_> = (0..3).map(|_| registry.create_item()).collect();
/// list.add(&items).unwrap();
///
/// list.select(&items[0]).unwrap();
/// list.invert_selection().unwrap();
/// assert_eq!(list.selection(), vec![items[1].id(), items[2].id()]);
/// ```
#[derive(Clone)]
pub struct MultiSelect {
    core: ContainerCore,
}

impl MultiSelect {
    pub(crate) fn new(core: ContainerCore) -> Self {
        Self { core }
    }

    /// Selects `item` under the default label.
    pub fn select(&self, item: &Item) -> Result<&Self> {
        self.select_with(item, SelectOptions::default())
    }

    /// Selects `item`. With `exclusive`, every other selected member of this
    /// container is deselected in the same operation; other containers
    /// holding `item` keep their selection.
    pub fn select_with(&self, item: &Item, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("multi.select");
        let id = self.core.owned(item)?;
        self.core.transact(&options, |tx, container, label| {
            if !tx.has_item(id) {
                return Err(SelectError::InvalidItem);
            }
            tx.set_origin(id);
            tx.select(id, label, Exclusive::for_container(options.exclusive, container));
            Ok(())
        })?;
        Ok(self)
    }

    /// Deselects under the default label. `None` deselects every member.
    pub fn deselect(&self, item: Option<&Item>) -> Result<&Self> {
        self.deselect_with(item, SelectOptions::default())
    }

    /// Deselects `item`, or every member when `None`.
    pub fn deselect_with(&self, item: Option<&Item>, options: SelectOptions) -> Result<&Self> {
        let Some(item) = item else {
            return self.deselect_all_with(options);
        };
        let _span = PerfSpan::new("multi.deselect");
        let id = self.core.owned(item)?;
        self.core.transact(&options, |tx, container, label| {
            if !tx.has_item(id) {
                return Err(SelectError::InvalidItem);
            }
            if tx.is_indexed(container, id, label) {
                tx.set_origin(id);
                tx.deselect(id, label);
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Selects every member under the default label.
    pub fn select_all(&self) -> Result<&Self> {
        self.select_all_with(SelectOptions::default())
    }

    /// Selects every member. Already-selected members are reported through
    /// `reselect:any`.
    pub fn select_all_with(&self, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("multi.select_all");
        self.core.transact(&options, |tx, container, label| {
            plan_select_all(tx, container, label);
            Ok(())
        })?;
        Ok(self)
    }

    /// Deselects every member under the default label.
    pub fn deselect_all(&self) -> Result<&Self> {
        self.deselect_all_with(SelectOptions::default())
    }

    /// Deselects every member.
    pub fn deselect_all_with(&self, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("multi.deselect_all");
        self.core.transact(&options, |tx, container, label| {
            plan_deselect_all(tx, container, label);
            Ok(())
        })?;
        Ok(self)
    }

    /// Alias of [`deselect_all`](Self::deselect_all).
    pub fn select_none(&self) -> Result<&Self> {
        self.deselect_all()
    }

    /// Alias of [`deselect_all_with`](Self::deselect_all_with).
    pub fn select_none_with(&self, options: SelectOptions) -> Result<&Self> {
        self.deselect_all_with(options)
    }

    /// Flips every member under the default label.
    pub fn invert_selection(&self) -> Result<&Self> {
        self.invert_selection_with(SelectOptions::default())
    }

    /// Flips every member in one operation.
    pub fn invert_selection_with(&self, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("multi.invert_selection");
        self.core.transact(&options, |tx, container, label| {
            let (selected, unselected): (Vec<ItemId>, Vec<ItemId>) = tx
                .members(container)
                .into_iter()
                .partition(|member| tx.flag(*member, label));
            for member in selected {
                tx.deselect(member, label);
            }
            for member in unselected {
                tx.select(member, label, Exclusive::No);
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Deselects everything if every member is selected, otherwise selects
    /// every member. Under the default label.
    pub fn toggle_select_all(&self) -> Result<&Self> {
        self.toggle_select_all_with(SelectOptions::default())
    }

    /// Deselects everything if every member is selected, otherwise selects
    /// every member.
    pub fn toggle_select_all_with(&self, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("multi.toggle_select_all");
        self.core.transact(&options, |tx, container, label| {
            let members = tx.members(container).len();
            if members > 0 && tx.selected_count(container, label) == members {
                plan_deselect_all(tx, container, label);
            } else {
                plan_select_all(tx, container, label);
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Selected members under the default label, in member order.
    pub fn selection(&self) -> Vec<ItemId> {
        self.core
            .read(|record| record.selection(&record.default_label))
            .unwrap_or_default()
    }

    /// Selected members under `label`, in member order.
    pub fn selection_for(&self, label: impl Into<Label>) -> Vec<ItemId> {
        let label = label.into();
        self.core
            .read(|record| record.selection(&label))
            .unwrap_or_default()
    }

    /// Number of selected members under the default label.
    pub fn selected_count(&self) -> usize {
        self.core
            .read(|record| record.selected_count(&record.default_label))
            .unwrap_or(0)
    }

    /// Number of selected members under `label`.
    pub fn selected_count_for(&self, label: impl Into<Label>) -> usize {
        let label = label.into();
        self.core
            .read(|record| record.selected_count(&label))
            .unwrap_or(0)
    }
}

fn plan_select_all(tx: &mut Transaction<'_>, container: ContainerId, label: &Label) {
    for member in tx.members(container) {
        tx.select(member, label, Exclusive::No);
    }
}

fn plan_deselect_all(tx: &mut Transaction<'_>, container: ContainerId, label: &Label) {
    for member in tx.members(container) {
        if tx.is_indexed(container, member, label) {
            tx.deselect(member, label);
        }
    }
}

impl SelectContainer for MultiSelect {
    fn core(&self) -> &ContainerCore {
        &self.core
    }
}

impl fmt::Debug for MultiSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelect")
            .field("id", &self.core.id())
            .field("members", &self.len())
            .field("selected", &self.selected_count())
            .finish()
    }
}
