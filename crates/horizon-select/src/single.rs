//! Single-choice containers.

use std::fmt;

use horizon_select_core::{ItemId, PerfSpan, Result, SelectError};

use crate::container::{ContainerCore, SelectContainer};
use crate::engine::Exclusive;
use crate::item::Item;
use crate::label::Label;
use crate::options::SelectOptions;

/// A container in which at most one member is selected per label.
///
/// Selecting a member deselects the previous holder, wherever that
/// selection was requested from.
///
/// # Events
///
/// - `select:one` - a new holder was selected
/// - `deselect:one` - the holder was deselected
/// - `reselect:one` - the holder was selected again
#[derive(Clone)]
pub struct SingleSelect {
    core: ContainerCore,
}

impl SingleSelect {
    pub(crate) fn new(core: ContainerCore) -> Self {
        Self { core }
    }

    /// Selects `item` under the default label.
    pub fn select(&self, item: &Item) -> Result<&Self> {
        self.select_with(item, SelectOptions::default())
    }

    /// Selects `item`, deselecting the previous holder.
    ///
    /// A non-member is selected through its own containers; this container
    /// is left untouched.
    pub fn select_with(&self, item: &Item, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("single.select");
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

    /// Deselects under the default label. `None` targets the current holder.
    pub fn deselect(&self, item: Option<&Item>) -> Result<&Self> {
        self.deselect_with(item, SelectOptions::default())
    }

    /// Deselects the holder.
    ///
    /// With `Some(item)`, nothing happens unless `item` is the current holder.
    pub fn deselect_with(&self, item: Option<&Item>, options: SelectOptions) -> Result<&Self> {
        let _span = PerfSpan::new("single.deselect");
        let requested = item.map(|item| self.core.owned(item)).transpose()?;
        self.core.transact(&options, |tx, container, label| {
            let Some(holder) = tx.holder(container, label) else {
                return Ok(());
            };
            if requested.is_some_and(|id| id != holder) {
                return Ok(());
            }
            tx.set_origin(holder);
            tx.deselect(holder, label);
            Ok(())
        })?;
        Ok(self)
    }

    /// The holder under the default label.
    pub fn holder(&self) -> Option<ItemId> {
        self.core
            .read(|record| record.holder(&record.default_label))
            .flatten()
    }

    /// The holder under `label`.
    pub fn holder_for(&self, label: impl Into<Label>) -> Option<ItemId> {
        let label = label.into();
        self.core.read(|record| record.holder(&label)).flatten()
    }

    /// A handle to the holder under the default label.
    pub fn holder_item(&self) -> Option<Item> {
        self.core.handle(self.holder()?)
    }

    /// Number of selected members under the default label (0 or 1).
    pub fn selected_count(&self) -> usize {
        usize::from(self.holder().is_some())
    }
}

impl SelectContainer for SingleSelect {
    fn core(&self) -> &ContainerCore {
        &self.core
    }
}

impl fmt::Debug for SingleSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleSelect")
            .field("id", &self.core.id())
            .field("members", &self.len())
            .field("holder", &self.holder())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ContainerConfig, SelectContainer, SelectOptions, SelectionRegistry};

    #[test]
    fn test_select_displaces_holder() {
        let registry = SelectionRegistry::new();
        let single = registry.create_single(ContainerConfig::default()).unwrap();
        let a = registry.create_item();
        let b = registry.create_item();
        single.add([&a, &b]).unwrap();

        single.select(&a).unwrap();
        assert_eq!(single.holder(), Some(a.id()));
        b.select().unwrap();
        assert_eq!(single.holder(), Some(b.id()));
        assert!(!a.is_selected());
        assert_eq!(single.selected_count(), 1);
    }

    #[test]
    fn test_deselect_requires_holder() {
        let registry = SelectionRegistry::new();
        let single = registry.create_single(ContainerConfig::default()).unwrap();
        let a = registry.create_item();
        let b = registry.create_item();
        single.add([&a, &b]).unwrap();
        single.select(&a).unwrap();

        single.deselect(Some(&b)).unwrap();
        assert_eq!(single.holder(), Some(a.id()));

        single.deselect(None).unwrap();
        assert_eq!(single.holder(), None);
        assert!(!a.is_selected());
    }

    #[test]
    fn test_ignored_label_is_noop() {
        let registry = SelectionRegistry::new();
        let single = registry
            .create_single(ContainerConfig::new().ignore_label("starred"))
            .unwrap();
        let a = registry.create_item();
        single.add([&a]).unwrap();

        single.select_with(&a, SelectOptions::from("starred")).unwrap();
        assert!(!a.is_selected_for("starred"));
        assert_eq!(single.holder_for("starred"), None);

        a.select_with(SelectOptions::from("starred")).unwrap();
        assert!(a.is_selected_for("starred"));
        assert_eq!(single.holder_for("starred"), None);
    }

    #[test]
    fn test_holder_item() {
        let registry = SelectionRegistry::new();
        let single = registry.create_single(ContainerConfig::default()).unwrap();
        let a = registry.create_item();
        single.add([&a]).unwrap();
        assert!(single.holder_item().is_none());
        a.select().unwrap();
        assert_eq!(single.holder_item(), Some(a.clone()));
    }
}
