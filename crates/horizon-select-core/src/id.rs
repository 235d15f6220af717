//! Stable identifiers for selectable items and containers.
//!
//! Both identifiers are arena keys (via `slotmap`). They stay valid until the
//! item is destroyed or the container is closed, and a key is never confused
//! with a key for a later object occupying the same slot.

use slotmap::new_key_type;

new_key_type! {
    /// A unique identifier for a selectable item.
    ///
    /// `ItemId`s are stable handles that remain valid while the item exists in
    /// its registry. They become invalid when the item is destroyed.
    pub struct ItemId;
}

new_key_type! {
    /// A unique identifier for a selection container.
    ///
    /// `ContainerId`s become invalid when the container is closed.
    pub struct ContainerId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_stale_key_after_removal() {
        let mut map: SlotMap<ContainerId, &str> = SlotMap::with_key();
        let first = map.insert("first");
        map.remove(first);
        let second = map.insert("second");
        assert_ne!(first, second);
        assert!(!map.contains_key(first));
    }

    #[test]
    fn test_item_and_container_keys_are_distinct_types() {
        let mut items: SlotMap<ItemId, ()> = SlotMap::with_key();
        let id = items.insert(());
        assert!(items.contains_key(id));
        assert_ne!(id, ItemId::default());
    }
}
