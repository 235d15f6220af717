//! Typed observer lists for selection notifications.
//!
//! Every item and container owns one [`Signal`] per event channel. Emission
//! happens after a selection change has been committed, so slots always see
//! settled state.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - A list of slots invoked with `&Args`
//! - [`ConnectionId`] - Identifies one connected slot
//! - [`ConnectionGuard`] - Disconnects its slot when dropped
//!
//! # Invocation
//!
//! Slots run synchronously on the emitting thread, in connection order. The
//! slot list is copied out of the lock before the first slot runs, so a slot
//! may connect, disconnect, or emit again without deadlocking. A slot
//! connected during an emission first runs on the next one; a slot
//! disconnected during an emission still runs for that emission.
//!
//! # Example
//!
//! ```
//! use horizon_select_core::Signal;
//!
//! let holder_changed = Signal::<Option<u32>>::new();
//! let id = holder_changed.connect(|holder| println!("holder is now {holder:?}"));
//!
//! holder_changed.emit(Some(3));
//! assert!(holder_changed.disconnect(id));
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one slot connected to a [`Signal`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A list of slots invoked with a shared reference to each emitted value.
///
/// `Signal<Args>` is `Send + Sync`; slots run on whichever thread calls
/// [`emit`](Self::emit).
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Creates a signal with no slots.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connects a slot.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Connects a slot that stays connected while the returned guard lives.
    ///
    /// The guard holds a weak reference; dropping it after the signal is
    /// gone does nothing.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            signal: Arc::downgrade(self),
            id: self.connect(slot),
        }
    }

    /// Disconnects a slot. Returns `false` if it was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Disconnects every slot.
    pub fn disconnect_all(&self) {
        self.slots.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Invokes every connected slot with `args`, in connection order.
    pub fn emit(&self, args: Args) {
        let slots: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        if slots.is_empty() {
            return;
        }
        tracing::trace!(target: targets::SIGNAL, slots = slots.len(), "emitting signal");
        for slot in slots {
            slot(&args);
        }
    }
}

/// Keeps one slot connected until dropped.
///
/// Returned by [`Signal::connect_scoped`] and by the `on_scoped` methods of
/// items and containers.
#[must_use = "the slot is disconnected as soon as the guard is dropped"]
pub struct ConnectionGuard<Args: 'static> {
    signal: Weak<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<Args> {
    /// The guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` while the slot is still connected.
    pub fn is_connected(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|signal| signal.slots.lock().contains_key(self.id))
    }
}

impl<Args: 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}

impl<Args: 'static> std::fmt::Debug for ConnectionGuard<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
