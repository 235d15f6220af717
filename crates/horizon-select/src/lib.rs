//! Horizon Select - label-based selection state for shared items.
//!
//! Items carry one boolean per [`Label`] and may belong to any number of
//! containers at once. A [`SingleSelect`] keeps at most one selected member
//! per label; a [`MultiSelect`] keeps an arbitrary subset. Selecting or
//! deselecting through any entry point (the item or any container holding
//! it) updates every container in one transaction, and notifications fire
//! only after the whole change has been committed.
//!
//! # Example
//!
//! ```
//! use horizon_select::prelude::*;
//!
//! let registry = SelectionRegistry::new();
//! let tabs = registry.create_single(ContainerConfig::default()).unwrap();
//! let list = registry.create_multi(ContainerConfig::default()).unwrap();
//!
//! let a = registry.create_item();
//! let b = registry.create_item();
//! tabs.add([&a, &b]).unwrap();
//! list.add([&a, &b]).unwrap();
//!
//! list.on(ContainerEventKind::SelectSome, |event| {
//!     let diff = event.payload.diff().unwrap();
//!     println!("selected {:?}, deselected {:?}", diff.selected, diff.deselected);
//! });
//!
//! list.select_all().unwrap();
//! // the single-choice container kept only the last selection
//! assert_eq!(tabs.holder(), Some(b.id()));
//! assert_eq!(list.selection(), vec![b.id()]);
//! ```
//!
//! # Labels
//!
//! Labels are independent selection channels. Each container has a default
//! label and may ignore others; a label may not reuse a member name of the
//! item or container API (see [`HostSurface`]).

mod config;
mod container;
mod debug;
mod engine;
mod events;
mod graph;
mod item;
mod label;
mod membership;
mod multi;
mod options;
mod registry;
mod single;

pub mod prelude;

pub use horizon_select_core::{
    ConnectionGuard, ConnectionId, ContainerId, ItemId, PerfSpan, Result, SelectError, Signal,
    Surface,
};

pub use config::{ContainerConfig, ItemConfig};
pub use container::SelectContainer;
pub use debug::SelectionDump;
pub use events::{
    ContainerEvent, ContainerEventKind, ContainerObservers, ContainerPayload, EventKind, ItemEvent,
    ItemEventKind, ItemObservers, Observers, SelectionDiff, Subscription,
};
pub use graph::ContainerKind;
pub use item::Item;
pub use label::{DEFAULT_LABEL, DefaultSurface, HostSurface, Label, LabelRegistry};
pub use multi::MultiSelect;
pub use options::{EventOptions, ExternalChange, SelectOptions};
pub use registry::SelectionRegistry;
pub use single::SingleSelect;

/// Tracing targets used by this crate.
pub mod logging {
    pub use horizon_select_core::logging::*;
}
