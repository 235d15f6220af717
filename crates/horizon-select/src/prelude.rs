//! Prelude module for Horizon Select.
//!
//! ```
//! use horizon_select::prelude::*;
//! ```
//!
//! This provides access to:
//! - The registry, handles and identifiers (`SelectionRegistry`, `Item`, `SingleSelect`,
//!   `MultiSelect`, `ItemId`, `ContainerId`)
//! - The container trait (`SelectContainer`)
//! - Configuration and options
//! - Event kinds and payloads

// ============================================================================
// Registry and Handles
// ============================================================================

pub use crate::{
    ContainerId, Item, ItemId, MultiSelect, SelectContainer, SelectionRegistry, SingleSelect,
};

// ============================================================================
// Configuration
// ============================================================================

pub use crate::{ContainerConfig, ItemConfig, Label, SelectOptions};

// ============================================================================
// Events
// ============================================================================

pub use crate::{
    ConnectionGuard, ContainerEvent, ContainerEventKind, ContainerPayload, EventKind, EventOptions,
    ExternalChange, ItemEvent, ItemEventKind, SelectionDiff,
};

// ============================================================================
// Errors
// ============================================================================

pub use crate::{Result, SelectError};
