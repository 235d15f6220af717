//! Core systems for Horizon Select.
//!
//! This crate provides the foundational pieces the selection engine is built on:
//!
//! - **Identifiers**: Stable arena keys for items and containers
//! - **Signal/Slot System**: Type-safe, synchronous observer lists
//! - **Errors**: The configuration error taxonomy shared by every crate
//! - **Logging**: Tracing targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_select_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```

mod error;
pub mod id;
pub mod logging;
pub mod signal;

pub use error::{Result, SelectError, Surface};
pub use id::{ContainerId, ItemId};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
