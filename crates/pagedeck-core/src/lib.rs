//! Core systems for Pagedeck.
//!
//! This crate provides the foundational components of the Pagedeck paging
//! engine:
//!
//! - **Signal/Slot System**: Type-safe change notification between the
//!   data source, the engine, and the host control
//! - **Thread Affinity**: Debug verification of the single-UI-thread
//!   contract the engine runs under
//!
//! # Signal/Slot Example
//!
//! ```
//! use pagedeck_core::Signal;
//!
//! // Create a signal that notifies when the current page changes
//! let position_selected = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = position_selected.connect(|index| {
//!     println!("Now showing page {}", index);
//! });
//!
//! // Emit the signal
//! position_selected.emit(0);
//!
//! // Disconnect when done
//! position_selected.disconnect(conn_id);
//! ```

pub mod signal;
pub mod thread_check;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
