//! Signal/slot system for Pagedeck.
//!
//! This module provides a type-safe signal/slot mechanism for notifying
//! collaborators about state changes. Signals are emitted by objects when
//! their state changes, and connected slots (callbacks) are invoked in
//! response.
//!
//! Pagedeck runs under a single-threaded cooperative model bound to the
//! host UI thread, so slots are always invoked directly on the emitting
//! thread; there is no event-loop queuing. Signals are still `Send + Sync`
//! so they can live inside shared engine state.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Example
//!
//! ```
//! use pagedeck_core::Signal;
//!
//! // Create a signal that passes the selected page index
//! let position_selected = Signal::<usize>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = position_selected.connect(|index| {
//!     println!("Page selected: {}", index);
//! });
//!
//! // Emit the signal
//! position_selected.emit(2);
//!
//! // Disconnect when done
//! position_selected.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with the
/// provided arguments, in an unspecified order, on the emitting thread.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple like `(usize, bool)` for
///   multiple arguments.
///
/// # Blocking
///
/// [`Signal::set_blocked`] temporarily suppresses emission. This is useful
/// during initialization or internally-driven updates to prevent cascading
/// notifications.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot
    /// later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let connection = Connection {
            slot: Arc::new(slot),
        };
        self.connections.lock().insert(connection)
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// If the signal is blocked, this does nothing. Slots connected or
    /// disconnected by a slot during emission take effect on the next emit.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "pagedeck_core::signal", "signal blocked, skipping emit");
            return;
        }

        // Snapshot the slots so a handler may connect/disconnect without
        // deadlocking on the connection map.
        let slots: Vec<_> = {
            let connections = self.connections.lock();
            tracing::trace!(
                target: "pagedeck_core::signal",
                connection_count = connections.len(),
                "emitting signal"
            );
            connections.iter().map(|(_, c)| c.slot.clone()).collect()
        };

        for slot in slots {
            slot(&args);
        }
    }
}

// Signal is Send + Sync when Args is Send: the connection map is behind a
// Mutex and slots are Send + Sync.
static_assertions::assert_impl_all!(Signal<usize>: Send, Sync);

/// A connection guard that automatically disconnects when dropped.
///
/// This is useful for RAII-style connection management, ensuring
/// connections are cleaned up when the receiver goes out of scope. Created
/// via [`Signal::connect_scoped`].
///
/// # Example
///
/// ```
/// use pagedeck_core::Signal;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let signal = Arc::new(Signal::<usize>::new());
/// let counter = Arc::new(AtomicUsize::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.clone().connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42); // counter = 42
/// }
/// signal.emit(43); // Nothing happens - connection was dropped
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<Args: Send + 'static> {
    signal: Arc<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: Send + 'static> Signal<Args> {
    /// Connect a slot with automatic disconnection when the guard is
    /// dropped.
    ///
    /// The guard keeps the signal alive through its `Arc`, so dropping the
    /// guard is always safe regardless of drop order.
    pub fn connect_scoped<F>(self: Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard { signal: self, id }
    }
}

impl<Args: Send + 'static> ConnectionGuard<Args> {
    /// The connection this guard manages.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: Send + 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        let _ = self.signal.disconnect(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        let values = received.lock();
        assert_eq!(*values, vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        signal.emit(2);

        let values = received.lock();
        assert_eq!(*values, vec![1]); // Only received before disconnect
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        signal.emit(2); // Should be ignored
        signal.set_blocked(false);
        signal.emit(3);

        let values = received.lock();
        assert_eq!(*values, vec![1, 3]);
    }

    #[test]
    fn test_multiple_connections() {
        let signal = Signal::<String>::new();
        let count = Arc::new(Mutex::new(0));

        for _ in 0..3 {
            let count_clone = count.clone();
            signal.connect(move |_| {
                *count_clone.lock() += 1;
            });
        }

        assert_eq!(signal.connection_count(), 3);
        signal.emit("test".to_string());
        assert_eq!(*count.lock(), 3);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();

        for _ in 0..5 {
            signal.connect(|_| {});
        }

        assert_eq!(signal.connection_count(), 5);
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_connection_guard() {
        let signal = Arc::new(Signal::<i32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let received_clone = received.clone();
            let _guard = signal.clone().connect_scoped(move |&value| {
                received_clone.lock().push(value);
            });
            signal.emit(1);
        }

        // Guard dropped, connection removed
        signal.emit(2);

        let values = received.lock();
        assert_eq!(*values, vec![1]);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_slot_can_reconnect_during_emit() {
        let signal = Arc::new(Signal::<i32>::new());

        let signal_clone = signal.clone();
        signal.connect(move |_| {
            // Connecting from inside a slot must not deadlock.
            signal_clone.connect(|_| {});
        });

        signal.emit(1);
        assert_eq!(signal.connection_count(), 2);
    }
}
