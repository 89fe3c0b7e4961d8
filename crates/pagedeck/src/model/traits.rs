//! Core traits for change-notifying page sources.
//!
//! This module defines the contract between an externally owned ordered
//! collection and the paging engine: a count/indexer query plus a stream of
//! fine-grained edit notifications. Sources that cannot notify (plain
//! snapshots) return `None` from [`PageModel::signals`]; the engine then
//! falls back to whole-collection rebuilds via its `refresh` operation.

use pagedeck_core::Signal;

use super::item::PageItem;

/// The trait page sources implement.
///
/// A `PageModel` exposes an ordered sequence of [`PageItem`]s. The engine
/// holds a non-owning view of the source: it mirrors the sequence locally
/// and relies on [`CollectionSignals`] to keep that mirror in lock-step.
///
/// # Implementation Requirements
///
/// - [`count`](PageModel::count) and [`item`](PageModel::item) must reflect
///   the state *after* the most recently emitted notification.
/// - Notifications must be emitted in the order the edits occurred; the
///   engine applies them without reordering or coalescing.
pub trait PageModel: Send + Sync {
    /// Number of items in the source.
    fn count(&self) -> usize;

    /// Item at `index`, or `None` when out of range.
    fn item(&self, index: usize) -> Option<PageItem>;

    /// Change notifications for this source.
    ///
    /// The capability check: returning `None` declares a non-notifying
    /// source, for which the engine only supports reset-equivalent
    /// whole-collection rebuilds.
    fn signals(&self) -> Option<&CollectionSignals> {
        None
    }
}

/// Collection of signals emitted by change-notifying page sources.
///
/// Each signal describes one settled edit and carries the indices and items
/// the engine needs to apply the same edit to its mirror, so receivers
/// never re-query the source mid-notification.
pub struct CollectionSignals {
    /// Emitted after an item was inserted.
    /// Args: (index, inserted item)
    pub item_inserted: Signal<(usize, PageItem)>,

    /// Emitted after an item was removed.
    /// Args: index the item was removed from
    pub item_removed: Signal<usize>,

    /// Emitted after an item was moved.
    /// Args: (from index, to index)
    pub item_moved: Signal<(usize, usize)>,

    /// Emitted after an item was replaced in place.
    /// Args: (index, replacement item)
    pub item_replaced: Signal<(usize, PageItem)>,

    /// Emitted after the whole collection was replaced.
    pub collection_reset: Signal<()>,
}

impl Default for CollectionSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionSignals {
    /// Creates a new set of collection signals.
    pub fn new() -> Self {
        Self {
            item_inserted: Signal::new(),
            item_removed: Signal::new(),
            item_moved: Signal::new(),
            item_replaced: Signal::new(),
            collection_reset: Signal::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Convenience methods for emitting signals
    // -------------------------------------------------------------------------

    /// Runs the mutation, then emits `item_inserted`.
    pub fn emit_inserted<F>(&self, index: usize, item: PageItem, insert_fn: F)
    where
        F: FnOnce(),
    {
        insert_fn();
        self.item_inserted.emit((index, item));
    }

    /// Runs the mutation, then emits `item_removed`.
    pub fn emit_removed<F>(&self, index: usize, remove_fn: F)
    where
        F: FnOnce(),
    {
        remove_fn();
        self.item_removed.emit(index);
    }

    /// Runs the mutation, then emits `item_moved`.
    pub fn emit_moved<F>(&self, from: usize, to: usize, move_fn: F)
    where
        F: FnOnce(),
    {
        move_fn();
        self.item_moved.emit((from, to));
    }

    /// Runs the mutation, then emits `item_replaced`.
    pub fn emit_replaced<F>(&self, index: usize, item: PageItem, replace_fn: F)
    where
        F: FnOnce(),
    {
        replace_fn();
        self.item_replaced.emit((index, item));
    }

    /// Runs the mutation, then emits `collection_reset`.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        reset_fn();
        self.collection_reset.emit(());
    }
}
