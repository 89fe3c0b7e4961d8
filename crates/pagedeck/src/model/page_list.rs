//! Generic change-notifying page source.
//!
//! `PageList` is the canonical [`PageModel`] implementation: an ordered,
//! interior-mutable list of [`PageItem`]s that emits one settled
//! notification per edit. It is the usual way a host control feeds the
//! paging engine.

use parking_lot::RwLock;

use super::item::PageItem;
use super::traits::{CollectionSignals, PageModel};

/// An ordered, change-notifying list of page items.
///
/// Every mutating method applies the edit and emits the matching
/// [`CollectionSignals`] notification, in edit order. Index arguments
/// follow `Vec` conventions (`insert` accepts `len`, everything else
/// requires `index < len`).
///
/// # Example
///
/// ```
/// use pagedeck::model::{PageItem, PageList, PageModel};
///
/// let list = PageList::from_values(vec!["a", "b", "c"]);
/// assert_eq!(list.len(), 3);
///
/// list.signals().unwrap().item_inserted.connect(|(index, _item)| {
///     println!("inserted at {}", index);
/// });
/// list.insert(1, PageItem::value("x"));
/// assert_eq!(list.len(), 4);
/// ```
pub struct PageList {
    items: RwLock<Vec<PageItem>>,
    signals: CollectionSignals,
}

impl Default for PageList {
    fn default() -> Self {
        Self::empty()
    }
}

impl PageList {
    /// Creates a list with the given items.
    pub fn new(items: Vec<PageItem>) -> Self {
        Self {
            items: RwLock::new(items),
            signals: CollectionSignals::new(),
        }
    }

    /// Creates an empty list.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Creates a list of plain-value items from concrete values.
    pub fn from_values<T: Send + Sync + 'static>(values: Vec<T>) -> Self {
        Self::new(values.into_iter().map(PageItem::value).collect())
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns the item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<PageItem> {
        self.items.read().get(index).cloned()
    }

    /// Appends an item to the end of the list.
    pub fn push(&self, item: PageItem) {
        let index = self.items.read().len();
        self.insert(index, item);
    }

    /// Inserts an item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&self, index: usize, item: PageItem) {
        self.signals.emit_inserted(index, item.clone(), || {
            self.items.write().insert(index, item);
        });
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&self, index: usize) -> PageItem {
        let mut removed = None;
        self.signals.emit_removed(index, || {
            removed = Some(self.items.write().remove(index));
        });
        removed.unwrap()
    }

    /// Moves the item at `from` so it ends up at `to`.
    ///
    /// # Panics
    ///
    /// Panics if `from >= len()` or `to >= len()`.
    pub fn move_item(&self, from: usize, to: usize) {
        if from == to {
            return;
        }
        self.signals.emit_moved(from, to, || {
            let mut items = self.items.write();
            let item = items.remove(from);
            items.insert(to, item);
        });
    }

    /// Replaces the item at `index`, returning the previous item.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn replace(&self, index: usize, item: PageItem) -> PageItem {
        let mut previous = None;
        self.signals.emit_replaced(index, item.clone(), || {
            previous = Some(std::mem::replace(&mut self.items.write()[index], item));
        });
        previous.unwrap()
    }

    /// Replaces all items.
    pub fn set_items(&self, items: Vec<PageItem>) {
        self.signals.emit_reset(|| {
            *self.items.write() = items;
        });
    }

    /// Removes all items.
    pub fn clear(&self) {
        self.set_items(Vec::new());
    }
}

impl PageModel for PageList {
    fn count(&self) -> usize {
        self.len()
    }

    fn item(&self, index: usize) -> Option<PageItem> {
        self.get(index)
    }

    fn signals(&self) -> Option<&CollectionSignals> {
        Some(&self.signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn list_abc() -> PageList {
        PageList::from_values(vec!["a", "b", "c"])
    }

    #[test]
    fn test_push_and_signals() {
        let list = PageList::empty();
        let inserted = Arc::new(Mutex::new(Vec::new()));

        let recv = inserted.clone();
        list.signals()
            .unwrap()
            .item_inserted
            .connect(move |(index, _)| {
                recv.lock().push(*index);
            });

        list.push(PageItem::value(1u8));
        list.push(PageItem::value(2u8));

        assert_eq!(list.len(), 2);
        assert_eq!(*inserted.lock(), vec![0, 1]);
    }

    #[test]
    fn test_remove_and_signals() {
        let list = list_abc();
        let removed = Arc::new(Mutex::new(Vec::new()));

        let recv = removed.clone();
        list.signals().unwrap().item_removed.connect(move |index| {
            recv.lock().push(*index);
        });

        let item = list.remove(1);
        assert_eq!(item.downcast_value::<&str>(), Some(&"b"));
        assert_eq!(list.len(), 2);
        assert_eq!(*removed.lock(), vec![1]);
    }

    #[test]
    fn test_move_preserves_identity() {
        let list = list_abc();
        let moved_item = list.get(0).unwrap();

        list.move_item(0, 2);

        assert!(list.get(2).unwrap().same(&moved_item));
        assert_eq!(list.get(0).unwrap().downcast_value::<&str>(), Some(&"b"));
    }

    #[test]
    fn test_move_to_same_index_is_silent() {
        let list = list_abc();
        let moved = Arc::new(Mutex::new(0));

        let recv = moved.clone();
        list.signals().unwrap().item_moved.connect(move |_| {
            *recv.lock() += 1;
        });

        list.move_item(1, 1);
        assert_eq!(*moved.lock(), 0);
    }

    #[test]
    fn test_replace_returns_previous() {
        let list = list_abc();
        let replaced = Arc::new(Mutex::new(Vec::new()));

        let recv = replaced.clone();
        list.signals()
            .unwrap()
            .item_replaced
            .connect(move |(index, _)| {
                recv.lock().push(*index);
            });

        let previous = list.replace(2, PageItem::value("z"));
        assert_eq!(previous.downcast_value::<&str>(), Some(&"c"));
        assert_eq!(list.get(2).unwrap().downcast_value::<&str>(), Some(&"z"));
        assert_eq!(*replaced.lock(), vec![2]);
    }

    #[test]
    fn test_set_items_resets() {
        let list = list_abc();
        let resets = Arc::new(Mutex::new(0));

        let recv = resets.clone();
        list.signals().unwrap().collection_reset.connect(move |_| {
            *recv.lock() += 1;
        });

        list.set_items(vec![PageItem::value("p"), PageItem::value("q")]);
        assert_eq!(list.len(), 2);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(*resets.lock(), 2);
    }

    #[test]
    fn test_model_trait_view() {
        let list = list_abc();
        let model: &dyn PageModel = &list;

        assert_eq!(model.count(), 3);
        assert!(model.item(0).is_some());
        assert!(model.item(3).is_none());
        assert!(model.signals().is_some());
    }
}
