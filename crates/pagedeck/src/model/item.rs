//! Page items: the elements of the externally owned data source.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::template::ViewContent;

/// Type-erased shared data value carried by a [`PageItem::Value`].
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// Shared handle to pre-built content carried by a [`PageItem::View`].
pub type SharedView = Arc<Mutex<Box<dyn ViewContent>>>;

/// One element of the externally owned ordered data source.
///
/// Items come in two shapes: pre-built renderable content, displayed
/// as-is, and plain data values that are rendered through the configured
/// template. The engine takes no ownership of the underlying allocation
/// until the item is materialized into a page.
///
/// Items are identity-comparable, not value-comparable: [`PageItem::same`]
/// compares the shared allocation, so two items wrapping equal-but-distinct
/// values are distinct pages.
#[derive(Clone)]
pub enum PageItem {
    /// A pre-built view, displayed without template instantiation.
    View(SharedView),
    /// A plain data value, rendered through the configured template.
    Value(SharedValue),
}

impl PageItem {
    /// Wrap a plain data value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    /// Wrap pre-built content.
    pub fn view(content: Box<dyn ViewContent>) -> Self {
        Self::View(Arc::new(Mutex::new(content)))
    }

    /// Identity comparison: `true` if both items refer to the same shared
    /// allocation.
    pub fn same(&self, other: &PageItem) -> bool {
        match (self, other) {
            (Self::View(a), Self::View(b)) => Arc::ptr_eq(a, b),
            (Self::Value(a), Self::Value(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns `true` for pre-built view items.
    pub fn is_view(&self) -> bool {
        matches!(self, Self::View(_))
    }

    /// Downcast a plain value item to a concrete type.
    ///
    /// Returns `None` for view items or on type mismatch.
    pub fn downcast_value<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            Self::Value(value) => value.downcast_ref::<T>(),
            Self::View(_) => None,
        }
    }
}

impl std::fmt::Debug for PageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::View(_) => f.write_str("PageItem::View(..)"),
            Self::Value(_) => f.write_str("PageItem::Value(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_equality() {
        let a = PageItem::value("hello".to_string());
        let b = PageItem::value("hello".to_string());

        assert!(a.same(&a));
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b)); // Equal values, distinct allocations
    }

    #[test]
    fn test_view_and_value_never_same() {
        struct Empty;
        impl crate::template::ViewContent for Empty {}

        let view = PageItem::view(Box::new(Empty));
        let value = PageItem::value(1u8);
        assert!(!view.same(&value));
        assert!(view.is_view());
        assert!(!value.is_view());
    }

    #[test]
    fn test_downcast_value() {
        let item = PageItem::value(42u32);
        assert_eq!(item.downcast_value::<u32>(), Some(&42));
        assert_eq!(item.downcast_value::<String>(), None);
    }
}
