//! The paged-content virtualization and synchronization engine.
//!
//! [`Pager`] mirrors a live, externally-mutated ordered collection, lazily
//! materializes per-index content, propagates fine-grained edits into an
//! already-rendered paging surface without discarding unaffected pages,
//! and keeps one "current page" cursor consistent between user gestures
//! and programmatic position changes.
//!
//! The engine draws nothing. It owns a [`PagingSurface`] adapter that the
//! host implements over its native paging widget, and it consumes the
//! host's callbacks: [`Pager::page_changed_by_user`],
//! [`Pager::page_settled`], and [`Pager::finish_transition`].
//!
//! # Lifecycle
//!
//! Edit notifications are subscribed on [`Pager::build`] and unsubscribed
//! on [`Pager::teardown`] (or drop), on all exit paths. Between those
//! calls every source edit is applied in arrival order: mirror and content
//! cache first, then the minimal native-surface operation, then exactly
//! one `position_selected` notification once the change settles.
//!
//! # Example
//!
//! ```
//! use pagedeck::model::{PageItem, PageList};
//! use pagedeck::pager::{NoopSurface, Pager, PagerConfig};
//! use pagedeck::template::{TemplateConfig, ViewContent};
//! use std::sync::Arc;
//!
//! struct Label;
//! impl ViewContent for Label {}
//!
//! let list = Arc::new(PageList::from_values(vec!["a", "b", "c"]));
//! let pager = Pager::new(
//!     list.clone(),
//!     TemplateConfig::template(|| Box::new(Label) as Box<dyn ViewContent>),
//!     PagerConfig::new().with_animate_transitions(false),
//!     NoopSurface,
//! );
//! pager.build().unwrap();
//! assert_eq!(pager.position(), 0);
//!
//! // Inserting before the displayed page pushes it forward; its view is
//! // reused, not rebuilt.
//! list.insert(0, PageItem::value("x"));
//! assert_eq!(pager.position(), 1);
//! ```

mod cache;
mod config;
mod cursor;
mod disposal;
mod materializer;
mod mirror;
mod surface;
mod synchronizer;

pub use cache::{ContentHandle, ContentId};
pub use config::{DEFAULT_SETTLE_DELAY, PagerConfig, PagerOrientation};
pub use surface::{Direction, NoopSurface, PagingSurface, TransitionRequest, TransitionToken};
pub use synchronizer::SyncState;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use pagedeck_core::{ConnectionId, Signal, ThreadAffinity};

use crate::error::{Error, Result};
use crate::model::PageModel;
use crate::template::{TemplateConfig, ViewContent};

use synchronizer::{Notifications, PageSynchronizer};

/// Signals the engine exposes to the hosting control.
pub struct PagerSignals {
    /// Emitted exactly once per settled logical change: after every
    /// applied edit, completed programmatic position change, and settled
    /// user gesture. Carries the current page index.
    pub position_selected: Signal<usize>,
}

/// Connections into one source's change signals, released as a unit.
struct Subscription {
    model: Arc<dyn PageModel>,
    inserted: ConnectionId,
    removed: ConnectionId,
    moved: ConnectionId,
    replaced: ConnectionId,
    reset: ConnectionId,
}

impl Subscription {
    fn disconnect(&self) {
        if let Some(signals) = self.model.signals() {
            signals.item_inserted.disconnect(self.inserted);
            signals.item_removed.disconnect(self.removed);
            signals.item_moved.disconnect(self.moved);
            signals.item_replaced.disconnect(self.replaced);
            signals.collection_reset.disconnect(self.reset);
        }
    }
}

/// The paging engine for one rendered control instance.
///
/// Thread model: single-threaded cooperative, bound to the UI thread the
/// pager was created on; entry points assert that affinity in debug
/// builds. Slots on `position_selected` run on that same thread, after
/// the engine's internal state has settled.
pub struct Pager<S: PagingSurface> {
    inner: Arc<Mutex<PageSynchronizer<S>>>,
    signals: Arc<PagerSignals>,
    subscription: Mutex<Option<Subscription>>,
    affinity: ThreadAffinity,
}

impl<S: PagingSurface + 'static> Pager<S> {
    /// Create an engine over `model`, rendering through `template` onto
    /// `surface`. Nothing happens until [`build`](Pager::build).
    pub fn new(
        model: Arc<dyn PageModel>,
        template: TemplateConfig,
        config: PagerConfig,
        surface: S,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PageSynchronizer::new(
                model, template, config, surface,
            ))),
            signals: Arc::new(PagerSignals {
                position_selected: Signal::new(),
            }),
            subscription: Mutex::new(None),
            affinity: ThreadAffinity::current(),
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Build the native surface and subscribe to the source's edits.
    ///
    /// Emits one `position_selected` with the (clamped) initial position.
    pub fn build(&self) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        self.subscribe();
        let notes = self.inner.lock().rebuild()?;
        self.emit(notes);
        Ok(())
    }

    /// Unsubscribe from the source and destroy the native surface.
    pub fn teardown(&self) {
        self.affinity.debug_assert_same_thread();
        self.unsubscribe();
        self.inner.lock().teardown();
    }

    /// Reset-equivalent rebuild from the source's current state.
    ///
    /// The only edit path for sources without change notification.
    pub fn refresh(&self) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        let notes = {
            let mut inner = self.inner.lock();
            if inner.state() == SyncState::Empty {
                return Err(Error::NotBuilt);
            }
            inner.rebuild()?
        };
        self.emit(notes);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Position
    // -------------------------------------------------------------------------

    /// The current page index (`0` for an empty collection).
    pub fn position(&self) -> usize {
        self.inner.lock().position()
    }

    /// Number of pages backing the surface.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current lifecycle state of the surface.
    pub fn state(&self) -> SyncState {
        self.inner.lock().state()
    }

    /// Programmatic position change.
    ///
    /// Direction is derived from the previously requested position;
    /// animation follows configuration. The `position_selected`
    /// notification fires when the transition completes if animated,
    /// immediately otherwise. Setting the current position again is a
    /// silent no-op.
    pub fn set_position(&self, index: usize) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        let notes = self.inner.lock().set_position(index)?;
        self.emit(notes);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Host callbacks
    // -------------------------------------------------------------------------

    /// The native surface reports that a user gesture landed on `index`.
    ///
    /// The cursor is written under the internal-update guard; the
    /// notification waits for [`page_settled`](Pager::page_settled).
    pub fn page_changed_by_user(&self, index: usize) {
        self.affinity.debug_assert_same_thread();
        let notes = self.inner.lock().page_changed_by_user(index);
        self.emit(notes);
    }

    /// The native surface reports that scrolling came to rest.
    pub fn page_settled(&self) {
        self.affinity.debug_assert_same_thread();
        let notes = self.inner.lock().page_settled();
        self.emit(notes);
    }

    /// The host reports completion of a requested transition (including
    /// any settle delay). Stale or superseded tokens are ignored.
    pub fn finish_transition(&self, token: TransitionToken) {
        self.affinity.debug_assert_same_thread();
        let notes = self.inner.lock().finish_transition(token);
        self.emit(notes);
    }

    // -------------------------------------------------------------------------
    // Content access
    // -------------------------------------------------------------------------

    /// Materialize content for `index` without changing position.
    ///
    /// Surface adapters use this to prepare neighbor pages on demand.
    /// Must not be called from inside a [`PagingSurface`] method.
    pub fn prepare(&self, index: usize) -> Result<ContentId> {
        self.affinity.debug_assert_same_thread();
        self.inner.lock().prepare(index)
    }

    /// Identity of the cached content at `index`, if materialized.
    pub fn content_id(&self, index: usize) -> Option<ContentId> {
        self.inner.lock().content_id(index)
    }

    /// Run `f` against the renderable content at `index`, if materialized.
    ///
    /// Must not be called from inside a [`PagingSurface`] method.
    pub fn with_content<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut dyn ViewContent) -> R,
    ) -> Option<R> {
        self.affinity.debug_assert_same_thread();
        self.inner.lock().with_content(index, f)
    }

    // -------------------------------------------------------------------------
    // Reconfiguration
    // -------------------------------------------------------------------------

    /// Swap the source. Re-subscribes and, if built, rebuilds at the
    /// clamped cursor with one notification.
    pub fn set_model(&self, model: Arc<dyn PageModel>) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        self.unsubscribe();
        let (notes, built) = {
            let mut inner = self.inner.lock();
            inner.replace_model(model);
            match inner.state() {
                SyncState::Empty => (Vec::new(), false),
                _ => (inner.rebuild()?, true),
            }
        };
        if built {
            self.subscribe();
        }
        self.emit(notes);
        Ok(())
    }

    /// Swap the template configuration. If built, rebuilds with one
    /// notification.
    pub fn set_template(&self, template: TemplateConfig) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        let notes = self.inner.lock().set_template(template)?;
        self.emit(notes);
        Ok(())
    }

    /// Change the paging axis. If built, forces a full rebuild.
    pub fn set_orientation(&self, orientation: PagerOrientation) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        let notes = self.inner.lock().set_orientation(orientation)?;
        self.emit(notes);
        Ok(())
    }

    /// Enable or disable user swiping; forwarded opaquely to the surface.
    pub fn set_swipe_enabled(&self, enabled: bool) {
        self.affinity.debug_assert_same_thread();
        self.inner.lock().set_swipe_enabled(enabled);
    }

    /// Toggle transition animation (and the removal settle delay with it).
    pub fn set_animate_transitions(&self, animate: bool) {
        self.affinity.debug_assert_same_thread();
        self.inner.lock().set_animate_transitions(animate);
    }

    /// Adjust the settle delay applied to animated removals.
    pub fn set_settle_delay(&self, delay: Duration) {
        self.affinity.debug_assert_same_thread();
        self.inner.lock().set_settle_delay(delay);
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> PagerConfig {
        self.inner.lock().config().clone()
    }

    /// The engine's notification signals.
    pub fn signals(&self) -> &PagerSignals {
        &self.signals
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn emit(&self, notes: Notifications) {
        for index in notes {
            self.signals.position_selected.emit(index);
        }
    }

    fn subscribe(&self) {
        let mut slot = self.subscription.lock();
        if slot.is_some() {
            return;
        }
        let model = self.inner.lock().model();
        let Some(signals) = model.signals() else {
            tracing::debug!(
                target: "pagedeck::sync",
                "source does not notify; only refresh() rebuilds are supported"
            );
            return;
        };

        let inserted = {
            let inner = Arc::downgrade(&self.inner);
            let out = self.signals.clone();
            signals.item_inserted.connect(move |(index, item)| {
                let Some(inner) = inner.upgrade() else { return };
                let notes = inner
                    .lock()
                    .insert(*index, item.clone())
                    .unwrap_or_else(|e| panic!("insert edit could not be applied: {e}"));
                for n in notes {
                    out.position_selected.emit(n);
                }
            })
        };
        let removed = {
            let inner = Arc::downgrade(&self.inner);
            let out = self.signals.clone();
            signals.item_removed.connect(move |&index| {
                let Some(inner) = inner.upgrade() else { return };
                let notes = inner
                    .lock()
                    .remove(index)
                    .unwrap_or_else(|e| panic!("remove edit could not be applied: {e}"));
                for n in notes {
                    out.position_selected.emit(n);
                }
            })
        };
        let moved = {
            let inner = Arc::downgrade(&self.inner);
            let out = self.signals.clone();
            signals.item_moved.connect(move |&(from, to)| {
                let Some(inner) = inner.upgrade() else { return };
                let notes = inner
                    .lock()
                    .move_item(from, to)
                    .unwrap_or_else(|e| panic!("move edit could not be applied: {e}"));
                for n in notes {
                    out.position_selected.emit(n);
                }
            })
        };
        let replaced = {
            let inner = Arc::downgrade(&self.inner);
            let out = self.signals.clone();
            signals.item_replaced.connect(move |(index, item)| {
                let Some(inner) = inner.upgrade() else { return };
                let notes = inner
                    .lock()
                    .replace(*index, item.clone())
                    .unwrap_or_else(|e| panic!("replace edit could not be applied: {e}"));
                for n in notes {
                    out.position_selected.emit(n);
                }
            })
        };
        let reset = {
            let inner = Arc::downgrade(&self.inner);
            let out = self.signals.clone();
            signals.collection_reset.connect(move |_| {
                let Some(inner) = inner.upgrade() else { return };
                let notes = inner
                    .lock()
                    .rebuild()
                    .unwrap_or_else(|e| panic!("reset could not be applied: {e}"));
                for n in notes {
                    out.position_selected.emit(n);
                }
            })
        };

        *slot = Some(Subscription {
            model,
            inserted,
            removed,
            moved,
            replaced,
            reset,
        });
    }

    fn unsubscribe(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.disconnect();
        }
    }
}

impl<S: PagingSurface> Drop for Pager<S> {
    fn drop(&mut self) {
        // Same cleanup as teardown(), minus the affinity assertion: drops
        // may run on whichever thread released the last reference.
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.disconnect();
        }
        self.inner.lock().teardown();
    }
}

static_assertions::assert_impl_all!(Pager<NoopSurface>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CollectionSignals, PageItem, PageList};

    struct Blank;
    impl ViewContent for Blank {}

    fn blank_template() -> TemplateConfig {
        TemplateConfig::template(|| Box::new(Blank) as Box<dyn ViewContent>)
    }

    fn pager_over(list: Arc<PageList>) -> Pager<NoopSurface> {
        Pager::new(
            list,
            blank_template(),
            PagerConfig::new().with_animate_transitions(false),
            NoopSurface,
        )
    }

    #[test]
    fn test_build_subscribes_and_notifies() {
        let list = Arc::new(PageList::from_values(vec!["a", "b"]));
        let pager = pager_over(list.clone());

        let selected = Arc::new(Mutex::new(Vec::new()));
        let recv = selected.clone();
        pager.signals().position_selected.connect(move |&index| {
            recv.lock().push(index);
        });

        pager.build().unwrap();

        assert_eq!(*selected.lock(), vec![0]);
        let signals = list.signals().unwrap();
        assert_eq!(signals.item_inserted.connection_count(), 1);
        assert_eq!(signals.collection_reset.connection_count(), 1);
    }

    #[test]
    fn test_teardown_unsubscribes() {
        let list = Arc::new(PageList::from_values(vec!["a"]));
        let pager = pager_over(list.clone());
        pager.build().unwrap();

        pager.teardown();

        let signals = list.signals().unwrap();
        assert_eq!(signals.item_inserted.connection_count(), 0);
        assert_eq!(signals.item_removed.connection_count(), 0);
        assert_eq!(pager.state(), SyncState::Empty);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let list = Arc::new(PageList::from_values(vec!["a"]));
        {
            let pager = pager_over(list.clone());
            pager.build().unwrap();
            assert_eq!(list.signals().unwrap().item_removed.connection_count(), 1);
        }
        assert_eq!(list.signals().unwrap().item_removed.connection_count(), 0);
    }

    #[test]
    fn test_edits_flow_through_subscription() {
        let list = Arc::new(PageList::from_values(vec!["a", "b", "c"]));
        let pager = pager_over(list.clone());
        pager.build().unwrap();

        list.remove(0);
        assert_eq!(pager.len(), 2);
        assert_eq!(pager.position(), 0);

        list.push(PageItem::value("d"));
        assert_eq!(pager.len(), 3);
    }

    #[test]
    fn test_non_notifying_model_falls_back_to_refresh() {
        struct Snapshot {
            items: parking_lot::RwLock<Vec<PageItem>>,
        }
        impl PageModel for Snapshot {
            fn count(&self) -> usize {
                self.items.read().len()
            }
            fn item(&self, index: usize) -> Option<PageItem> {
                self.items.read().get(index).cloned()
            }
            fn signals(&self) -> Option<&CollectionSignals> {
                None
            }
        }

        let model = Arc::new(Snapshot {
            items: parking_lot::RwLock::new(vec![PageItem::value(1u8)]),
        });
        let pager = Pager::new(
            model.clone(),
            blank_template(),
            PagerConfig::new().with_animate_transitions(false),
            NoopSurface,
        );
        pager.build().unwrap();
        assert_eq!(pager.len(), 1);

        // Mutations are invisible until refreshed.
        model.items.write().push(PageItem::value(2u8));
        assert_eq!(pager.len(), 1);
        pager.refresh().unwrap();
        assert_eq!(pager.len(), 2);
    }

    #[test]
    fn test_refresh_requires_build() {
        let list = Arc::new(PageList::from_values(vec!["a"]));
        let pager = pager_over(list);
        assert!(matches!(pager.refresh(), Err(Error::NotBuilt)));
    }

    #[test]
    fn test_set_model_swaps_subscription() {
        let first = Arc::new(PageList::from_values(vec!["a", "b"]));
        let second = Arc::new(PageList::from_values(vec!["p", "q", "r"]));
        let pager = pager_over(first.clone());
        pager.build().unwrap();

        pager.set_model(second.clone()).unwrap();

        assert_eq!(first.signals().unwrap().item_removed.connection_count(), 0);
        assert_eq!(second.signals().unwrap().item_removed.connection_count(), 1);
        assert_eq!(pager.len(), 3);

        // Edits on the new source flow; the old source is inert.
        second.remove(0);
        assert_eq!(pager.len(), 2);
        first.remove(0);
        assert_eq!(pager.len(), 2);
    }
}
