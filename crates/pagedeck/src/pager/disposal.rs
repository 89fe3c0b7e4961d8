//! Deterministic release of evicted page content.

use crate::model::PageItem;

use super::cache::ContentHandle;

/// Owns every evicted content handle until it is released exactly once.
///
/// Handles are normally disposed synchronously. While a native transition
/// is in flight, though, the outgoing page may still be on screen, so
/// eviction is deferred: the handle parks here and is flushed when the
/// transition finalizes. Parked handles are also the pool the
/// materializer reclaims from, so a single item is never represented by
/// two live native handles at once.
///
/// Disposal order per handle: detach from the native parent surface, then
/// release owned resources. Pre-built views are detached but stay owned by
/// whoever supplied them.
#[derive(Default)]
pub(crate) struct DisposalCoordinator {
    deferred: Vec<ContentHandle>,
}

impl DisposalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an evicted handle.
    ///
    /// Disposes immediately, or parks the handle when `defer` is set
    /// (a transition is in flight that may still show it).
    pub fn retire(&mut self, handle: ContentHandle, defer: bool) {
        if defer {
            tracing::trace!(
                target: "pagedeck::disposal",
                id = ?handle.id(),
                "deferring disposal until transition settles"
            );
            self.deferred.push(handle);
        } else {
            Self::dispose(handle);
        }
    }

    /// Retire a batch of evicted handles.
    pub fn retire_all(&mut self, handles: Vec<ContentHandle>, defer: bool) {
        for handle in handles {
            self.retire(handle, defer);
        }
    }

    /// Take back a parked handle whose tag is the given item, if any.
    ///
    /// Used by the materializer to reuse a still-live handle instead of
    /// creating a duplicate for the same item.
    pub fn reclaim(&mut self, item: &PageItem) -> Option<ContentHandle> {
        let position = self.deferred.iter().position(|h| h.tag().same(item))?;
        let handle = self.deferred.swap_remove(position);
        tracing::trace!(
            target: "pagedeck::disposal",
            id = ?handle.id(),
            "reclaimed deferred handle"
        );
        Some(handle)
    }

    /// Dispose any parked handles tagged with the given item right away.
    ///
    /// Called before an item is removed or replaced, so a stale handle for
    /// it can never be reclaimed afterwards.
    pub fn discard_matching(&mut self, item: &PageItem) {
        while let Some(position) = self.deferred.iter().position(|h| h.tag().same(item)) {
            Self::dispose(self.deferred.swap_remove(position));
        }
    }

    /// Dispose every parked handle.
    pub fn flush(&mut self) {
        for handle in self.deferred.drain(..) {
            Self::dispose(handle);
        }
    }

    /// Number of handles currently parked.
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    fn dispose(mut handle: ContentHandle) {
        tracing::trace!(target: "pagedeck::disposal", id = ?handle.id(), "disposing content");
        handle.detach();
        handle.release();
    }
}

impl Drop for DisposalCoordinator {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ViewContent;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Probe {
        detaches: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
    }

    impl ViewContent for Probe {
        fn detach(&mut self) {
            self.detaches.fetch_add(1, Ordering::SeqCst);
        }

        fn release(&mut self) {
            // Detach must have happened first.
            assert!(self.detaches.load(Ordering::SeqCst) > self.releases.load(Ordering::SeqCst));
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn probe_handle(
        item: &PageItem,
        detaches: &Arc<AtomicUsize>,
        releases: &Arc<AtomicUsize>,
    ) -> ContentHandle {
        ContentHandle::owned(
            Box::new(Probe {
                detaches: detaches.clone(),
                releases: releases.clone(),
            }),
            item.clone(),
        )
    }

    #[test]
    fn test_immediate_disposal_order() {
        let (detaches, releases) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let item = PageItem::value(1u8);
        let mut disposal = DisposalCoordinator::new();

        disposal.retire(probe_handle(&item, &detaches, &releases), false);

        assert_eq!(detaches.load(Ordering::SeqCst), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deferred_until_flush() {
        let (detaches, releases) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let item = PageItem::value(1u8);
        let mut disposal = DisposalCoordinator::new();

        disposal.retire(probe_handle(&item, &detaches, &releases), true);
        assert_eq!(disposal.deferred_count(), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        disposal.flush();
        assert_eq!(disposal.deferred_count(), 0);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reclaim_skips_disposal() {
        let (detaches, releases) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let item = PageItem::value(1u8);
        let mut disposal = DisposalCoordinator::new();

        let handle = probe_handle(&item, &detaches, &releases);
        let id = handle.id();
        disposal.retire(handle, true);

        let reclaimed = disposal.reclaim(&item).unwrap();
        assert_eq!(reclaimed.id(), id);
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        // Nothing left to reclaim for other items.
        assert!(disposal.reclaim(&PageItem::value(2u8)).is_none());
    }

    #[test]
    fn test_discard_matching_disposes_now() {
        let (detaches, releases) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let item = PageItem::value(1u8);
        let other = PageItem::value(2u8);
        let mut disposal = DisposalCoordinator::new();

        disposal.retire(probe_handle(&item, &detaches, &releases), true);
        disposal.retire(probe_handle(&other, &detaches, &releases), true);

        disposal.discard_matching(&item);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(disposal.deferred_count(), 1);
        assert!(disposal.reclaim(&item).is_none());
    }

    #[test]
    fn test_drop_flushes() {
        let (detaches, releases) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let item = PageItem::value(1u8);

        {
            let mut disposal = DisposalCoordinator::new();
            disposal.retire(probe_handle(&item, &detaches, &releases), true);
        }

        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prebuilt_detached_but_not_released() {
        struct Tracked {
            detaches: Arc<AtomicUsize>,
            releases: Arc<AtomicUsize>,
        }
        impl ViewContent for Tracked {
            fn detach(&mut self) {
                self.detaches.fetch_add(1, Ordering::SeqCst);
            }
            fn release(&mut self) {
                self.releases.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (detaches, releases) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let item = PageItem::view(Box::new(Tracked {
            detaches: detaches.clone(),
            releases: releases.clone(),
        }));
        let PageItem::View(view) = &item else {
            unreachable!()
        };
        let handle = ContentHandle::shared(view.clone(), item.clone());

        let mut disposal = DisposalCoordinator::new();
        disposal.retire(handle, false);

        assert_eq!(detaches.load(Ordering::SeqCst), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 0);
    }
}
