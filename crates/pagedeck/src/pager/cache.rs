//! Dense index-addressed store of materialized page content.
//!
//! The cache holds one slot per mirrored item at all times; a slot may be
//! empty ("holder without content") until the materializer fills it. Slot
//! operations mirror the collection edits one-to-one, so a cache index
//! always means the same thing as the matching mirror index.
//!
//! Evicted handles are returned to the caller rather than dropped in
//! place: ownership transfers to the disposal coordinator, which releases
//! each handle exactly once.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::PageItem;
use crate::template::ViewContent;

static NEXT_CONTENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of one materialized content handle.
///
/// Used by tests and the stale-transition guard to verify "same handle,
/// not an equal-looking rebuild".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(u64);

impl ContentId {
    fn next() -> Self {
        Self(NEXT_CONTENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The materialized, renderable representation of one item at one index.
///
/// A handle owns template-instantiated content outright; for pre-built
/// view items it shares the caller's allocation and never releases it.
/// The `tag` back-reference to the originating item is a lookup-only
/// relation used to re-locate pages across structural edits.
pub struct ContentHandle {
    id: ContentId,
    content: Content,
    tag: PageItem,
}

enum Content {
    /// Template-instantiated content, owned by the engine.
    Owned(Box<dyn ViewContent>),
    /// Pre-built content, owned by the caller.
    Shared(crate::model::SharedView),
}

impl ContentHandle {
    /// Handle over freshly template-instantiated content.
    pub(crate) fn owned(content: Box<dyn ViewContent>, tag: PageItem) -> Self {
        Self {
            id: ContentId::next(),
            content: Content::Owned(content),
            tag,
        }
    }

    /// Handle over a pre-built view supplied by the source.
    pub(crate) fn shared(view: crate::model::SharedView, tag: PageItem) -> Self {
        Self {
            id: ContentId::next(),
            content: Content::Shared(view),
            tag,
        }
    }

    /// This handle's stable identity.
    pub fn id(&self) -> ContentId {
        self.id
    }

    /// The originating item.
    pub fn tag(&self) -> &PageItem {
        &self.tag
    }

    /// Returns `true` if the content is a pre-built view.
    pub fn is_prebuilt(&self) -> bool {
        matches!(self.content, Content::Shared(_))
    }

    /// Runs `f` with mutable access to the renderable content.
    pub fn with_view<R>(&mut self, f: impl FnOnce(&mut dyn ViewContent) -> R) -> R {
        match &mut self.content {
            Content::Owned(content) => f(content.as_mut()),
            Content::Shared(view) => f(view.lock().as_mut()),
        }
    }

    /// Detach the content from its native parent surface.
    pub(crate) fn detach(&mut self) {
        self.with_view(|view| view.detach());
    }

    /// Release owned resources. Pre-built views stay with their owner.
    pub(crate) fn release(&mut self) {
        if let Content::Owned(content) = &mut self.content {
            content.release();
        }
    }
}

impl std::fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHandle")
            .field("id", &self.id)
            .field("prebuilt", &self.is_prebuilt())
            .finish()
    }
}

/// One cache position: always present, possibly without content.
#[derive(Default)]
struct CacheSlot {
    handle: Option<ContentHandle>,
}

/// The dense index-addressed content cache.
///
/// `len()` equals the mirrored collection's length after every operation;
/// a violated index is a desynchronization fault and panics.
#[derive(Default)]
pub(crate) struct ContentCache {
    slots: Vec<CacheSlot>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Insert an empty slot at `index`, shifting later slots up.
    pub fn insert_holder(&mut self, index: usize) {
        if index > self.slots.len() {
            self.desync_panic("insert holder", index);
        }
        self.slots.insert(index, CacheSlot::default());
    }

    /// Store `handle` at `index`, returning any displaced handle.
    pub fn add_or_replace(&mut self, index: usize, handle: ContentHandle) -> Option<ContentHandle> {
        if index >= self.slots.len() {
            self.desync_panic("store", index);
        }
        self.slots[index].handle.replace(handle)
    }

    /// Empty the slot at `index` without removing it, returning the
    /// evicted handle. The next materialization at `index` rebuilds.
    pub fn invalidate(&mut self, index: usize) -> Option<ContentHandle> {
        if index >= self.slots.len() {
            self.desync_panic("invalidate", index);
        }
        self.slots[index].handle.take()
    }

    /// Remove the slot at `index`, returning its handle if it had one.
    pub fn remove(&mut self, index: usize) -> Option<ContentHandle> {
        if index >= self.slots.len() {
            self.desync_panic("remove", index);
        }
        self.slots.remove(index).handle
    }

    /// Relocate the slot at `from` to `to`, preserving its handle.
    pub fn move_slot(&mut self, from: usize, to: usize) {
        if from >= self.slots.len() || to >= self.slots.len() {
            self.desync_panic("move", from.max(to));
        }
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
    }

    /// Replace all slots with `count` empty holders, returning every
    /// evicted handle.
    pub fn reset(&mut self, count: usize) -> Vec<ContentHandle> {
        let evicted = self.drain_handles();
        self.slots = Vec::with_capacity(count);
        self.slots.resize_with(count, CacheSlot::default);
        evicted
    }

    /// Drop all slots, returning every evicted handle.
    pub fn clear(&mut self) -> Vec<ContentHandle> {
        let evicted = self.drain_handles();
        self.slots.clear();
        evicted
    }

    /// The handle at `index`, if the slot exists and is filled.
    pub fn get(&self, index: usize) -> Option<&ContentHandle> {
        self.slots.get(index).and_then(|slot| slot.handle.as_ref())
    }

    /// Mutable access to the handle at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ContentHandle> {
        self.slots
            .get_mut(index)
            .and_then(|slot| slot.handle.as_mut())
    }

    fn drain_handles(&mut self) -> Vec<ContentHandle> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.handle.take())
            .collect()
    }

    #[cold]
    fn desync_panic(&self, op: &str, index: usize) -> ! {
        panic!(
            "content cache {op} at index {index} out of bounds (len {}): \
             cache and mirrored collection have desynchronized",
            self.slots.len()
        );
    }
}
