//! The state machine reconciling collection edits with the native surface.
//!
//! Every collection edit is applied here in three strict steps: mirror and
//! cache are updated as one unit, the minimal native-surface operation is
//! decided, and the cursor/notification state is settled — immediately for
//! non-animated operations, at the transition's completion otherwise.
//! Indices are always derived from the mirror state at the moment an edit
//! is applied, never from values captured before a pending completion, so
//! edits arriving mid-transition cannot corrupt the cache.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{PageItem, PageModel};
use crate::template::TemplateConfig;

use super::cache::{ContentCache, ContentId};
use super::config::{PagerConfig, PagerOrientation};
use super::cursor::PositionCursor;
use super::disposal::DisposalCoordinator;
use super::materializer::Materializer;
use super::mirror::MirroredCollection;
use super::surface::{Direction, PagingSurface, TransitionRequest, TransitionToken};

/// Lifecycle state of the synchronized surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No native surface has been built.
    Empty,
    /// Surface built, current index valid.
    Ready,
    /// An animated transition awaits its completion callback.
    Transitioning,
}

/// Deferred settlement of an animated transition.
struct PendingFinalize {
    token: TransitionToken,
    target: usize,
    /// Handle expected at `target` when the completion fires; anything
    /// else means the request was superseded by a structural edit.
    expected: ContentId,
}

/// Position notifications to emit once the engine lock is released.
pub(crate) type Notifications = Vec<usize>;

/// The engine core: owns the mirror, cache, cursor, and surface for one
/// rendered control instance.
pub(crate) struct PageSynchronizer<S: PagingSurface> {
    model: Arc<dyn PageModel>,
    mirror: MirroredCollection,
    cache: ContentCache,
    cursor: PositionCursor,
    materializer: Materializer,
    disposal: DisposalCoordinator,
    surface: S,
    config: PagerConfig,
    state: SyncState,
    /// Last requested position; transition direction is computed against
    /// it, so it advances at request time, not at settlement.
    prev_position: usize,
    next_token: u64,
    pending: Option<PendingFinalize>,
    /// Gesture position reported but not yet announced (awaiting settle).
    announce: Option<usize>,
}

impl<S: PagingSurface> PageSynchronizer<S> {
    pub fn new(
        model: Arc<dyn PageModel>,
        template: TemplateConfig,
        config: PagerConfig,
        surface: S,
    ) -> Self {
        Self {
            model,
            mirror: MirroredCollection::new(),
            cache: ContentCache::new(),
            cursor: PositionCursor::new(),
            materializer: Materializer::new(template),
            disposal: DisposalCoordinator::new(),
            surface,
            config,
            state: SyncState::Empty,
            prev_position: 0,
            next_token: 1,
            pending: None,
            announce: None,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.cursor.get()
    }

    pub fn len(&self) -> usize {
        self.mirror.len()
    }

    pub fn is_internal_update(&self) -> bool {
        self.cursor.is_internal_update()
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn model(&self) -> Arc<dyn PageModel> {
        self.model.clone()
    }

    pub fn content_id(&self, index: usize) -> Option<ContentId> {
        self.cache.get(index).map(|handle| handle.id())
    }

    pub fn with_content<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut dyn crate::template::ViewContent) -> R,
    ) -> Option<R> {
        self.cache.get_mut(index).map(|handle| handle.with_view(f))
    }

    // -------------------------------------------------------------------------
    // Build / reset / teardown
    // -------------------------------------------------------------------------

    /// Full (re)build: reload the mirror from the source, clamp the
    /// cursor, and recreate the native surface positioned there.
    ///
    /// Serves first build, `Reset` edits, and orientation/template/model
    /// changes alike.
    pub fn rebuild(&mut self) -> Result<Notifications> {
        let count = self.model.count();
        let items: Vec<PageItem> = (0..count).filter_map(|i| self.model.item(i)).collect();

        let evicted = self.cache.reset(items.len());
        self.disposal.retire_all(evicted, false);
        self.disposal.flush();
        self.pending = None;
        self.announce = None;
        self.mirror.reset(items);
        self.assert_parity();
        self.cursor.clamp(self.mirror.len());

        if self.state != SyncState::Empty {
            self.surface.teardown();
        }
        self.surface.build(self.cursor.get(), self.mirror.len());
        self.surface.set_swipe_enabled(self.config.swipe_enabled);
        self.state = SyncState::Ready;

        if !self.mirror.is_empty() {
            let target = self.cursor.get();
            self.materialize(target)?;
            self.issue_transition(target, Direction::Forward, false, false);
        }
        self.prev_position = self.cursor.get();
        tracing::debug!(
            target: "pagedeck::sync",
            pages = self.mirror.len(),
            position = self.cursor.get(),
            "surface rebuilt"
        );
        Ok(vec![self.cursor.get()])
    }

    /// Dispose everything and drop the native surface.
    pub fn teardown(&mut self) {
        if self.state == SyncState::Empty {
            return;
        }
        let evicted = self.cache.clear();
        self.disposal.retire_all(evicted, false);
        self.disposal.flush();
        self.pending = None;
        self.announce = None;
        self.mirror.reset(Vec::new());
        self.surface.teardown();
        self.state = SyncState::Empty;
        tracing::debug!(target: "pagedeck::sync", "engine torn down");
    }

    // -------------------------------------------------------------------------
    // Collection edits
    // -------------------------------------------------------------------------

    pub fn insert(&mut self, index: usize, item: PageItem) -> Result<Notifications> {
        if self.state == SyncState::Empty {
            // No native surface yet; fold the edit in and build fresh.
            self.mirror.insert(index, item);
            self.cache.insert_holder(index);
            return self.rebuild();
        }

        self.mirror.insert(index, item);
        self.cache.insert_holder(index);
        self.assert_parity();

        // The displayed item keeps its view; an insert before or at it
        // pushes it one index forward.
        let cursor = self.cursor.get();
        let displayed = if index <= cursor && self.mirror.len() > 1 {
            cursor + 1
        } else {
            cursor
        };

        self.materialize(displayed)?;
        self.issue_transition(displayed, Direction::Forward, false, false);
        Ok(self.finalize_position(displayed, false))
    }

    pub fn remove(&mut self, index: usize) -> Result<Notifications> {
        if self.mirror.is_empty() {
            tracing::warn!(target: "pagedeck::sync", index, "remove on empty collection ignored");
            return Ok(Vec::new());
        }

        // Removing the last remaining page: the surface must be rebuilt
        // for the page to clear.
        if self.state == SyncState::Empty || self.mirror.len() == 1 {
            let removed = self.mirror.remove_at(index);
            self.disposal.discard_matching(&removed);
            if let Some(evicted) = self.cache.remove(index) {
                self.disposal.retire(evicted, false);
            }
            return self.rebuild();
        }

        let removed = self.mirror.remove_at(index);
        // A parked handle for the removed item must never be reclaimed.
        self.disposal.discard_matching(&removed);
        let evicted = self.cache.remove(index);
        self.assert_parity();

        let cursor = self.cursor.get();
        if index == cursor {
            // There is no page before index 0; leaving forward is the only
            // way out of a head removal.
            let target = index.saturating_sub(1);
            let direction = if index == 0 {
                Direction::Forward
            } else {
                Direction::Reverse
            };
            let animated = self.config.animate_transitions;
            if let Some(evicted) = evicted {
                // The outgoing page stays alive until the transition clears.
                self.disposal.retire(evicted, animated);
            }
            let expected = self.materialize(target)?;
            let token = self.issue_transition(target, direction, animated, true);
            if animated {
                self.pending = Some(PendingFinalize {
                    token,
                    target,
                    expected,
                });
                self.state = SyncState::Transitioning;
                Ok(Vec::new())
            } else {
                Ok(self.finalize_position(target, false))
            }
        } else {
            if let Some(evicted) = evicted {
                self.disposal.retire(evicted, self.pending.is_some());
            }
            // Keep the cursor naming the item it displayed.
            let target = if index < cursor { cursor - 1 } else { cursor };
            self.cursor.set(target);
            self.prev_position = target;
            Ok(vec![target])
        }
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<Notifications> {
        if from == to {
            return Ok(Vec::new());
        }
        let cursor = self.cursor.get();
        let displayed_before = self.mirror.get(cursor).cloned();

        self.mirror.move_item(from, to);
        self.cache.move_slot(from, to);
        self.assert_parity();

        if self.state == SyncState::Empty {
            return Ok(Vec::new());
        }

        if from == cursor {
            // The displayed element itself moved; the cursor follows it.
            self.cursor.set(to);
            self.prev_position = to;
            self.materialize(to)?; // cache hit: the handle moved with its slot
            self.issue_transition(to, Direction::Forward, false, false);
            return Ok(vec![to]);
        }

        let content_changed = match (displayed_before.as_ref(), self.mirror.get(cursor)) {
            (Some(before), Some(after)) => !before.same(after),
            _ => false,
        };
        if content_changed {
            // A different item sits under the fixed cursor; refresh the page.
            self.materialize(cursor)?;
            self.issue_transition(cursor, Direction::Forward, false, false);
            self.prev_position = cursor;
            return Ok(vec![cursor]);
        }
        Ok(Vec::new())
    }

    pub fn replace(&mut self, index: usize, item: PageItem) -> Result<Notifications> {
        let old = self.mirror.replace(index, item);
        self.disposal.discard_matching(&old);
        if let Some(evicted) = self.cache.invalidate(index) {
            self.disposal.retire(evicted, self.pending.is_some());
        }
        self.assert_parity();

        if self.state == SyncState::Empty {
            return Ok(Vec::new());
        }

        let cursor = self.cursor.get();
        if index == cursor {
            // Content changed under a fixed index; the cursor value stays.
            self.materialize(index)?;
            self.issue_transition(index, Direction::Forward, false, false);
            return Ok(vec![cursor]);
        }
        Ok(Vec::new())
    }

    // -------------------------------------------------------------------------
    // Position changes
    // -------------------------------------------------------------------------

    /// Caller-originated position change.
    pub fn set_position(&mut self, index: usize) -> Result<Notifications> {
        if self.cursor.is_internal_update() {
            // A surface-originated write is in progress; the loop ends here.
            tracing::trace!(target: "pagedeck::sync", index, "re-entrant position set suppressed");
            return Ok(Vec::new());
        }
        if self.state == SyncState::Empty {
            return Err(Error::NotBuilt);
        }
        if index >= self.mirror.len() {
            return Err(Error::out_of_range(index, self.mirror.len()));
        }
        if index == self.cursor.get() && self.pending.is_none() {
            return Ok(Vec::new());
        }

        let direction = if index >= self.prev_position {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        self.prev_position = index;
        let animated = self.config.animate_transitions;
        let expected = self.materialize(index)?;
        let token = self.issue_transition(index, direction, animated, false);
        if animated {
            self.pending = Some(PendingFinalize {
                token,
                target: index,
                expected,
            });
            self.state = SyncState::Transitioning;
            Ok(Vec::new())
        } else {
            Ok(self.finalize_position(index, false))
        }
    }

    /// Surface report: a user gesture landed on `index`.
    pub fn page_changed_by_user(&mut self, index: usize) -> Notifications {
        if index >= self.mirror.len() {
            tracing::warn!(
                target: "pagedeck::sync",
                index,
                len = self.mirror.len(),
                "stale page-change report ignored"
            );
            return Vec::new();
        }
        // A user swipe supersedes any engine-driven transition in flight.
        self.pending = None;
        self.cursor.write_internal(index);
        self.prev_position = index;
        self.announce = Some(index);
        if self.state == SyncState::Transitioning {
            self.state = SyncState::Ready;
        }
        Vec::new()
    }

    /// Surface report: scrolling stopped; announce the last gesture.
    pub fn page_settled(&mut self) -> Notifications {
        let Some(index) = self.announce.take() else {
            return Vec::new();
        };
        self.disposal.flush();
        vec![index]
    }

    /// Completion continuation of a transition request.
    pub fn finish_transition(&mut self, token: TransitionToken) -> Notifications {
        let Some(pending) = self.pending.as_ref() else {
            tracing::debug!(
                target: "pagedeck::sync",
                ?token,
                "completion with no pending transition ignored"
            );
            return Vec::new();
        };
        if pending.token != token {
            tracing::debug!(target: "pagedeck::sync", ?token, "superseded completion ignored");
            return Vec::new();
        }
        let (target, expected) = (pending.target, pending.expected);

        // Re-validate before acting: a structural edit may have changed
        // what sits at the target since the request was issued.
        let still_valid = self
            .cache
            .get(target)
            .is_some_and(|handle| handle.id() == expected);
        if !still_valid {
            tracing::debug!(
                target: "pagedeck::sync",
                target,
                "transition target changed since request; completion dropped"
            );
            self.pending = None;
            self.state = SyncState::Ready;
            self.disposal.flush();
            return Vec::new();
        }
        self.finalize_position(target, true)
    }

    // -------------------------------------------------------------------------
    // Reconfiguration
    // -------------------------------------------------------------------------

    pub fn set_orientation(&mut self, orientation: PagerOrientation) -> Result<Notifications> {
        if self.config.orientation == orientation {
            return Ok(Vec::new());
        }
        self.config.orientation = orientation;
        if self.state == SyncState::Empty {
            return Ok(Vec::new());
        }
        self.rebuild()
    }

    pub fn set_swipe_enabled(&mut self, enabled: bool) {
        self.config.swipe_enabled = enabled;
        if self.state != SyncState::Empty {
            self.surface.set_swipe_enabled(enabled);
        }
    }

    pub fn set_animate_transitions(&mut self, animate: bool) {
        self.config.animate_transitions = animate;
    }

    pub fn set_settle_delay(&mut self, delay: std::time::Duration) {
        self.config.settle_delay = delay;
    }

    pub fn set_template(&mut self, template: TemplateConfig) -> Result<Notifications> {
        self.materializer.set_template(template);
        if self.state == SyncState::Empty {
            return Ok(Vec::new());
        }
        self.rebuild()
    }

    pub fn replace_model(&mut self, model: Arc<dyn PageModel>) {
        self.model = model;
    }

    /// Materialize content for `index` without changing position. The
    /// surface adapter's hook for preparing neighbor pages.
    pub fn prepare(&mut self, index: usize) -> Result<ContentId> {
        self.materialize(index)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn materialize(&mut self, index: usize) -> Result<ContentId> {
        let defer = self.pending.is_some();
        self.materializer.materialize(
            index,
            &self.mirror,
            &mut self.cache,
            &mut self.disposal,
            defer,
        )
    }

    fn next_token(&mut self) -> TransitionToken {
        let token = TransitionToken(self.next_token);
        self.next_token += 1;
        token
    }

    fn issue_transition(
        &mut self,
        target: usize,
        direction: Direction,
        animated: bool,
        with_settle: bool,
    ) -> TransitionToken {
        let token = self.next_token();
        let request = TransitionRequest {
            target,
            direction,
            animated,
            settle_delay: (animated && with_settle).then_some(self.config.settle_delay),
            token,
        };
        tracing::debug!(
            target: "pagedeck::sync",
            target = request.target,
            ?direction,
            animated,
            "requesting transition"
        );
        let Self { cache, surface, .. } = self;
        let handle = cache
            .get_mut(target)
            .unwrap_or_else(|| panic!("no materialized content at transition target {target}"));
        surface.request_transition(request, handle);
        token
    }

    /// Settle a position: write the cursor, flush deferred disposals, and
    /// report the single notification for the logical change.
    fn finalize_position(&mut self, target: usize, internal: bool) -> Notifications {
        if internal {
            self.cursor.write_internal(target);
        } else {
            self.cursor.set(target);
        }
        self.prev_position = target;
        self.pending = None;
        self.disposal.flush();
        if self.state != SyncState::Empty {
            self.state = SyncState::Ready;
        }
        vec![target]
    }

    fn assert_parity(&self) {
        assert_eq!(
            self.cache.len(),
            self.mirror.len(),
            "cache and mirrored collection diverged in length"
        );
    }
}
