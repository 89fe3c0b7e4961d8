//! The native paging surface seam.
//!
//! The engine never draws: it issues structural commands to a host-provided
//! [`PagingSurface`] adapter and consumes the callbacks the host feeds back
//! into [`Pager`](super::Pager). An adapter typically wraps one platform
//! paging widget (a view pager, a page view controller, a stacked widget)
//! and translates between its API and these calls.

use std::time::Duration;

use super::cache::ContentHandle;

/// Direction a transition travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward higher indices.
    Forward,
    /// Toward lower indices.
    Reverse,
}

/// Completion continuation for one transition request.
///
/// The host passes the token back through
/// [`Pager::finish_transition`](super::Pager::finish_transition) once the
/// native transition (and any settle delay) completes. Tokens are
/// single-use; a token from a superseded request is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionToken(pub(crate) u64);

/// One decision of the synchronizer: which page the surface must display
/// and how to get there. Constructed per decision, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRequest {
    /// Index the surface must end up displaying.
    pub target: usize,
    /// Travel direction.
    pub direction: Direction,
    /// Whether the surface should animate.
    pub animated: bool,
    /// When set, the host must wait this long after the animation before
    /// reporting completion (lets an outgoing removed page visually clear).
    pub settle_delay: Option<Duration>,
    /// Completion continuation.
    pub token: TransitionToken,
}

/// Adapter over one native paging widget.
///
/// All methods are invoked on the UI thread while the engine holds its
/// internal lock, so implementations must not call back into the engine
/// synchronously; completions are reported later via
/// [`Pager::finish_transition`](super::Pager::finish_transition),
/// [`Pager::page_changed_by_user`](super::Pager::page_changed_by_user) and
/// [`Pager::page_settled`](super::Pager::page_settled).
pub trait PagingSurface: Send {
    /// (Re)create the native widget, positioned at `initial` with `count`
    /// pages backing it. A subsequent non-animated transition supplies the
    /// initial page's content.
    fn build(&mut self, initial: usize, count: usize);

    /// Display the page described by `request`, whose content is `content`.
    ///
    /// For animated requests the host must eventually report completion
    /// with the request's token; non-animated requests are finalized by
    /// the engine immediately and their token never fires.
    fn request_transition(&mut self, request: TransitionRequest, content: &mut ContentHandle);

    /// Forwarded from configuration; enables or disables user swiping.
    fn set_swipe_enabled(&mut self, enabled: bool);

    /// Destroy the native widget and everything mounted on it.
    fn teardown(&mut self);
}

/// A surface that displays nothing.
///
/// Useful for headless hosts and tests that exercise engine logic without
/// a native widget.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSurface;

impl PagingSurface for NoopSurface {
    fn build(&mut self, _initial: usize, _count: usize) {}

    fn request_transition(&mut self, _request: TransitionRequest, _content: &mut ContentHandle) {}

    fn set_swipe_enabled(&mut self, _enabled: bool) {}

    fn teardown(&mut self) {}
}
