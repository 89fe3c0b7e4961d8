//! Engine configuration consumed at synchronization decision points.

use std::time::Duration;

/// Paging axis of the native surface.
///
/// Changing orientation at runtime forces a full surface rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagerOrientation {
    /// Pages swipe left/right.
    #[default]
    Horizontal,
    /// Pages swipe up/down.
    Vertical,
}

/// Settle delay applied before finalizing an animated removal, giving the
/// outgoing page time to visually clear.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Configuration flags for the paging engine.
///
/// # Example
///
/// ```
/// use pagedeck::pager::{PagerConfig, PagerOrientation};
/// use std::time::Duration;
///
/// let config = PagerConfig::new()
///     .with_animate_transitions(false)
///     .with_orientation(PagerOrientation::Vertical)
///     .with_settle_delay(Duration::from_millis(50));
/// assert!(!config.animate_transitions);
/// ```
#[derive(Debug, Clone)]
pub struct PagerConfig {
    /// Whether position changes and removals animate. Also gates the
    /// settle delay on removals.
    pub animate_transitions: bool,

    /// Whether the user may swipe between pages. Forwarded opaquely to
    /// the native surface.
    pub swipe_enabled: bool,

    /// Paging axis.
    pub orientation: PagerOrientation,

    /// Pause the host applies between an animated removal's transition and
    /// its finalization.
    pub settle_delay: Duration,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            animate_transitions: true,
            swipe_enabled: true,
            orientation: PagerOrientation::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl PagerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether transitions animate, builder style.
    pub fn with_animate_transitions(mut self, animate: bool) -> Self {
        self.animate_transitions = animate;
        self
    }

    /// Set whether swiping is enabled, builder style.
    pub fn with_swipe_enabled(mut self, enabled: bool) -> Self {
        self.swipe_enabled = enabled;
        self
    }

    /// Set the paging axis, builder style.
    pub fn with_orientation(mut self, orientation: PagerOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the removal settle delay, builder style.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PagerConfig::new();
        assert!(config.animate_transitions);
        assert!(config.swipe_enabled);
        assert_eq!(config.orientation, PagerOrientation::Horizontal);
        assert_eq!(config.settle_delay, DEFAULT_SETTLE_DELAY);
    }

    #[test]
    fn test_builder() {
        let config = PagerConfig::new()
            .with_animate_transitions(false)
            .with_swipe_enabled(false)
            .with_orientation(PagerOrientation::Vertical)
            .with_settle_delay(Duration::from_millis(10));

        assert!(!config.animate_transitions);
        assert!(!config.swipe_enabled);
        assert_eq!(config.orientation, PagerOrientation::Vertical);
        assert_eq!(config.settle_delay, Duration::from_millis(10));
    }
}
