//! Content templating for the paging engine.
//!
//! The engine never draws anything itself; it asks a template collaborator
//! to produce renderable content for a data item and binds the item as that
//! content's data context. This module defines the seams:
//!
//! - [`ViewContent`]: the renderable representation of one page, owned by
//!   the engine's cache while materialized
//! - [`ContentTemplate`]: a factory producing fresh `ViewContent`
//! - [`TemplateSelector`]: per-item template dispatch for heterogeneous
//!   collections
//! - [`TemplateConfig`]: how the hosting control configured templating
//!
//! # Example
//!
//! ```
//! use pagedeck::template::{ContentTemplate, TemplateConfig, ViewContent};
//! use std::sync::Arc;
//!
//! struct LabelContent {
//!     text: String,
//! }
//!
//! impl ViewContent for LabelContent {}
//!
//! // Closures act as templates directly.
//! let config = TemplateConfig::template(|| {
//!     Box::new(LabelContent { text: String::new() }) as Box<dyn ViewContent>
//! });
//! assert!(config.is_configured());
//! ```

use std::sync::Arc;

use crate::model::SharedValue;

/// Renderable content for one page.
///
/// Implementations own whatever host-platform resources one page needs.
/// The engine drives the lifecycle: [`bind`](ViewContent::bind) once after
/// instantiation, [`detach`](ViewContent::detach) and then
/// [`release`](ViewContent::release) exactly once on eviction.
///
/// All methods default to no-ops so purely declarative content only
/// implements what it needs.
pub trait ViewContent: Send {
    /// Bind the data value this content renders as its data context.
    ///
    /// Called once, immediately after the template instantiated the
    /// content. Pre-built views are never rebound.
    fn bind(&mut self, _value: &SharedValue) {}

    /// Detach the content from its native parent surface.
    fn detach(&mut self) {}

    /// Release the resources this content owns.
    ///
    /// Called after [`detach`](ViewContent::detach), exactly once, and only
    /// for template-instantiated content; pre-built views stay owned by
    /// whoever supplied them.
    fn release(&mut self) {}
}

/// Factory producing fresh renderable content for a page.
///
/// Any `Fn() -> Box<dyn ViewContent>` closure is a template.
pub trait ContentTemplate: Send + Sync {
    /// Instantiate new, unbound content.
    fn create_content(&self) -> Box<dyn ViewContent>;
}

impl<F> ContentTemplate for F
where
    F: Fn() -> Box<dyn ViewContent> + Send + Sync,
{
    fn create_content(&self) -> Box<dyn ViewContent> {
        self()
    }
}

/// Chooses a template per item, for collections whose items render
/// differently.
pub trait TemplateSelector: Send + Sync {
    /// Select the template for the given value.
    fn select(&self, value: &SharedValue) -> Arc<dyn ContentTemplate>;
}

impl<F> TemplateSelector for F
where
    F: Fn(&SharedValue) -> Arc<dyn ContentTemplate> + Send + Sync,
{
    fn select(&self, value: &SharedValue) -> Arc<dyn ContentTemplate> {
        self(value)
    }
}

/// The hosting control's template configuration.
///
/// Plain-value items require `Template` or `Selector`; materializing a
/// plain value under `None` is a fatal error for that page. Pre-built view
/// items render under any configuration.
#[derive(Clone, Default)]
pub enum TemplateConfig {
    /// No template configured.
    #[default]
    None,
    /// One template for every item.
    Template(Arc<dyn ContentTemplate>),
    /// Per-item template dispatch.
    Selector(Arc<dyn TemplateSelector>),
}

impl TemplateConfig {
    /// Configuration using one template for every item.
    pub fn template<T: ContentTemplate + 'static>(template: T) -> Self {
        Self::Template(Arc::new(template))
    }

    /// Configuration using per-item template selection.
    pub fn selector<S: TemplateSelector + 'static>(selector: S) -> Self {
        Self::Selector(Arc::new(selector))
    }

    /// Returns `true` if plain values can be materialized.
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Debug for TemplateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("TemplateConfig::None"),
            Self::Template(_) => f.write_str("TemplateConfig::Template(..)"),
            Self::Selector(_) => f.write_str("TemplateConfig::Selector(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl ViewContent for Plain {}

    #[test]
    fn test_closure_template() {
        let template = || Box::new(Plain) as Box<dyn ViewContent>;
        let _content = template.create_content();
    }

    #[test]
    fn test_config_states() {
        assert!(!TemplateConfig::None.is_configured());
        assert!(
            TemplateConfig::template(|| Box::new(Plain) as Box<dyn ViewContent>).is_configured()
        );
    }

    #[test]
    fn test_selector_dispatch() {
        let selector = |_value: &SharedValue| {
            Arc::new(|| Box::new(Plain) as Box<dyn ViewContent>) as Arc<dyn ContentTemplate>
        };
        let value: SharedValue = Arc::new(7u32);
        let template = selector.select(&value);
        let _content = template.create_content();
    }
}
