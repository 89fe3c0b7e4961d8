//! Produce-or-reuse of renderable content for a page index.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{PageItem, SharedValue, SharedView};
use crate::template::{ContentTemplate, TemplateConfig};

use super::cache::{ContentCache, ContentHandle, ContentId};
use super::disposal::DisposalCoordinator;
use super::mirror::MirroredCollection;

/// How one item turns into renderable content.
///
/// Resolved per materialization and matched exhaustively; there is no
/// runtime type inspection beyond the item's own variant.
enum RenderStrategy {
    /// The item is itself pre-built content; wrap it directly.
    Prebuilt(SharedView),
    /// Instantiate the control-wide template and bind the value.
    Templated {
        template: Arc<dyn ContentTemplate>,
        value: SharedValue,
    },
    /// Ask the configured selector for a template, then bind the value.
    Selected {
        template: Arc<dyn ContentTemplate>,
        value: SharedValue,
    },
}

/// Materializes page content on demand.
///
/// Cache hits return the existing handle untouched: no rebuild, no
/// rebind. Misses first try to reclaim a still-live deferred handle for
/// the same item (one item must never be represented by two live handles),
/// and only then instantiate fresh content.
pub(crate) struct Materializer {
    template: TemplateConfig,
}

impl Materializer {
    pub fn new(template: TemplateConfig) -> Self {
        Self { template }
    }

    pub fn set_template(&mut self, template: TemplateConfig) {
        self.template = template;
    }

    /// Produce-or-reuse content for `index`, storing it in the cache.
    ///
    /// `defer` tells the cache eviction path whether a displaced handle
    /// may still be on screen (a transition is in flight).
    pub fn materialize(
        &self,
        index: usize,
        mirror: &MirroredCollection,
        cache: &mut ContentCache,
        disposal: &mut DisposalCoordinator,
        defer: bool,
    ) -> Result<ContentId> {
        if let Some(handle) = cache.get(index) {
            return Ok(handle.id());
        }

        let item = mirror
            .get(index)
            .ok_or_else(|| Error::out_of_range(index, mirror.len()))?
            .clone();

        let handle = match disposal.reclaim(&item) {
            Some(handle) => handle,
            None => self.instantiate(index, &item)?,
        };
        let id = handle.id();

        tracing::trace!(
            target: "pagedeck::materializer",
            index,
            id = ?id,
            "materialized page content"
        );

        if let Some(displaced) = cache.add_or_replace(index, handle) {
            disposal.retire(displaced, defer);
        }
        Ok(id)
    }

    fn instantiate(&self, index: usize, item: &PageItem) -> Result<ContentHandle> {
        let strategy = match item {
            PageItem::View(view) => RenderStrategy::Prebuilt(view.clone()),
            PageItem::Value(value) => match &self.template {
                TemplateConfig::Template(template) => RenderStrategy::Templated {
                    template: template.clone(),
                    value: value.clone(),
                },
                TemplateConfig::Selector(selector) => RenderStrategy::Selected {
                    template: selector.select(value),
                    value: value.clone(),
                },
                TemplateConfig::None => return Err(Error::missing_template(index)),
            },
        };

        let handle = match strategy {
            RenderStrategy::Prebuilt(view) => ContentHandle::shared(view, item.clone()),
            RenderStrategy::Templated { template, value }
            | RenderStrategy::Selected { template, value } => {
                let mut content = template.create_content();
                content.bind(&value);
                ContentHandle::owned(content, item.clone())
            }
        };
        Ok(handle)
    }
}
