//! Pagedeck: a virtualized swipeable paging engine.
//!
//! Pagedeck keeps a small window of materialized native views synchronized
//! with a live, externally-mutated ordered collection and with a single
//! "current page" cursor. It is the logic layer under a swipeable paging
//! control: it decides which index needs a view, when a view may be
//! discarded, and what the native paging widget must do next — never how
//! to draw a pixel.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐ edits  ┌───────────────────────────────┐ commands ┌───────────────┐
//! │ PageModel  │───────>│ Pager                         │─────────>│ PagingSurface │
//! │ (source)   │        │  mirror · cache · cursor      │<─────────│ (native)      │
//! └────────────┘        │  materializer · disposal      │ reports  └───────────────┘
//!                       └───────────────────────────────┘
//!                                   │ position_selected
//!                                   v
//!                            hosting control
//! ```
//!
//! - [`model`]: the source seam — [`model::PageModel`], its five edit
//!   notifications, and [`model::PageList`], the canonical implementation
//! - [`template`]: the rendering seam — [`template::ContentTemplate`] /
//!   [`template::TemplateSelector`] produce [`template::ViewContent`]
//! - [`pager`]: the engine — [`pager::Pager`] and the
//!   [`pager::PagingSurface`] adapter trait
//!
//! # Example
//!
//! ```
//! use pagedeck::prelude::*;
//! use std::sync::Arc;
//!
//! struct Label;
//! impl ViewContent for Label {}
//!
//! let source = Arc::new(PageList::from_values(vec!["one", "two", "three"]));
//! let pager = Pager::new(
//!     source.clone(),
//!     TemplateConfig::template(|| Box::new(Label) as Box<dyn ViewContent>),
//!     PagerConfig::new().with_animate_transitions(false),
//!     NoopSurface,
//! );
//! pager.build()?;
//!
//! pager.signals().position_selected.connect(|&index| {
//!     println!("now on page {index}");
//! });
//! pager.set_position(2)?;
//! assert_eq!(pager.position(), 2);
//! # Ok::<(), pagedeck::Error>(())
//! ```

pub mod error;
pub mod model;
pub mod pager;
pub mod prelude;
pub mod template;

pub use error::{Error, Result};
pub use model::{CollectionSignals, PageItem, PageList, PageModel, SharedValue, SharedView};
pub use pager::{
    ContentHandle, ContentId, Direction, NoopSurface, Pager, PagerConfig, PagerOrientation,
    PagerSignals, PagingSurface, SyncState, TransitionRequest, TransitionToken,
};
pub use template::{ContentTemplate, TemplateConfig, TemplateSelector, ViewContent};
