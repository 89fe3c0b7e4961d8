//! Convenient glob import for common Pagedeck types.
//!
//! ```
//! use pagedeck::prelude::*;
//! ```

pub use crate::error::{Error, Result};
pub use crate::model::{CollectionSignals, PageItem, PageList, PageModel};
pub use crate::pager::{
    ContentId, Direction, NoopSurface, Pager, PagerConfig, PagerOrientation, PagingSurface,
    SyncState, TransitionRequest, TransitionToken,
};
pub use crate::template::{ContentTemplate, TemplateConfig, TemplateSelector, ViewContent};

pub use pagedeck_core::{ConnectionGuard, ConnectionId, Signal};
