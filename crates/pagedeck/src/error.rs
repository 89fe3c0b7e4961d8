//! Error types for the paging engine.

/// Result type alias for paging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the paging engine.
///
/// Desynchronization between the mirrored collection and the content cache
/// is deliberately *not* represented here: it indicates a broken pairing
/// invariant inside the engine and panics instead of returning an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A plain data item needs rendering but no template is configured.
    #[error("no content template configured for plain value at index {index}")]
    MissingTemplate { index: usize },

    /// A requested position lies outside the collection.
    #[error("position {index} out of range for collection of {len} page(s)")]
    PositionOutOfRange { index: usize, len: usize },

    /// An operation requires a built surface before `build()` was called.
    #[error("the paging surface has not been built yet")]
    NotBuilt,
}

impl Error {
    /// Create a missing-template error.
    pub fn missing_template(index: usize) -> Self {
        Self::MissingTemplate { index }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::PositionOutOfRange { index, len }
    }
}
