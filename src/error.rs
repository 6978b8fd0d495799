//! Error types for unlayout.

use thiserror::Error;

/// Result type alias for unlayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout reconstruction.
///
/// Only malformed input is a hard failure. Ambiguous layouts are reported
/// as [`LayoutWarning`](crate::model::LayoutWarning)s on the result instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Page dimensions are non-positive or a block lies outside the page.
    #[error("Invalid geometry on page {page}: {reason}")]
    InvalidPageGeometry {
        /// Index of the offending page
        page: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Reconstruction options are out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Page index is out of range.
    #[error("Page {0} is out of range (source has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// The block source failed to deliver a page.
    #[error("Block source error: {0}")]
    Source(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::InvalidPageGeometry`].
    pub fn geometry(page: usize, reason: impl Into<String>) -> Self {
        Error::InvalidPageGeometry {
            page,
            reason: reason.into(),
        }
    }

    /// Whether this error only affects a single page of a batch.
    pub fn is_page_scoped(&self) -> bool {
        matches!(
            self,
            Error::InvalidPageGeometry { .. } | Error::PageOutOfRange(..) | Error::Source(_)
        )
    }
}
