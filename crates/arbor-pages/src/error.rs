//! Page manager error types.

use arbor_store::{PageId, StoreError};

use crate::templates::ConfigurationError;

/// Error returned by page tree and manager operations.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Repository failure, passed through unchanged.
    #[error("{0}")]
    Store(#[from] StoreError),
    /// Template configuration problem.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
    /// The parent/children links loop back to a page already visited.
    #[error("Page tree contains a cycle at page {0}")]
    Cycle(PageId),
    /// A page id is not present in the loaded tree.
    #[error("Page {0} not found in page tree")]
    PageNotFound(PageId),
}
