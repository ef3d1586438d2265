//! Data-fetch error types

/// Errors from data strategies and injected loaders.
///
/// These are recoverable: the viewport leaves skeleton rows in place and a
/// later scroll re-triggers the fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// The injected page loader failed.
    #[error("page {page} fetch failed: {message}")]
    PageFetch {
        /// Page index that failed.
        page: usize,
        /// Loader-supplied message.
        message: String,
    },

    /// The injected summary loader failed.
    #[error("summary fetch failed: {0}")]
    SummaryFetch(String),

    /// A paged operation was attempted without a configured loader.
    #[error("fetch_page is not configured")]
    NoFetcher,
}

impl DataError {
    /// Creates a page-fetch error.
    pub fn page_fetch(page: usize, message: impl Into<String>) -> Self {
        Self::PageFetch {
            page,
            message: message.into(),
        }
    }

    /// Creates a summary-fetch error.
    pub fn summary_fetch(message: impl Into<String>) -> Self {
        Self::SummaryFetch(message.into())
    }

    /// Returns `true` if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PageFetch { .. } | Self::SummaryFetch(_))
    }
}
