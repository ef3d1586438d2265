//! Configuration error types

/// Fatal configuration errors, surfaced on construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No columns were configured.
    #[error("at least one column is required")]
    EmptyColumns,

    /// Two columns share the same key.
    #[error("duplicate column key: {0:?}")]
    DuplicateColumnKey(String),

    /// A column key is empty.
    #[error("column keys must be non-empty")]
    EmptyColumnKey,

    /// Neither `initial_data` nor `fetch_page` was provided.
    #[error("a data source is required: provide initial_data or fetch_page")]
    MissingDataSource,

    /// The dataset exceeds the client-side limit but no page loader exists.
    #[error("initial_data has {rows} rows, above the client-side limit; fetch_page is required")]
    DatasetTooLargeForClient {
        /// Size of the supplied dataset.
        rows: usize,
    },

    /// A fixed pixel size is out of range.
    #[error("invalid {name}: must be at least 1")]
    InvalidSize {
        /// Which option was invalid.
        name: &'static str,
    },

    /// Bad side-panel configuration.
    #[error("invalid side panel: {0}")]
    InvalidSidePanel(String),

    /// Bad pivot configuration.
    #[error("invalid pivot config: {0}")]
    InvalidPivot(String),
}
