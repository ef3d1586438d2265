//! Grid configuration.

use std::fmt;
use std::sync::Arc;

use crate::data::PageFetcher;
use crate::data::SummaryFetcher;
use crate::error::ConfigError;
use crate::model::Column;
use crate::model::Row;
use crate::state::GridMode;

/// Table width sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableWidth {
    /// Fill the container (`'100%'`).
    #[default]
    Full,
    /// Fixed pixel width.
    Pixels(u32),
}

/// Details of a loaded page, passed to `on_page_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// The page index.
    pub page: usize,
    /// Rows in the page.
    pub rows: usize,
    /// Filtered total after this load.
    pub total_rows: usize,
}

/// Callback fired when the paged strategy loads a page.
pub type PageChangeCallback = Arc<dyn Fn(PageInfo) + Send + Sync>;

/// Callback fired once when the bootstrap policy decides the mode.
pub type ModeChangeCallback = Arc<dyn Fn(GridMode) + Send + Sync>;

/// One panel in the optional side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidePanelPanel {
    /// Panel identifier.
    pub id: String,
    /// Display title.
    pub title: String,
}

/// Optional side-panel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SidePanelConfig {
    /// Whether the side panel is available at all.
    pub enabled: bool,
    /// The panels, shown in order.
    pub panels: Vec<SidePanelPanel>,
}

impl SidePanelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.panels.is_empty() {
            return Err(ConfigError::InvalidSidePanel(
                "enabled but no panels configured".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for panel in &self.panels {
            if panel.id.is_empty() {
                return Err(ConfigError::InvalidSidePanel("empty panel id".into()));
            }
            if !seen.insert(panel.id.as_str()) {
                return Err(ConfigError::InvalidSidePanel(format!(
                    "duplicate panel id {:?}",
                    panel.id
                )));
            }
        }
        Ok(())
    }
}

/// Constructor configuration for a [`DataGrid`](crate::DataGrid).
///
/// Built with chained setters; validated on grid construction. A data
/// source is mandatory: either `initial_data` (which triggers the
/// in-memory bootstrap when small enough) or `fetch_page`.
///
/// # Example
///
/// ```
/// use gridkit::{Column, GridConfig, Row};
///
/// let config = GridConfig::new(vec![
///     Column::new("name", "Name"),
///     Column::new("age", "Age"),
/// ])
/// .initial_data(vec![Row::new().set("name", "Ada").set("age", 36i64)])
/// .row_height(32)
/// .table_id("people");
/// ```
#[derive(Clone)]
pub struct GridConfig {
    /// Mount identifier for the host.
    pub container: String,
    /// Measured container width in pixels; the width solver's input when
    /// `table_width` is [`TableWidth::Full`].
    pub container_width: u32,
    /// Table width sizing.
    pub table_width: TableWidth,
    /// Table height in pixels (the scroll viewport is this minus the
    /// header and, when enabled, summary heights).
    pub table_height: u32,
    /// Header row height in pixels.
    pub header_height: u32,
    /// Summary row height in pixels.
    pub summary_height: u32,
    /// Data row height in pixels; every row is exactly this tall.
    pub row_height: u32,
    /// Column descriptors. Required, keys must be unique.
    pub columns: Vec<Column>,
    /// Initial count of frozen (left-pinned) columns.
    pub frozen_columns: usize,
    /// Whether the summary row renders.
    pub show_summary: bool,
    /// Server-mode page size.
    pub page_size: usize,
    /// Extra rows rendered above and below the visible window.
    pub buffer_rows: usize,
    /// Server-mode page-cache bound.
    pub max_cached_pages: usize,
    /// Full dataset; triggers the in-memory bootstrap when within the
    /// client-side limit.
    pub initial_data: Option<Vec<Row>>,
    /// Remote page loader; required when `initial_data` is absent.
    pub fetch_page: Option<PageFetcher>,
    /// Optional remote summary loader.
    pub fetch_summary: Option<SummaryFetcher>,
    /// Persistence slot key; persistence is disabled when absent.
    pub table_id: Option<String>,
    /// Fired when the paged strategy loads a page.
    pub on_page_change: Option<PageChangeCallback>,
    /// Fired once with the bootstrap mode decision.
    pub on_mode_change: Option<ModeChangeCallback>,
    /// Optional side panel.
    pub side_panel: Option<SidePanelConfig>,
}

impl GridConfig {
    /// Creates a configuration with defaults for everything but columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            container: "grid".into(),
            container_width: 1200,
            table_width: TableWidth::Full,
            table_height: 600,
            header_height: 40,
            summary_height: 36,
            row_height: 36,
            columns,
            frozen_columns: 0,
            show_summary: false,
            page_size: 100,
            buffer_rows: 5,
            max_cached_pages: 10,
            initial_data: None,
            fetch_page: None,
            fetch_summary: None,
            table_id: None,
            on_page_change: None,
            on_mode_change: None,
            side_panel: None,
        }
    }

    /// Sets the mount identifier.
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Sets the measured container width.
    pub fn container_width(mut self, width: u32) -> Self {
        self.container_width = width;
        self
    }

    /// Sets the table width.
    pub fn table_width(mut self, width: TableWidth) -> Self {
        self.table_width = width;
        self
    }

    /// Sets the table height.
    pub fn table_height(mut self, height: u32) -> Self {
        self.table_height = height;
        self
    }

    /// Sets the header row height.
    pub fn header_height(mut self, height: u32) -> Self {
        self.header_height = height;
        self
    }

    /// Sets the summary row height.
    pub fn summary_height(mut self, height: u32) -> Self {
        self.summary_height = height;
        self
    }

    /// Sets the data row height.
    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Sets the initial frozen column count.
    pub fn frozen_columns(mut self, count: usize) -> Self {
        self.frozen_columns = count;
        self
    }

    /// Enables the summary row.
    pub fn show_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Sets the server-mode page size.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the render buffer, in rows.
    pub fn buffer_rows(mut self, rows: usize) -> Self {
        self.buffer_rows = rows;
        self
    }

    /// Sets the page-cache bound.
    pub fn max_cached_pages(mut self, pages: usize) -> Self {
        self.max_cached_pages = pages;
        self
    }

    /// Supplies the full dataset.
    pub fn initial_data(mut self, data: Vec<Row>) -> Self {
        self.initial_data = Some(data);
        self
    }

    /// Installs the remote page loader.
    pub fn fetch_page(mut self, fetcher: PageFetcher) -> Self {
        self.fetch_page = Some(fetcher);
        self
    }

    /// Installs the remote summary loader.
    pub fn fetch_summary(mut self, fetcher: SummaryFetcher) -> Self {
        self.fetch_summary = Some(fetcher);
        self
    }

    /// Sets the persistence slot key.
    pub fn table_id(mut self, id: impl Into<String>) -> Self {
        self.table_id = Some(id.into());
        self
    }

    /// Installs the page-change callback.
    pub fn on_page_change(mut self, callback: impl Fn(PageInfo) + Send + Sync + 'static) -> Self {
        self.on_page_change = Some(Arc::new(callback));
        self
    }

    /// Installs the mode-change callback.
    pub fn on_mode_change(mut self, callback: impl Fn(GridMode) + Send + Sync + 'static) -> Self {
        self.on_mode_change = Some(Arc::new(callback));
        self
    }

    /// Configures the side panel.
    pub fn side_panel(mut self, config: SidePanelConfig) -> Self {
        self.side_panel = Some(config);
        self
    }

    /// The pixel width the column solver works against.
    pub fn effective_width(&self) -> u32 {
        match self.table_width {
            TableWidth::Full => self.container_width,
            TableWidth::Pixels(px) => px,
        }
    }

    /// The scroll viewport height: table height minus chrome.
    pub fn viewport_height(&self) -> u32 {
        let chrome = self.header_height
            + if self.show_summary {
                self.summary_height
            } else {
                0
            };
        self.table_height.saturating_sub(chrome)
    }

    /// Validates the configuration. Errors here are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::EmptyColumns);
        }
        if self.row_height == 0 {
            return Err(ConfigError::InvalidSize { name: "row_height" });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidSize { name: "page_size" });
        }
        if self.initial_data.is_none() && self.fetch_page.is_none() {
            return Err(ConfigError::MissingDataSource);
        }
        if let Some(side_panel) = &self.side_panel {
            side_panel.validate()?;
        }
        Ok(())
    }
}

impl fmt::Debug for GridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridConfig")
            .field("container", &self.container)
            .field("container_width", &self.container_width)
            .field("table_width", &self.table_width)
            .field("table_height", &self.table_height)
            .field("row_height", &self.row_height)
            .field("columns", &self.columns.len())
            .field("frozen_columns", &self.frozen_columns)
            .field("show_summary", &self.show_summary)
            .field("page_size", &self.page_size)
            .field("buffer_rows", &self.buffer_rows)
            .field("max_cached_pages", &self.max_cached_pages)
            .field(
                "initial_data",
                &self.initial_data.as_ref().map(|d| d.len()),
            )
            .field("fetch_page", &self.fetch_page.as_ref().map(|_| "<fn>"))
            .field("table_id", &self.table_id)
            .finish()
    }
}
