//! The bootstrap policy: choose in-memory or paged-remote.

use std::sync::Arc;

use crate::config::GridConfig;
use crate::error::ConfigError;
use crate::error::GridError;
use crate::model::Query;
use crate::model::Row;
use crate::state::GridMode;

use super::DataStrategy;
use super::InMemoryStrategy;
use super::PagedRemoteStrategy;

/// Largest dataset the engine keeps fully in memory.
///
/// Below this, even a remote source is drained eagerly and served from
/// memory; above it, the paged strategy takes over.
pub const CLIENT_SIDE_MAX_ROWS: usize = 10_000;

/// What the bootstrap policy decided.
pub struct BootstrapOutcome {
    /// The chosen strategy.
    pub strategy: Arc<dyn DataStrategy>,
    /// The initial total.
    pub total_rows: usize,
    /// The chosen mode.
    pub mode: GridMode,
}

/// Chooses and initializes a data strategy:
///
/// 1. With `initial_data`: in-memory when within the client-side limit,
///    otherwise paged-remote (which then requires `fetch_page`).
/// 2. Without it, `fetch_page` is probed for page 0. A small total drains
///    every remaining page eagerly into an in-memory strategy; a large one
///    stays paged, retaining the probe page.
/// 3. Neither configured is a fatal configuration error (also caught by
///    config validation).
pub(crate) async fn run_bootstrap(config: &GridConfig) -> Result<BootstrapOutcome, GridError> {
    if let Some(data) = &config.initial_data {
        let total_rows = data.len();
        if total_rows <= CLIENT_SIDE_MAX_ROWS {
            log::debug!("bootstrap: {total_rows} rows in memory (client mode)");
            let strategy: Arc<dyn DataStrategy> = Arc::new(InMemoryStrategy::new(
                data.clone(),
                config.columns.clone(),
            ));
            return Ok(BootstrapOutcome {
                strategy,
                total_rows,
                mode: GridMode::Client,
            });
        }

        let Some(fetcher) = &config.fetch_page else {
            return Err(ConfigError::DatasetTooLargeForClient { rows: total_rows }.into());
        };
        log::debug!("bootstrap: {total_rows} rows exceed the client limit (server mode)");
        let strategy: Arc<dyn DataStrategy> = make_paged(config, Arc::clone(fetcher));
        let total_rows = strategy.bootstrap().await?;
        return Ok(BootstrapOutcome {
            strategy,
            total_rows,
            mode: GridMode::Server,
        });
    }

    let Some(fetcher) = &config.fetch_page else {
        return Err(ConfigError::MissingDataSource.into());
    };

    // Probe page 0 for the total before committing to a mode.
    let first = fetcher(0, Query::default()).await?;
    let total_rows = first.total_rows;

    if total_rows <= CLIENT_SIDE_MAX_ROWS {
        log::debug!("bootstrap: probe says {total_rows} rows, draining eagerly (client mode)");
        let mut rows: Vec<Row> = first.list;
        let page_size = config.page_size.max(1);
        let page_count = total_rows.div_ceil(page_size);
        for page in 1..page_count {
            let response = fetcher(page, Query::default()).await?;
            rows.extend(response.list);
        }
        rows.truncate(total_rows);
        let strategy: Arc<dyn DataStrategy> =
            Arc::new(InMemoryStrategy::new(rows, config.columns.clone()));
        return Ok(BootstrapOutcome {
            strategy,
            total_rows,
            mode: GridMode::Client,
        });
    }

    log::debug!("bootstrap: probe says {total_rows} rows, staying paged (server mode)");
    let paged = make_paged(config, Arc::clone(fetcher));
    paged.seed_first_page(first.list, total_rows);
    Ok(BootstrapOutcome {
        strategy: paged,
        total_rows,
        mode: GridMode::Server,
    })
}

fn make_paged(config: &GridConfig, fetcher: super::PageFetcher) -> Arc<PagedRemoteStrategy> {
    Arc::new(PagedRemoteStrategy::new(
        fetcher,
        config.page_size,
        config.max_cached_pages,
        config.fetch_summary.clone(),
        config.on_page_change.clone(),
    ))
}
