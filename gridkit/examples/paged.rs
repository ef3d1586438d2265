//! Paged-remote grid: a simulated server with latency, skeleton fills.

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use gridkit::data::{PageFetcher, PageResponse};
use gridkit::model::{Column, Row};
use gridkit::{DataGrid, GridConfig};
use simplelog::{Config, LevelFilter, WriteLogger};

const TOTAL: usize = 200_000;
const PAGE_SIZE: usize = 100;

fn server() -> PageFetcher {
    Arc::new(|page, query| {
        async move {
            // Pretend the network is slow.
            tokio::time::sleep(Duration::from_millis(30)).await;
            let start = page * PAGE_SIZE;
            let end = (start + PAGE_SIZE).min(TOTAL);
            let list: Vec<Row> = (start..end)
                .map(|i| {
                    Row::new()
                        .set("id", i as i64)
                        .set("label", format!("record {i}"))
                })
                .collect();
            log::info!("served page {page} (sort: {:?})", query.sort_key);
            Ok(PageResponse {
                list,
                total_rows: TOTAL,
            })
        }
        .boxed()
    })
}

#[tokio::main]
async fn main() -> Result<(), gridkit::GridError> {
    let log_file = File::create("gridkit-paged.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let config = GridConfig::new(vec![
        Column::new("id", "Id").width(100),
        Column::new("label", "Label").flex(1),
    ])
    .fetch_page(server())
    .page_size(PAGE_SIZE)
    .max_cached_pages(8)
    .on_page_change(|info| {
        log::info!("page {} loaded ({} rows)", info.page, info.rows);
    });

    let grid = DataGrid::new(config)?;
    grid.ready().await?;
    println!("mode: {}, rows: {}", grid.mode(), grid.total_rows());

    // Jump deep into the dataset: skeletons render immediately, the page
    // fill lands when the fetch settles.
    grid.handle_scroll(150_000 * 36);
    if let Some(update) = grid.tick() {
        println!("pending pages for rows {:?}", update.pending);
    }
    grid.settle().await;

    let row = grid.get_row(150_000).expect("page filled");
    println!("row 150000: {}", row.display("label"));

    grid.destroy();
    Ok(())
}
