//! In-memory grid: sort, filter, inspect the rendered window.

use std::fs::File;

use gridkit::model::{Column, DataType, Row, SortDirection, SummaryType};
use gridkit::{DataGrid, GridConfig};
use simplelog::{Config, LevelFilter, WriteLogger};

fn dataset() -> Vec<Row> {
    let cities = ["Oslo", "Lisbon", "Osaka", "Quito", "Perth"];
    (0..500)
        .map(|i| {
            Row::new()
                .set("id", i as i64)
                .set("city", cities[i % cities.len()])
                .set("population", ((i * 37) % 900 + 100) as i64)
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), gridkit::GridError> {
    let log_file = File::create("gridkit-basic.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let config = GridConfig::new(vec![
        Column::new("id", "Id").width(80),
        Column::new("city", "City").flex(1),
        Column::new("population", "Population")
            .data_type(DataType::Number)
            .summary(SummaryType::Sum)
            .width(140),
    ])
    .initial_data(dataset())
    .show_summary(true)
    .row_height(32);

    let grid = DataGrid::new(config)?;
    grid.ready().await?;
    println!("mode: {}, rows: {}", grid.mode(), grid.total_rows());

    grid.sort("population", SortDirection::Desc);
    grid.settle().await;
    let top = grid.get_row(0).expect("sorted view has a first row");
    println!(
        "largest: {} ({})",
        top.display("city"),
        top.display("population")
    );

    grid.filter("os");
    grid.settle().await;
    println!("rows matching \"os\": {}", grid.total_rows());

    // Scroll a few viewports down and render the window.
    grid.handle_scroll(50 * 32);
    grid.tick();
    println!("visible rows: {:?}", grid.visible_row_indexes());

    if let Some(summary) = grid.summary() {
        println!("population sum: {}", summary.display("population"));
    }

    grid.destroy();
    Ok(())
}
