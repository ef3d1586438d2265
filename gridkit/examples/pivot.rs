//! Pivot mode: group, aggregate, flatten, walk the tree.

use std::fs::File;

use gridkit::model::{Column, Row};
use gridkit::pivot::{Aggregation, FlatRowKind, PivotConfig};
use gridkit::{DataGrid, GridConfig};
use simplelog::{Config, LevelFilter, WriteLogger};

fn orders() -> Vec<Row> {
    let regions = ["North", "South", "East"];
    let products = ["widget", "gadget"];
    (0..60)
        .map(|i| {
            Row::new()
                .set("region", regions[i % 3])
                .set("product", products[i % 2])
                .set("amount", ((i * 13) % 50 + 10) as i64)
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), gridkit::GridError> {
    let log_file = File::create("gridkit-pivot.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let config = GridConfig::new(vec![
        Column::new("region", "Region"),
        Column::new("product", "Product"),
        Column::new("amount", "Amount"),
    ])
    .initial_data(orders())
    .row_height(28);

    let grid = DataGrid::new(config)?;
    grid.ready().await?;

    let view = grid.pivot_view(
        PivotConfig::new(["region", "product"])
            .value_field("amount", Aggregation::Sum)
            .show_subtotals(true),
    )?;

    for row in view.flat_rows() {
        let marker = match row.kind {
            FlatRowKind::Normal => "",
            FlatRowKind::Subtotal => " (subtotal)",
            FlatRowKind::GrandTotal => " (grand total)",
        };
        println!(
            "{:indent$}{}{} = {}",
            "",
            row.label,
            marker,
            row.data.display("amount"),
            indent = (row.level.max(0) as usize) * 2,
        );
    }

    view.update_visible_rows();
    view.handle_scroll(120);
    println!("breadcrumb at scroll 120: {:?}", view.breadcrumb());

    grid.destroy();
    Ok(())
}
