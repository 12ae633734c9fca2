//! Console walkthrough of the table engine: builds a small dataset and
//! prints the derived views after each state change.

use log::{LevelFilter, info};
use serde_json::json;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use trestle::prelude::*;

fn main() {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("failed to initialize logger");

    let data = vec![
        json!({ "name": "Ada Lovelace", "team": "analysis", "age": 36, "visits": 12 }),
        json!({ "name": "Grace Hopper", "team": "compilers", "age": 45, "visits": 30 }),
        json!({ "name": "Edsger Dijkstra", "team": "algorithms", "age": 42, "visits": 7 }),
        json!({ "name": "Barbara Liskov", "team": "compilers", "age": 39, "visits": 21 }),
        json!({ "name": "Donald Knuth", "team": "algorithms", "age": 37, "visits": 18 }),
    ];

    let columns = vec![
        ColumnDef::group(
            "Person",
            vec![
                ColumnDef::accessor("name").header("Name"),
                ColumnDef::accessor("age")
                    .header("Age")
                    .aggregation_fn(AggregationFn::Mean),
            ],
        ),
        ColumnDef::accessor("team").header("Team"),
        ColumnDef::accessor("visits")
            .header("Visits")
            .aggregation_fn(AggregationFn::Sum),
    ];

    let table = Table::new(Options::new(data, columns)).expect("column definitions are valid");

    print_headers(&table);
    print_rows("initial", &table);

    table.set_sorting(Updater::set(vec![ColumnSort::desc("age")]));
    print_rows("sorted by age, descending", &table);

    table.set_column_filter("age", Some(FilterValue::range(37.0, None)));
    print_rows("age >= 37", &table);

    table.set_grouping(Updater::set(vec!["team".to_string()]));
    table.set_expanded(Updater::set(ExpandedState::All));
    print_rows("grouped by team, expanded", &table);

    table.set_column_filter("age", None);
    table.set_grouping(Updater::set(Vec::new()));
    table.set_page_size(2);
    info!("page count: {}", table.page_count());
    print_rows("first page of two rows", &table);
    table.next_page();
    print_rows("second page", &table);
}

fn print_headers(table: &Table<serde_json::Value>) {
    let headers = table.header_model();
    for group in &headers.header_groups {
        let row: Vec<String> = group
            .headers
            .iter()
            .map(|header| {
                let label = header.label().unwrap_or("·");
                format!("{label} (x{})", header.col_span)
            })
            .collect();
        println!("header row {}: {}", group.depth, row.join(" | "));
    }
}

fn print_rows(stage: &str, table: &Table<serde_json::Value>) {
    println!("--- {stage} ---");
    let model = table.row_model();
    for row in &model.rows {
        let indent = "  ".repeat(row.depth());
        let cells: Vec<String> = table
            .visible_cells(row)
            .iter()
            .map(Cell::render)
            .collect();
        println!("{indent}{}", cells.join(" | "));
    }
    println!();
}
