//! Loads the TripPin People grid and prints it as HTML.
//!
//! Run with: `cargo run -p odatagrid-lib --example people_grid -- '?$orderby=LastName%20desc'`

use odatagrid_lib::Coordinator;
use odatagrid_lib::GridConfig;
use odatagrid_lib::GridEvent;
use odatagrid_lib::MemoryHistory;
use odatagrid_lib::people_columns;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let search = std::env::args().nth(1).unwrap_or_default();
    let history = MemoryHistory::new("/people.html", search);

    let mut grid = match Coordinator::new(GridConfig::default(), people_columns(), history) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let status = grid.dispatch(GridEvent::Load).await;
    println!("<!-- {:?} {} -->", status, grid.address_bar().href());
    if let Some(notice) = grid.notice() {
        println!("<!-- {} -->", notice);
    }
    println!("{}", grid.toolbar_html());
    println!("{}", grid.table_html());
    println!("{}", grid.pagination_html());
}
