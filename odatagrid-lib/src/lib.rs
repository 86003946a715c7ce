//! OData data grid library
//!
//! Server-driven sorting, filtering and pagination over an OData v4 entity
//! set, with the query state mirrored in the address bar.
//!
//! ```ignore
//! use odatagrid_lib::{Coordinator, GridConfig, GridEvent, MemoryHistory, people_columns};
//!
//! let history = MemoryHistory::new("/", "?$orderby=LastName%20desc&page=2");
//! let mut grid = Coordinator::new(GridConfig::default(), people_columns(), history)?;
//! grid.dispatch(GridEvent::Load).await;
//! println!("{}", grid.table_html());
//! ```

pub mod error;
pub mod events;
pub mod location;
pub mod markup;
pub mod modal;
pub mod model;
pub mod pagination;
pub mod query;
pub mod relay;
pub mod request;
pub mod table;

mod config;
mod coordinator;

pub use config::*;
pub use coordinator::*;
pub use events::GridEvent;
pub use location::AddressBar;
pub use location::MemoryHistory;
