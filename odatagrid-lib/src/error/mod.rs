//! Error types

mod fetch;
mod relay;
mod table;

pub use fetch::*;
pub use relay::*;
pub use table::*;
