//! Record models

mod page;
mod record;
mod record_serde;
mod value;

pub use page::*;
pub use record::*;
pub use value::*;
