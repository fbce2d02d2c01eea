//! Row and value model

mod row;
pub(crate) mod row_serde;
mod value;

pub use row::*;
pub use value::*;
