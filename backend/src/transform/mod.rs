//! Transformation module.
//!
//! - Row: one record to one request descriptor
//! - Pipeline: input file to an ordered, validated batch

pub mod pipeline;
pub mod row;

pub use pipeline::*;
pub use row::RowTransformer;
