//! Field declarations and the generated get/set accessor pair.

mod accessor;
mod config;

pub use accessor::{register_field, FieldAccessor, ReadOutcome, WriteOutcome};
pub use config::{FieldConfig, TransformContext, TransformFn};
