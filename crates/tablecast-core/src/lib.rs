//! Tablecast Core - Common infrastructure for the table publishing pipeline
//!
//! This crate provides the table data model, the declarative row
//! transform engine, and the deadline/logging plumbing shared by the
//! fetch and publish crates.

pub mod deadline;
pub mod logging;
pub mod transform;
pub mod value;

// Re-exports for convenience
pub use deadline::Deadline;
pub use logging::init_logging;
pub use transform::{Munger, TransformSpec, apply, check_all_fields_present};
pub use value::{Record, Table, Value};
