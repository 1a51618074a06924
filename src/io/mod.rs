//! Input/output helpers.
//!
//! - observation table CSV export (`export`)
//! - reading an exported CSV back into a table (`ingest`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
