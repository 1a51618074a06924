//! `indicator-trends` library crate.
//!
//! The binary (`trends`) is a thin wrapper around this library so that:
//!
//! - the fetch/analysis pipeline is testable without network or processes
//! - chart rendering and CSV export can be reused from a saved table
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
