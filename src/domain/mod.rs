//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the indicator request (`IndicatorRequest`, `Indicator`)
//! - the reshaped observation table (`ObservationTable`, `ObservationRow`)
//! - the fixed indicator set analysed by the `trends` binary (`indicators`)

pub mod indicators;
pub mod types;

pub use indicators::*;
pub use types::*;
