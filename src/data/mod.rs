//! Remote indicator data.
//!
//! - `IndicatorSource`: the narrow seam the pipeline fetches through
//! - `WorldBankClient`: the production implementation (World Bank API v2)
//! - `fetch`: the failure-absorbing boundary (errors become an empty table)

pub mod worldbank;

pub use worldbank::*;
