//! Table transforms and trend statistics.
//!
//! - year-range selection + sorting (`series`)
//! - base-100 normalization (`series`)
//! - first-to-last percentage change (`trend`)

pub mod series;
pub mod trend;

pub use series::*;
pub use trend::*;
