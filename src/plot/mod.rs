//! Chart output.
//!
//! - explicit chart styling (`style`)
//! - the five SVG charts (`charts`)

pub mod charts;
pub mod style;

pub use charts::{ChartData, ChartKind, render_all, render_chart};
pub use style::ChartStyle;
