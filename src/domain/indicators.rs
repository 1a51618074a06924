//! The fixed indicator set analysed by `trends`.
//!
//! Codes are World Bank WDI series ids. Labels double as table column names, CSV
//! headers and chart legends.

use super::types::IndicatorRequest;

pub const PM25_MEAN_EXPOSURE: &str = "EN.ATM.PM25.MC.M3";
pub const PM25_POPULATION_EXPOSED: &str = "EN.ATM.PM25.MC.ZS";
pub const GHG_PER_CAPITA: &str = "EN.GHG.ALL.PC.CE.AR5";
pub const CARBON_INTENSITY: &str = "EN.GHG.CO2.RT.GDP.PP.KD";
pub const GDP_CURRENT_USD: &str = "NY.GDP.MKTP.CD";
pub const POPULATION_TOTAL: &str = "SP.POP.TOTL";
pub const GDP_PER_CAPITA: &str = "NY.GDP.PCAP.CD";

pub const DEFAULT_COUNTRY: &str = "DEU";
pub const DEFAULT_START_YEAR: i32 = 1990;
pub const DEFAULT_END_YEAR: i32 = 2017;

pub const INDICATORS: [(&str, &str); 7] = [
    (PM25_MEAN_EXPOSURE, "PM2.5 - Mean exposure (µg/m³)"),
    (PM25_POPULATION_EXPOSED, "PM2.5 - Population exposed (%)"),
    (GHG_PER_CAPITA, "GHG emissions per capita (t CO2e)"),
    (CARBON_INTENSITY, "GDP carbon intensity (kg CO2e/PPP$)"),
    (GDP_CURRENT_USD, "GDP (US$)"),
    (POPULATION_TOTAL, "Total population"),
    (GDP_PER_CAPITA, "GDP per capita (US$)"),
];

/// Indicators reported in the trend summary, in print order.
pub const TREND_INDICATORS: [&str; 5] = [
    PM25_MEAN_EXPOSURE,
    PM25_POPULATION_EXPOSED,
    GHG_PER_CAPITA,
    CARBON_INTENSITY,
    GDP_PER_CAPITA,
];

/// Indicators compared on the base-100 chart (and given `_norm` columns).
pub const COMPARISON_INDICATORS: [&str; 3] = [PM25_MEAN_EXPOSURE, GHG_PER_CAPITA, CARBON_INTENSITY];

pub fn default_request(country: &str) -> IndicatorRequest {
    IndicatorRequest::new(country, INDICATORS)
}

/// Label for a code of the fixed set.
pub fn label_of(code: &str) -> Option<&'static str> {
    INDICATORS.iter().find(|(c, _)| *c == code).map(|(_, l)| *l)
}

/// Legend text: the part of a label before " - ", or the whole label.
pub fn short_label(label: &str) -> &str {
    label.split_once(" - ").map(|(head, _)| head).unwrap_or(label)
}
