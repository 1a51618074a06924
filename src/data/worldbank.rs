//! World Bank Indicators API (v2) integration.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{IndicatorRequest, ObservationTable, SourceInfo};
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";
pub const BASE_URL_ENV: &str = "WB_API_URL";

/// World Development Indicators. Multi-indicator queries must name a source.
const SOURCE_WDI: &str = "2";
/// Large enough that one page holds every year of every requested indicator.
const PER_PAGE: usize = 20000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything that can produce an observation table for a request.
pub trait IndicatorSource {
    fn fetch_table(&self, request: &IndicatorRequest) -> Result<ObservationTable, FetchError>;
}

/// Fetch through `source`, turning any failure into an empty table.
///
/// The error is logged here and goes no further; callers only see "no data".
pub fn fetch<S: IndicatorSource + ?Sized>(source: &S, request: &IndicatorRequest) -> ObservationTable {
    match source.fetch_table(request) {
        Ok(table) => {
            tracing::info!(
                country = %request.country,
                rows = table.len(),
                columns = table.columns().len(),
                "fetched indicators"
            );
            table
        }
        Err(err) => {
            tracing::error!(country = %request.country, "indicator fetch failed: {err}");
            ObservationTable::empty()
        }
    }
}

pub struct WorldBankClient {
    client: Client,
    base_url: String,
}

impl WorldBankClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for the public API, unless `WB_API_URL` (environment or `.env`) points elsewhere.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    fn fetch_page(&self, request: &IndicatorRequest, page: u64) -> Result<Page, FetchError> {
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            request.country,
            request.joined_codes()
        );
        tracing::debug!(%url, page, "requesting indicator page");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("source", SOURCE_WDI),
                ("per_page", &PER_PAGE.to_string()),
                ("page", &page.to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let body = resp.text()?;
        parse_page(&body)
    }
}

impl IndicatorSource for WorldBankClient {
    fn fetch_table(&self, request: &IndicatorRequest) -> Result<ObservationTable, FetchError> {
        if request.indicators.is_empty() {
            return Err(FetchError::EmptyRequest);
        }

        let first = self.fetch_page(request, 1)?;
        let pages = first.meta.pages;
        let mut all = vec![first];
        let mut page = 1;
        while page < pages {
            page += 1;
            all.push(self.fetch_page(request, page)?);
        }

        reshape(request, &all)
    }
}

/// One decoded response page.
#[derive(Debug)]
struct Page {
    meta: PageMeta,
    observations: Vec<ApiObservation>,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    #[serde(deserialize_with = "lenient_u64")]
    pages: u64,
    #[serde(default)]
    lastupdated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiObservation {
    indicator: ApiRef,
    #[serde(default)]
    country: Option<ApiRef>,
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    id: String,
    #[serde(default)]
    value: Option<String>,
}

/// The API is inconsistent about paging fields: some endpoints send numbers,
/// some send numeric strings.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().ok_or_else(|| D::Error::custom("page count is not a positive integer")),
        Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("unexpected page count {other}"))),
    }
}

/// Decode a response body: `[meta, observations]` on success,
/// `[{"message": [...]}]` when the API rejects the query.
fn parse_page(body: &str) -> Result<Page, FetchError> {
    let parts: Vec<Value> = serde_json::from_str(body)?;
    let header = parts
        .first()
        .ok_or_else(|| FetchError::Malformed("empty response array".to_string()))?;

    if let Some(messages) = header.get("message") {
        let first = messages.as_array().and_then(|m| m.first());
        let field = |name: &str| {
            first
                .and_then(|m| m.get(name))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        return Err(FetchError::Api {
            id: field("id"),
            message: field("value"),
        });
    }

    let meta: PageMeta = serde_json::from_value(header.clone())?;
    let observations = match parts.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => serde_json::from_value(v.clone())?,
    };

    Ok(Page { meta, observations })
}

/// Read a source date as a year. Non-annual or garbled dates yield `None`.
pub fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Pivot long-format observations into one row per date, one column per requested
/// indicator (named by its label).
fn reshape(request: &IndicatorRequest, pages: &[Page]) -> Result<ObservationTable, FetchError> {
    let width = request.indicators.len();
    let mut by_date: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    let mut source = SourceInfo::default();

    for page in pages {
        if source.last_updated.is_none() {
            source.last_updated = page
                .meta
                .lastupdated
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        }

        for obs in &page.observations {
            let Some(col) = request.position(&obs.indicator.id) else {
                tracing::debug!(indicator = %obs.indicator.id, "ignoring unrequested indicator");
                continue;
            };
            if source.country_name.is_none() {
                source.country_name = obs.country.as_ref().and_then(|c| c.value.clone());
            }

            let row = by_date
                .entry(obs.date.trim().to_string())
                .or_insert_with(|| vec![None; width]);
            if row[col].is_none() {
                row[col] = obs.value.filter(|v| v.is_finite());
            }
        }
    }

    let mut table = ObservationTable::new(request.labels());
    table.source = source;
    for (date, values) in by_date {
        table
            .push_row(parse_year(&date), values)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
    }
    Ok(table)
}
