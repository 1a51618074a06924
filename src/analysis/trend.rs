//! First-to-last trend statistics.

use crate::domain::ObservationTable;

/// Change of one indicator over the observed window.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub label: String,
    pub first_year: i32,
    pub last_year: i32,
    pub initial: f64,
    pub last: f64,
    /// Percentage change, `(last - initial) / initial * 100`.
    pub change_pct: f64,
}

pub fn percent_change(initial: f64, last: f64) -> f64 {
    (last - initial) / initial * 100.0
}

/// Trend for one column; needs at least two present values.
pub fn compute_trend(table: &ObservationTable, label: &str) -> Option<Trend> {
    let series = table.series(label);
    if series.len() < 2 {
        return None;
    }
    let (first_year, initial) = *series.first()?;
    let (last_year, last) = *series.last()?;
    Some(Trend {
        label: label.to_string(),
        first_year,
        last_year,
        initial,
        last,
        change_pct: percent_change(initial, last),
    })
}

/// Trends for `labels` in order, skipping columns with too little data.
pub fn compute_trends(table: &ObservationTable, labels: &[&str]) -> Vec<Trend> {
    labels
        .iter()
        .filter_map(|label| compute_trend(table, label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_to_fifteen_is_plus_fifty_percent() {
        assert_eq!(percent_change(10.0, 15.0), 50.0);
    }

    #[test]
    fn trend_uses_first_and_last_present_values() {
        let mut t = ObservationTable::new(vec!["x".to_string(), "y".to_string()]);
        t.push_row(Some(1990), vec![None, Some(1.0)]).unwrap();
        t.push_row(Some(1991), vec![Some(10.0), None]).unwrap();
        t.push_row(Some(1992), vec![Some(12.0), None]).unwrap();
        t.push_row(Some(1993), vec![Some(15.0), None]).unwrap();
        t.push_row(Some(1994), vec![None, None]).unwrap();

        let trend = compute_trend(&t, "x").unwrap();
        assert_eq!((trend.first_year, trend.last_year), (1991, 1993));
        assert_eq!((trend.initial, trend.last), (10.0, 15.0));
        assert!((trend.change_pct - 50.0).abs() < 1e-12);

        // A single observation is not a trend.
        assert!(compute_trend(&t, "y").is_none());
        let all = compute_trends(&t, &["x", "y", "absent"]);
        assert_eq!(all.len(), 1);
    }
}
