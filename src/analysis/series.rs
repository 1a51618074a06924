//! Year filtering and normalization.

use std::cmp::Ordering;

use crate::domain::{NORMALIZED_SUFFIX, ObservationRow, ObservationTable, YearRange};
use crate::error::AppError;

/// Sort rows by ascending year; rows without a year go last.
///
/// The sort is stable, so rows sharing a year keep their fetch order.
pub fn sort_by_year(table: &ObservationTable) -> ObservationTable {
    let mut rows = table.rows().to_vec();
    rows.sort_by(cmp_year);
    ObservationTable::with_rows(table.columns().to_vec(), rows, table.source.clone())
}

fn cmp_year(a: &ObservationRow, b: &ObservationRow) -> Ordering {
    match (a.year, b.year) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rows whose year lies in `range` (inclusive), sorted ascending by year.
///
/// Rows with an unknown year never match. An empty table stays empty.
pub fn filter_years(table: &ObservationTable, range: YearRange) -> ObservationTable {
    let sorted = sort_by_year(table);
    let rows = sorted
        .rows()
        .iter()
        .filter(|r| r.year.is_some_and(|y| range.contains(y)))
        .cloned()
        .collect();
    ObservationTable::with_rows(sorted.columns().to_vec(), rows, sorted.source.clone())
}

/// Rescale `values` so the first becomes exactly 100.
///
/// Returns `None` for an empty series or a base that cannot divide (zero/non-finite).
pub fn normalize_base100(values: &[f64]) -> Option<Vec<f64>> {
    let base = *values.first()?;
    if base == 0.0 || !base.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / base * 100.0).collect())
}

/// `(year, value)` series rescaled to base 100 at its first point.
pub fn normalize_series(series: &[(i32, f64)]) -> Option<Vec<(i32, f64)>> {
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let scaled = normalize_base100(&values)?;
    Some(series.iter().map(|(y, _)| *y).zip(scaled).collect())
}

/// Append a `<label>_norm` column for each label that has a usable base.
///
/// The base is the label's first present value in row order; rows where the source
/// value is missing stay missing. Labels with no usable base are skipped; their
/// names are returned.
pub fn add_normalized_columns(table: &mut ObservationTable, labels: &[&str]) -> Result<Vec<String>, AppError> {
    let mut skipped = Vec::new();
    for label in labels {
        let Some(raw) = table.column(label) else {
            skipped.push(label.to_string());
            continue;
        };
        let present: Vec<f64> = raw.iter().flatten().copied().collect();
        let Some(scaled) = normalize_base100(&present) else {
            skipped.push(label.to_string());
            continue;
        };

        let mut scaled = scaled.into_iter();
        let aligned = raw
            .iter()
            .map(|v| v.and_then(|_| scaled.next()))
            .collect();
        table.add_column(format!("{label}{NORMALIZED_SUFFIX}"), aligned)?;
    }
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(years: &[Option<i32>]) -> ObservationTable {
        let mut t = ObservationTable::new(vec!["v".to_string()]);
        for (i, y) in years.iter().enumerate() {
            t.push_row(*y, vec![Some(i as f64 + 1.0)]).unwrap();
        }
        t
    }

    #[test]
    fn filter_keeps_inclusive_range_sorted() {
        let t = table(&[Some(2020), Some(1985), Some(2017), None, Some(1990), Some(2000), Some(1989)]);
        let out = filter_years(&t, YearRange::new(1990, 2017).unwrap());
        let years: Vec<_> = out.rows().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(1990), Some(2000), Some(2017)]);
        // Values travel with their year.
        assert_eq!(out.rows()[0].values, vec![Some(5.0)]);
    }

    #[test]
    fn filter_on_empty_table_is_empty() {
        let out = filter_years(&ObservationTable::empty(), YearRange::new(1990, 2017).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn sort_puts_unknown_years_last() {
        let t = table(&[None, Some(2001), Some(1999)]);
        let years: Vec<_> = sort_by_year(&t).rows().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(1999), Some(2001), None]);
    }

    #[test]
    fn normalize_first_value_is_exactly_100() {
        let values = [12.3, 15.0, 9.1, 0.7];
        let out = normalize_base100(&values).unwrap();
        assert_eq!(out[0], 100.0);
        for (v, n) in values.iter().zip(&out) {
            assert_eq!(*n, v / values[0] * 100.0);
        }
    }

    #[test]
    fn normalize_rejects_empty_and_zero_base() {
        assert!(normalize_base100(&[]).is_none());
        assert!(normalize_base100(&[0.0, 1.0]).is_none());
        assert!(normalize_series(&[]).is_none());
    }

    #[test]
    fn normalized_column_aligns_with_missing_values() {
        let mut t = ObservationTable::new(vec!["a".to_string(), "z".to_string()]);
        t.push_row(Some(1990), vec![None, Some(0.0)]).unwrap();
        t.push_row(Some(1991), vec![Some(20.0), Some(1.0)]).unwrap();
        t.push_row(Some(1992), vec![None, None]).unwrap();
        t.push_row(Some(1993), vec![Some(30.0), None]).unwrap();

        let skipped = add_normalized_columns(&mut t, &["a", "z", "missing"]).unwrap();
        assert_eq!(skipped, vec!["z".to_string(), "missing".to_string()]);
        assert_eq!(t.column("a_norm").unwrap(), vec![None, Some(100.0), None, Some(150.0)]);
        assert!(t.column("z_norm").is_none());
    }
}
