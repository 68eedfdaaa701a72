//! Reshaping raw metric observations into a date-aligned table.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};

use crate::data::types::MetricPoint;

/// Date-indexed table with one column per metric. Column vectors run
/// parallel to `dates`, which is sorted ascending and duplicate-free.
#[derive(Debug, Clone, Default)]
pub struct AlignedTable {
    pub dates: Vec<NaiveDate>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl AlignedTable {
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(|c| c.as_slice())
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }
}

/// Pivot raw points into a date x metric table, collapsing duplicate
/// (date, metric) observations by mean.
pub fn pivot(points: &[MetricPoint]) -> AlignedTable {
    // (date, metric) -> (sum, count)
    let mut cells: BTreeMap<(NaiveDate, String), (f64, usize)> = BTreeMap::new();
    for point in points {
        let key = (point.timestamp.date_naive(), point.metric_name.clone());
        let cell = cells.entry(key).or_insert((0.0, 0));
        cell.0 += point.value;
        cell.1 += 1;
    }

    let mut dates: Vec<NaiveDate> = cells.keys().map(|(date, _)| *date).collect();
    dates.sort_unstable();
    dates.dedup();

    let index: BTreeMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut columns: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for ((date, metric), (sum, count)) in cells {
        let column = columns
            .entry(metric)
            .or_insert_with(|| vec![None; dates.len()]);
        column[index[&date]] = Some(sum / count as f64);
    }

    AlignedTable { dates, columns }
}

/// Forward-fill then backward-fill every column, so any column with at
/// least one observation has a value on every date in the table.
pub fn fill_gaps(table: &mut AlignedTable) {
    for column in table.columns.values_mut() {
        let mut last = None;
        for cell in column.iter_mut() {
            match cell {
                Some(v) => last = Some(*v),
                None => *cell = last,
            }
        }
        let mut next = None;
        for cell in column.iter_mut().rev() {
            match cell {
                Some(v) => next = Some(*v),
                None => *cell = next,
            }
        }
    }
}

/// Values of two columns restricted to dates where both are present.
pub fn paired(table: &AlignedTable, a: &str, b: &str) -> Option<(Vec<f64>, Vec<f64>)> {
    let col_a = table.column(a)?;
    let col_b = table.column(b)?;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (va, vb) in col_a.iter().zip(col_b.iter()) {
        if let (Some(x), Some(y)) = (va, vb) {
            xs.push(*x);
            ys.push(*y);
        }
    }
    Some((xs, ys))
}

/// Parse a date as either a plain day or an RFC 3339 timestamp, the two
/// shapes the upstream service emits.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(day: u32, value: f64, metric: &str) -> MetricPoint {
        MetricPoint {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            value,
            metric_name: metric.to_string(),
        }
    }

    #[test]
    fn test_pivot_round_trip() {
        let points = vec![
            point(1, 10.0, "wait_time"),
            point(2, 12.0, "wait_time"),
            point(1, 4.5, "prep_time"),
            point(3, 5.0, "prep_time"),
        ];
        let table = pivot(&points);

        assert_eq!(table.dates.len(), 3);
        for p in &points {
            let idx = table
                .dates
                .iter()
                .position(|d| *d == p.timestamp.date_naive())
                .unwrap();
            assert_eq!(table.column(&p.metric_name).unwrap()[idx], Some(p.value));
        }
    }

    #[test]
    fn test_pivot_averages_duplicate_dates() {
        let points = vec![
            point(1, 10.0, "wait_time"),
            point(1, 14.0, "wait_time"),
        ];
        let table = pivot(&points);
        assert_eq!(table.column("wait_time").unwrap(), &[Some(12.0)]);
    }

    #[test]
    fn test_fill_gaps_forward_then_backward() {
        let points = vec![
            point(1, 1.0, "a"),
            point(2, 2.0, "b"),
            point(3, 3.0, "a"),
        ];
        let mut table = pivot(&points);
        fill_gaps(&mut table);

        // "a" has a gap on day 2 filled forward from day 1;
        // "b" has a gap on day 1 filled backward from day 2.
        assert_eq!(table.column("a").unwrap(), &[Some(1.0), Some(1.0), Some(3.0)]);
        assert_eq!(table.column("b").unwrap(), &[Some(2.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn test_paired_drops_missing() {
        let points = vec![
            point(1, 1.0, "a"),
            point(2, 2.0, "a"),
            point(2, 20.0, "b"),
            point(3, 30.0, "b"),
        ];
        let table = pivot(&points);
        let (xs, ys) = paired(&table, "a", "b").unwrap();
        assert_eq!(xs, vec![2.0]);
        assert_eq!(ys, vec![20.0]);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            parse_date("2024-03-05T10:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_date("not a date"), None);
    }
}
