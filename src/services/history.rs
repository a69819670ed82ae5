// src/services/history.rs
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{PolicyError, Result};
use crate::models::DataSeries;

/// A dense time-indexed table: one sorted date index shared by every named
/// column. Only the aligner produces these, so every cell is populated.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl HistoricalTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| {
                PolicyError::DataUnavailable(format!("missing column '{}'", name))
            })
    }

    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.dates.len(),
            "column length must match the date index"
        );
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    /// View of one column as a dated series, for re-joining computed columns
    /// across tables.
    pub fn column_series(&self, name: &str) -> Result<DataSeries> {
        let values = self.column(name)?;
        Ok(DataSeries {
            observations: self.dates.iter().copied().zip(values.iter().copied()).collect(),
        })
    }

    /// All values rounded to `decimals` places. Applied once at the
    /// reporting boundary, never between computation stages.
    pub fn rounded(mut self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        for column in &mut self.columns {
            for value in &mut column.values {
                *value = (*value * factor).round() / factor;
            }
        }
        self
    }
}

// Column-major outer join of the named series, truncated to end at the
// anchor's last observation date.
fn join_truncated(
    series: &[(&str, &DataSeries)],
    anchor: &str,
) -> Result<(Vec<NaiveDate>, Vec<String>, Vec<Vec<Option<f64>>>)> {
    let (_, anchor_series) = series
        .iter()
        .find(|(name, _)| *name == anchor)
        .ok_or_else(|| {
            PolicyError::DataUnavailable(format!("anchor series '{}' not among inputs", anchor))
        })?;
    let anchor_end = anchor_series.last_date().ok_or_else(|| {
        PolicyError::DataUnavailable(format!("anchor series '{}' has no observations", anchor))
    })?;

    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (position, (_, data)) in series.iter().enumerate() {
        for (date, value) in &data.observations {
            if *date > anchor_end {
                continue;
            }
            rows.entry(*date)
                .or_insert_with(|| vec![None; series.len()])[position] = Some(*value);
        }
    }

    let dates: Vec<NaiveDate> = rows.keys().copied().collect();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(dates.len()); series.len()];
    for row in rows.values() {
        for (position, value) in row.iter().enumerate() {
            columns[position].push(*value);
        }
    }
    let names = series.iter().map(|(name, _)| name.to_string()).collect();
    Ok((dates, names, columns))
}

fn build_table(
    dates: Vec<NaiveDate>,
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
) -> Result<HistoricalTable> {
    // Drop rows that still hold a gap; they precede the first observation of
    // some series and cannot be reconciled.
    let keep: Vec<usize> = (0..dates.len())
        .filter(|&row| columns.iter().all(|col| col[row].is_some()))
        .collect();
    if keep.is_empty() {
        return Err(PolicyError::DataUnavailable(
            "no rows with complete data across all series".to_string(),
        ));
    }

    let dates = keep.iter().map(|&row| dates[row]).collect();
    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, col)| Column {
            name,
            values: keep
                .iter()
                .map(|&row| col[row].expect("kept rows are complete"))
                .collect(),
        })
        .collect();
    Ok(HistoricalTable { dates, columns })
}

/// Join independently-updated series into one table ending at the anchor's
/// last observation, forward-filling each column to bridge lower-frequency
/// series into the joined calendar. Rows before the first observation of any
/// series are dropped.
pub fn align(series: &[(&str, &DataSeries)], anchor: &str) -> Result<HistoricalTable> {
    let (dates, names, mut columns) = join_truncated(series, anchor)?;

    for column in &mut columns {
        let mut last = None;
        for cell in column.iter_mut() {
            match cell {
                Some(value) => last = Some(*value),
                None => *cell = last,
            }
        }
    }

    let table = build_table(dates, names, columns)?;
    debug!(
        "Aligned {} series into {} rows ending {:?}",
        series.len(),
        table.len(),
        table.last_date()
    );
    Ok(table)
}

/// Join already-computed columns without forward-filling: carrying a stale
/// estimate forward would fabricate data, so rows missing any column are
/// dropped instead.
pub fn combine(series: &[(&str, &DataSeries)], anchor: &str) -> Result<HistoricalTable> {
    let (dates, names, columns) = join_truncated(series, anchor)?;
    let table = build_table(dates, names, columns)?;
    debug!(
        "Combined {} series into {} rows ending {:?}",
        series.len(),
        table.len(),
        table.last_date()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(start_month: u32, values: &[f64]) -> DataSeries {
        DataSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (date(2024, start_month + i as u32, 1), *v))
                .collect(),
        )
    }

    #[test]
    fn forward_fill_bridges_a_quarterly_series_into_a_monthly_calendar() {
        let monthly_series = monthly(1, &[4.0, 4.1, 4.2, 4.3, 4.4, 4.5]);
        let quarterly = DataSeries::new(vec![
            (date(2024, 1, 1), 0.5),
            (date(2024, 4, 1), 0.7),
        ]);

        let table = align(
            &[("Unemployment", &monthly_series), ("RealRate", &quarterly)],
            "Unemployment",
        )
        .unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(
            table.column("RealRate").unwrap(),
            &[0.5, 0.5, 0.5, 0.7, 0.7, 0.7]
        );
    }

    #[test]
    fn table_never_extends_past_the_anchor() {
        let long = monthly(1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let anchor = monthly(1, &[10.0, 20.0, 30.0]);

        let table = align(&[("Long", &long), ("Anchor", &anchor)], "Anchor").unwrap();

        assert_eq!(table.last_date(), anchor.last_date());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn rows_before_the_first_observation_of_any_series_are_dropped() {
        let early = monthly(1, &[1.0, 2.0, 3.0, 4.0]);
        let late = monthly(3, &[30.0, 40.0]);

        let table = align(&[("Early", &early), ("Late", &late)], "Early").unwrap();

        assert_eq!(table.dates.first(), Some(&date(2024, 3, 1)));
        assert_eq!(table.column("Early").unwrap(), &[3.0, 4.0]);
        assert_eq!(table.column("Late").unwrap(), &[30.0, 40.0]);
    }

    #[test]
    fn unknown_anchor_is_an_error() {
        let series = monthly(1, &[1.0]);
        let result = align(&[("Only", &series)], "Missing");
        assert!(result.is_err());
    }

    #[test]
    fn disjoint_series_cannot_be_reconciled() {
        let a = DataSeries::new(vec![(date(2024, 1, 1), 1.0)]);
        let b = DataSeries::new(vec![(date(2024, 6, 1), 2.0)]);
        // Anchored on the earlier series, the later one never overlaps.
        let result = align(&[("A", &a), ("B", &b)], "A");
        assert!(result.is_err());
    }

    #[test]
    fn combine_drops_gaps_instead_of_filling_them() {
        let dense = monthly(1, &[1.0, 2.0, 3.0, 4.0]);
        let sparse = DataSeries::new(vec![
            (date(2024, 1, 1), 10.0),
            (date(2024, 3, 1), 30.0),
            (date(2024, 4, 1), 40.0),
        ]);

        let table = combine(&[("Dense", &dense), ("Sparse", &sparse)], "Dense").unwrap();

        // February is missing from the sparse column and must not be filled.
        assert_eq!(
            table.dates,
            vec![date(2024, 1, 1), date(2024, 3, 1), date(2024, 4, 1)]
        );
        assert_eq!(table.column("Sparse").unwrap(), &[10.0, 30.0, 40.0]);
    }

    #[test]
    fn rounded_applies_at_the_reporting_boundary() {
        let series = DataSeries::new(vec![(date(2024, 1, 1), 1.0 / 3.0)]);
        let table = align(&[("X", &series)], "X").unwrap().rounded(2);
        assert_eq!(table.column("X").unwrap(), &[0.33]);
    }

    #[test]
    fn column_series_round_trips_dates_and_values() {
        let series = monthly(1, &[1.5, 2.5]);
        let table = align(&[("X", &series)], "X").unwrap();
        let out = table.column_series("X").unwrap();
        assert_eq!(out.observations, series.observations);
    }
}
