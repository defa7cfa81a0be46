use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::data::model::{Table, Value};
use crate::error::{EdaError, Result};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

/// Value column plotted against a chronologically sorted date axis.
#[derive(Debug, Clone)]
pub struct TimeSeriesFigure {
    pub date_column: String,
    pub value_column: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl TimeSeriesFigure {
    /// Points with the date as fractional days since the Unix epoch.
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .map(|(dt, v)| [to_epoch_days(dt), *v])
            .collect()
    }
}

pub fn to_epoch_days(dt: &NaiveDateTime) -> f64 {
    dt.and_utc().timestamp_millis() as f64 / 86_400_000.0
}

pub fn from_epoch_days(days: f64) -> Option<NaiveDateTime> {
    let millis = (days * 86_400_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

/// Parse one date cell using the accepted formats.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Row order that sorts `dates` ascending; equal dates keep their
/// original relative order.
pub fn chronological_order(dates: &[NaiveDateTime]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&i| dates[i]);
    order
}

/// Parse `date_col`, sort rows by it and pair each with `value_col`.
///
/// The table itself is never reordered.
pub fn time_series(table: &Table, date_col: &str, value_col: &str) -> Result<TimeSeriesFigure> {
    let dates = table.column(date_col)?;
    let values = table.numeric_column(value_col)?;

    let mut parsed = Vec::with_capacity(dates.len());
    let mut series = Vec::with_capacity(dates.len());
    let mut dropped = 0usize;
    for (row, (date, value)) in dates.values.iter().zip(&values.values).enumerate() {
        if date.is_null() {
            dropped += 1;
            continue;
        }
        let text = match date {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        };
        let dt = parse_date(&text).ok_or_else(|| EdaError::DateParse {
            column: date_col.to_string(),
            row,
            value: text.clone(),
        })?;
        match value.as_f64() {
            Some(v) => {
                parsed.push(dt);
                series.push((dt, v));
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("time series: dropped {dropped} rows with a missing date or value");
    }

    let points = chronological_order(&parsed)
        .into_iter()
        .map(|i| series[i])
        .collect();

    Ok(TimeSeriesFigure {
        date_column: date_col.to_string(),
        value_column: value_col.to_string(),
        points,
    })
}
