use std::fmt::Write as _;

use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::data::model::{Table, Value};
use crate::error::{EdaError, Result};
use crate::stats::{self, BoxStats};

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation matrix (row-major, `columns.len()` square).
#[derive(Debug, Clone)]
pub struct CorrelationFigure {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

impl CorrelationFigure {
    /// Matrix formatted with two decimals, blank for undefined cells.
    pub fn render_text(&self) -> String {
        let width = self
            .columns
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(5);
        let mut out = format!("{:width$}", "");
        for name in &self.columns {
            let _ = write!(out, " {name:>width$}");
        }
        for (name, row) in self.columns.iter().zip(&self.matrix) {
            let _ = write!(out, "\n{name:width$}");
            for v in row {
                if v.is_nan() {
                    let _ = write!(out, " {:>width$}", "");
                } else {
                    let _ = write!(out, " {v:>width$.2}");
                }
            }
        }
        out
    }
}

/// Correlate every pair of `columns` over their pairwise-complete rows.
pub fn correlation_matrix(table: &Table, columns: &[String]) -> Result<CorrelationFigure> {
    if columns.is_empty() {
        return Err(EdaError::InsufficientData {
            subject: "correlation heatmap".to_string(),
            required: 1,
            actual: 0,
        });
    }
    let data: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| {
            let col = table.numeric_column(name)?;
            Ok(col.values.iter().map(Value::as_f64).collect())
        })
        .collect::<Result<_>>()?;

    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let r = stats::pearson_pairwise(&data[i], &data[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    Ok(CorrelationFigure {
        columns: columns.to_vec(),
        matrix,
    })
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScatterSeries {
    pub label: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone)]
pub struct ScatterFigure {
    pub x_column: String,
    pub y_column: String,
    pub hue_column: Option<String>,
    pub series: Vec<ScatterSeries>,
}

/// Scatter `y` against `x`, split into one coloured series per level of
/// `hue` when given. Rows missing either coordinate are dropped.
pub fn scatter(table: &Table, x: &str, y: &str, hue: Option<&str>) -> Result<ScatterFigure> {
    let xs = table.numeric_column(x)?;
    let ys = table.numeric_column(y)?;
    let hue_col = hue.map(|h| table.column(h)).transpose()?;

    let rows = xs
        .values
        .iter()
        .zip(&ys.values)
        .enumerate()
        .filter_map(|(row, (xv, yv))| Some((row, [xv.as_f64()?, yv.as_f64()?])));

    let series = match hue_col {
        None => vec![ScatterSeries {
            label: format!("{y} vs {x}"),
            color: Color32::LIGHT_BLUE,
            points: rows.map(|(_, p)| p).collect(),
        }],
        Some(col) => {
            let levels = col.levels();
            let colors = ColorMap::new(&levels);
            let mut series: Vec<ScatterSeries> = levels
                .iter()
                .map(|level| ScatterSeries {
                    label: level.to_string(),
                    color: colors.color_for(level),
                    points: Vec::new(),
                })
                .collect();
            let mut unassigned = Vec::new();
            for (row, point) in rows {
                let level = &col.values[row];
                match levels.iter().position(|l| l == level) {
                    Some(idx) => series[idx].points.push(point),
                    None => unassigned.push(point),
                }
            }
            if !unassigned.is_empty() {
                series.push(ScatterSeries {
                    label: format!("{} missing", col.name),
                    color: colors.color_for(&Value::Null),
                    points: unassigned,
                });
            }
            series
        }
    };

    Ok(ScatterFigure {
        x_column: x.to_string(),
        y_column: y.to_string(),
        hue_column: hue.map(str::to_string),
        series,
    })
}

// ---------------------------------------------------------------------------
// Grouped boxplot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GroupedBoxFigure {
    pub category_column: String,
    pub value_column: String,
    /// One entry per category level, in first-appearance order.
    pub groups: Vec<(String, BoxStats)>,
}

/// One box of `value` per level of `category`.
pub fn grouped_boxplot(table: &Table, category: &str, value: &str) -> Result<GroupedBoxFigure> {
    let cat = table.column(category)?;
    let val = table.numeric_column(value)?;

    let groups = cat
        .levels()
        .into_iter()
        .filter_map(|level| {
            let values: Vec<f64> = cat
                .values
                .iter()
                .zip(&val.values)
                .filter(|(c, _)| **c == level)
                .filter_map(|(_, v)| v.as_f64())
                .collect();
            stats::box_stats(&values).map(|b| (level.to_string(), b))
        })
        .collect();

    Ok(GroupedBoxFigure {
        category_column: category.to_string(),
        value_column: value.to_string(),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    fn table() -> Table {
        parse_str(
            "x,y,z,g\n\
             1,2,10,a\n\
             2,4,8,b\n\
             3,6,,a\n\
             4,8,4,\n\
             5,10,2,b\n",
        )
        .unwrap()
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let cols: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let fig = correlation_matrix(&table(), &cols).unwrap();
        for i in 0..3 {
            assert!((fig.matrix[i][i] - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(fig.matrix[i][j], fig.matrix[j][i]);
            }
        }
        assert!((fig.matrix[0][1] - 1.0).abs() < 1e-12);
        assert!((fig.matrix[0][2] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_text_has_two_decimals() {
        let cols = vec!["x".to_string(), "z".to_string()];
        let text = correlation_matrix(&table(), &cols).unwrap().render_text();
        assert!(text.contains("1.00"));
        assert!(text.contains("-1.00"));
    }

    #[test]
    fn correlation_rejects_unknown_column() {
        let cols = vec!["x".to_string(), "nope".to_string()];
        assert!(matches!(
            correlation_matrix(&table(), &cols),
            Err(EdaError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn scatter_without_hue_is_one_series() {
        let fig = scatter(&table(), "x", "z", None).unwrap();
        assert_eq!(fig.series.len(), 1);
        // Row with missing z is dropped.
        assert_eq!(fig.series[0].points.len(), 4);
    }

    #[test]
    fn scatter_with_hue_splits_levels() {
        let fig = scatter(&table(), "x", "y", Some("g")).unwrap();
        let labels: Vec<&str> = fig.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "g missing"]);
        assert_eq!(fig.series[0].points, vec![[1.0, 2.0], [3.0, 6.0]]);
        assert_eq!(fig.series[2].points, vec![[4.0, 8.0]]);
    }

    #[test]
    fn scatter_unknown_column_is_an_error_not_a_panic() {
        let err = scatter(&table(), "x", "absent", None).unwrap_err();
        assert!(matches!(err, EdaError::ColumnNotFound { ref column, .. } if column == "absent"));
        let err = scatter(&table(), "x", "y", Some("absent_hue")).unwrap_err();
        assert!(matches!(err, EdaError::ColumnNotFound { .. }));
    }

    #[test]
    fn grouped_boxplot_one_box_per_level() {
        let fig = grouped_boxplot(&table(), "g", "y").unwrap();
        let names: Vec<&str> = fig.groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(fig.groups[0].1.median, 4.0);
        assert_eq!(fig.groups[1].1.median, 7.0);
    }
}
