use crate::data::model::Table;
use crate::error::{EdaError, Result};
use crate::stats::{self, BoxStats, Histogram, KDE_GRID_SIZE};

/// Histogram-with-density and boxplot of one numerical column.
#[derive(Debug, Clone)]
pub struct DistributionFigure {
    pub column: String,
    /// Non-null values plotted.
    pub count: usize,
    pub histogram: Histogram,
    /// Density curve scaled to histogram counts (`None` when the column has
    /// fewer than two distinct values).
    pub kde: Option<Vec<[f64; 2]>>,
    pub boxplot: BoxStats,
}

/// Build the distribution figure for `column`, ignoring missing values.
pub fn distribution(table: &Table, column: &str) -> Result<DistributionFigure> {
    let values = table.numeric_column(column)?.numeric_values();
    let insufficient = || EdaError::InsufficientData {
        subject: format!("column '{column}'"),
        required: 1,
        actual: 0,
    };
    let histogram = stats::histogram(&values).ok_or_else(insufficient)?;
    let boxplot = stats::box_stats(&values).ok_or_else(insufficient)?;

    let scale = values.len() as f64 * histogram.bin_width();
    let kde = stats::kde(&values, KDE_GRID_SIZE)
        .map(|curve| curve.into_iter().map(|[x, d]| [x, d * scale]).collect());

    Ok(DistributionFigure {
        column: column.to_string(),
        count: values.len(),
        histogram,
        kde,
        boxplot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    #[test]
    fn distribution_excludes_missing() {
        let table = parse_str("v\n1\n2\n\n3\n4\nNA\n5\n").unwrap();
        let fig = distribution(&table, "v").unwrap();
        assert_eq!(fig.count, 5);
        assert_eq!(fig.histogram.counts.iter().sum::<usize>(), 5);
        assert_eq!(fig.boxplot.median, 3.0);
        assert!(fig.kde.is_some());
    }

    #[test]
    fn kde_is_scaled_to_counts() {
        let csv: String = std::iter::once("v".to_string())
            .chain((0..200).map(|i| ((i * 37) % 101).to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let table = parse_str(&csv).unwrap();
        let fig = distribution(&table, "v").unwrap();
        let peak_kde = fig
            .kde
            .unwrap()
            .iter()
            .map(|p| p[1])
            .fold(0.0, f64::max);
        let peak_bar = *fig.histogram.counts.iter().max().unwrap() as f64;
        // Same order of magnitude as the bars it overlays.
        assert!(peak_kde > peak_bar * 0.3 && peak_kde < peak_bar * 3.0);
    }

    #[test]
    fn all_missing_column_is_insufficient() {
        let table = parse_str("a,b\n1,\n2,\n").unwrap();
        assert!(matches!(
            distribution(&table, "b"),
            Err(EdaError::InsufficientData { .. })
        ));
    }

    #[test]
    fn text_column_is_rejected() {
        let table = parse_str("t\nx\ny\n").unwrap();
        assert!(matches!(
            distribution(&table, "t"),
            Err(EdaError::WrongColumnType { .. })
        ));
    }
}
