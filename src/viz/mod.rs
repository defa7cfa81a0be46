/// Visualization layer: turns table columns into plain figure descriptions.
///
/// Architecture:
/// ```text
///   Table ──► distribution / relationship / timeseries / missing
///                         │
///                         ▼
///                      Figure        (data only, no rendering state)
///                         │
///                         ▼
///                    ui::plot        (egui_plot drawing)
/// ```

pub mod distribution;
#[cfg(feature = "missing-matrix")]
pub mod missing;
pub mod relationship;
pub mod timeseries;

pub use distribution::DistributionFigure;
#[cfg(feature = "missing-matrix")]
pub use missing::MissingPatternFigure;
pub use relationship::{CorrelationFigure, GroupedBoxFigure, ScatterFigure};
pub use timeseries::TimeSeriesFigure;

/// One displayable plot.
#[derive(Debug, Clone)]
pub enum Figure {
    Distribution(DistributionFigure),
    Correlation(CorrelationFigure),
    Scatter(ScatterFigure),
    GroupedBoxplot(GroupedBoxFigure),
    TimeSeries(TimeSeriesFigure),
    #[cfg(feature = "missing-matrix")]
    MissingPattern(MissingPatternFigure),
}

impl Figure {
    pub fn title(&self) -> String {
        match self {
            Figure::Distribution(f) => format!("Histogram and boxplot of {}", f.column),
            Figure::Correlation(_) => "Correlation Heatmap".to_string(),
            Figure::Scatter(f) => format!("Scatter Plot of {} vs {}", f.x_column, f.y_column),
            Figure::GroupedBoxplot(f) => {
                format!("Boxplot of {} by {}", f.value_column, f.category_column)
            }
            Figure::TimeSeries(f) => format!("Time Series of {}", f.value_column),
            #[cfg(feature = "missing-matrix")]
            Figure::MissingPattern(_) => "Missing Data Pattern".to_string(),
        }
    }

    /// One-line description used when figures are not drawn on screen.
    pub fn summary(&self) -> String {
        match self {
            Figure::Distribution(f) => format!(
                "{} values in {} bins, median {:.4}",
                f.count,
                f.histogram.counts.len(),
                f.boxplot.median
            ),
            Figure::Correlation(f) => format!("{0}x{0} correlation matrix", f.columns.len()),
            Figure::Scatter(f) => format!(
                "{} points in {} series",
                f.series.iter().map(|s| s.points.len()).sum::<usize>(),
                f.series.len()
            ),
            Figure::GroupedBoxplot(f) => format!("{} groups", f.groups.len()),
            Figure::TimeSeries(f) => format!("{} points", f.points.len()),
            #[cfg(feature = "missing-matrix")]
            Figure::MissingPattern(f) => format!(
                "{} rows x {} columns, {} missing cells",
                f.rows,
                f.columns.len(),
                f.missing_cells
            ),
        }
    }
}
