use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::color::{annotation_color, diverging};
use crate::state::ViewerState;
use crate::stats::BoxStats;
use crate::viz::timeseries::from_epoch_days;
use crate::viz::{
    CorrelationFigure, DistributionFigure, Figure, GroupedBoxFigure, ScatterFigure,
    TimeSeriesFigure,
};

const BAR_FILL: Color32 = Color32::from_rgb(100, 149, 237);
const DENSITY_LINE: Color32 = Color32::from_rgb(25, 25, 112);
const BOX_FILL: Color32 = Color32::from_rgb(144, 202, 249);

// ---------------------------------------------------------------------------
// Figure dispatch (central panel)
// ---------------------------------------------------------------------------

/// Render the current figure in the central panel.
pub fn figure_plot(ui: &mut Ui, state: &mut ViewerState) {
    let step = state.step;
    let figure = match &state.figure {
        Some(f) => f,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("All figures shown.");
            });
            return;
        }
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(figure.title());
    });

    match figure {
        Figure::Distribution(f) => distribution_plot(ui, step, f),
        Figure::Correlation(f) => heatmap_plot(ui, step, f),
        Figure::Scatter(f) => scatter_plot(ui, step, f),
        Figure::GroupedBoxplot(f) => grouped_box_plot(ui, step, f),
        Figure::TimeSeries(f) => time_series_plot(ui, step, f),
        #[cfg(feature = "missing-matrix")]
        Figure::MissingPattern(f) => {
            missing_plot(ui, step, f, &mut state.missing_texture);
        }
    }
}

/// Text for an integer tick `mark` naming `labels[index]`, blank elsewhere.
fn category_tick(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn box_elem(position: f64, stats: &BoxStats, name: &str) -> BoxElem {
    BoxElem::new(
        position,
        BoxSpread::new(
            stats.lower_whisker,
            stats.q1,
            stats.median,
            stats.q3,
            stats.upper_whisker,
        ),
    )
    .name(name)
    .box_width(0.5)
    .whisker_width(0.3)
    .fill(BOX_FILL)
    .stroke(Stroke::new(1.5, DENSITY_LINE))
}

// ---------------------------------------------------------------------------
// Histogram + density, boxplot underneath
// ---------------------------------------------------------------------------

fn distribution_plot(ui: &mut Ui, step: usize, fig: &DistributionFigure) {
    let hist = &fig.histogram;
    let width = hist.bin_width();
    let (lo, hi) = match (hist.edges.first(), hist.edges.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return,
    };

    let bars: Vec<Bar> = hist
        .edges
        .windows(2)
        .zip(&hist.counts)
        .map(|(edge, &count)| Bar::new((edge[0] + edge[1]) / 2.0, count as f64).width(width))
        .collect();

    let hist_height = ui.available_height() * 0.7;
    Plot::new(("histogram", step))
        .height(hist_height)
        .legend(Legend::default())
        .y_axis_label("Count")
        .include_x(lo)
        .include_x(hi)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(&fig.column)
                    .color(BAR_FILL)
                    .element_formatter(Box::new(|bar, _| format!("{:.0}", bar.value))),
            );
            if let Some(kde) = &fig.kde {
                plot_ui.line(
                    Line::new(PlotPoints::from(kde.clone()))
                        .name("density")
                        .color(DENSITY_LINE)
                        .width(2.0),
                );
            }
        });

    let b = &fig.boxplot;
    Plot::new(("boxplot", step))
        .height(ui.available_height())
        .x_axis_label(&fig.column)
        .show_y(false)
        .y_axis_formatter(|_, _| String::new())
        .include_x(lo)
        .include_x(hi)
        .include_y(-0.6)
        .include_y(0.6)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![box_elem(0.0, b, &fig.column)]).horizontal());
            if !b.fliers.is_empty() {
                let fliers: Vec<[f64; 2]> = b.fliers.iter().map(|&v| [v, 0.0]).collect();
                plot_ui.points(
                    Points::new(PlotPoints::from(fliers))
                        .name("outliers")
                        .radius(3.0)
                        .color(DENSITY_LINE),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn heatmap_plot(ui: &mut Ui, step: usize, fig: &CorrelationFigure) {
    let x_labels = fig.columns.clone();
    let y_labels = fig.columns.clone();

    // Row i is drawn at y = -i so the first column sits at the top.
    Plot::new(("heatmap", step))
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _: &RangeInclusive<f64>| {
            category_tick(&x_labels, mark.value)
        })
        .y_axis_formatter(move |mark: GridMark, _: &RangeInclusive<f64>| {
            category_tick(&y_labels, -mark.value)
        })
        .show(ui, |plot_ui| {
            for (i, row) in fig.matrix.iter().enumerate() {
                for (j, &r) in row.iter().enumerate() {
                    let (x, y) = (j as f64, -(i as f64));
                    let cell = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(cell))
                            .fill_color(diverging(r))
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    if !r.is_nan() {
                        plot_ui.text(Text::new(
                            PlotPoint::new(x, y),
                            RichText::new(format!("{r:.2}")).color(annotation_color(r)),
                        ));
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter_plot(ui: &mut Ui, step: usize, fig: &ScatterFigure) {
    let mut plot = Plot::new(("scatter", step))
        .x_axis_label(&fig.x_column)
        .y_axis_label(&fig.y_column);
    if fig.hue_column.is_some() {
        plot = plot.legend(Legend::default());
    }
    plot.show(ui, |plot_ui| {
        for series in &fig.series {
            plot_ui.points(
                Points::new(PlotPoints::from(series.points.clone()))
                    .name(&series.label)
                    .color(series.color)
                    .radius(3.0),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Grouped boxplot
// ---------------------------------------------------------------------------

fn grouped_box_plot(ui: &mut Ui, step: usize, fig: &GroupedBoxFigure) {
    let labels: Vec<String> = fig.groups.iter().map(|(label, _)| label.clone()).collect();
    let boxes: Vec<BoxElem> = fig
        .groups
        .iter()
        .enumerate()
        .map(|(i, (label, stats))| box_elem(i as f64, stats, label))
        .collect();
    let fliers: Vec<[f64; 2]> = fig
        .groups
        .iter()
        .enumerate()
        .flat_map(|(i, (_, stats))| stats.fliers.iter().map(move |&v| [i as f64, v]))
        .collect();

    Plot::new(("grouped_box", step))
        .x_axis_label(&fig.category_column)
        .y_axis_label(&fig.value_column)
        .x_axis_formatter(move |mark: GridMark, _: &RangeInclusive<f64>| {
            category_tick(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes));
            if !fliers.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::from(fliers))
                        .radius(3.0)
                        .color(DENSITY_LINE),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

fn time_series_plot(ui: &mut Ui, step: usize, fig: &TimeSeriesFigure) {
    let points = fig.plot_points();
    Plot::new(("time_series", step))
        .x_axis_label(&fig.date_column)
        .y_axis_label(&fig.value_column)
        .x_axis_formatter(|mark: GridMark, _: &RangeInclusive<f64>| {
            from_epoch_days(mark.value)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(|_, point| {
            let date = from_epoch_days(point.x)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            format!("{date}\n{:.4}", point.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name(&fig.value_column)
                    .color(DENSITY_LINE)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(2.5)
                    .color(BAR_FILL),
            );
        });
}

// ---------------------------------------------------------------------------
// Missing-value matrix
// ---------------------------------------------------------------------------

#[cfg(feature = "missing-matrix")]
fn missing_plot(
    ui: &mut Ui,
    step: usize,
    fig: &crate::viz::MissingPatternFigure,
    texture: &mut Option<egui::TextureHandle>,
) {
    let handle = texture.get_or_insert_with(|| {
        let size = [fig.image.width() as usize, fig.image.height() as usize];
        let pixels = egui::ColorImage::from_rgba_unmultiplied(size, fig.image.as_raw());
        ui.ctx()
            .load_texture("missing_pattern", pixels, egui::TextureOptions::NEAREST)
    });

    let cols = fig.columns.len() as f64;
    let rows = fig.rows as f64;
    let labels = fig.columns.clone();

    ui.label(format!(
        "{} missing cells out of {}",
        fig.missing_cells,
        fig.rows * fig.columns.len()
    ));

    // Strip j spans x in [j, j + 1]; record r sits at y = -r.
    Plot::new(("missing", step))
        .show_grid(false)
        .x_axis_formatter(move |mark: GridMark, _: &RangeInclusive<f64>| {
            category_tick(&labels, mark.value - 0.5)
        })
        .y_axis_formatter(|mark: GridMark, _: &RangeInclusive<f64>| {
            if mark.value <= 0.0 {
                format!("{:.0}", -mark.value)
            } else {
                String::new()
            }
        })
        .include_x(0.0)
        .include_x(cols)
        .include_y(0.0)
        .include_y(-rows)
        .show(ui, |plot_ui| {
            plot_ui.image(egui_plot::PlotImage::new(
                handle.id(),
                PlotPoint::new(cols / 2.0, -rows / 2.0),
                egui::vec2(cols as f32, rows as f32),
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ticks_only_on_integers() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_tick(&labels, 0.0), "a");
        assert_eq!(category_tick(&labels, 1.0), "b");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, 2.0), "");
        assert_eq!(category_tick(&labels, -1.0), "");
    }
}
