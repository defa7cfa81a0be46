use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::pipeline::Pipeline;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – dataset overview
// ---------------------------------------------------------------------------

/// Render the dataset overview: shape, per-column dtype and missing
/// counts, and the group comparison once it has run.
pub fn side_panel(ui: &mut Ui, pipeline: &Pipeline) {
    let table = pipeline.table();

    ui.heading("Dataset");
    ui.label(format!(
        "{} rows × {} columns",
        table.row_count(),
        table.column_count()
    ));
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height(ui.available_height() * 0.6)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(TableColumn::remainder().at_least(80.0))
                .column(TableColumn::auto())
                .column(TableColumn::auto())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Column");
                    });
                    header.col(|ui| {
                        ui.strong("dtype");
                    });
                    header.col(|ui| {
                        ui.strong("Missing");
                    });
                })
                .body(|mut body| {
                    for column in table.columns() {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(&column.name);
                            });
                            row.col(|ui| {
                                ui.label(column.dtype.to_string());
                            });
                            row.col(|ui| {
                                let nulls = column.null_count();
                                let text = RichText::new(nulls.to_string());
                                ui.label(if nulls > 0 {
                                    text.color(Color32::from_rgb(200, 120, 0))
                                } else {
                                    text
                                });
                            });
                        });
                    }
                });
        });

    if let Some(profile) = pipeline.profile() {
        ui.label(format!("dtypes: {}", profile.dtype_summary()));
    }

    ui.separator();
    let partition = pipeline.partition();
    ui.strong("Categorical");
    ui.label(partition.categorical.join(", "));
    ui.strong("Numerical");
    ui.label(partition.numerical.join(", "));

    if let Some(cmp) = pipeline.comparison() {
        ui.separator();
        ui.strong(format!(
            "t-test: {} by {} ({} vs {})",
            cmp.value, cmp.category, cmp.groups[0], cmp.groups[1]
        ));
        egui::Grid::new("t_test").num_columns(2).show(ui, |ui: &mut Ui| {
            ui.label("t-statistic");
            ui.label(format!("{:.4}", cmp.result.statistic));
            ui.end_row();
            ui.label("p-value");
            ui.label(format!("{:.4}", cmp.result.p_value));
            ui.end_row();
            ui.label("df");
            ui.label(format!("{:.0}", cmp.result.df));
            ui.end_row();
        });
    }

    ui.separator();
    ui.label(format!(
        "{} figure(s) so far, next step: {}",
        pipeline.figures_emitted(),
        pipeline.stage()
    ));

    if !pipeline.failures().is_empty() {
        ui.separator();
        ui.strong("Skipped steps");
        for (stage, msg) in pipeline.failures() {
            ui.label(RichText::new(format!("[{stage}] {msg}")).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the toolbar. Returns `true` when the figure was acknowledged.
pub fn top_bar(ui: &mut Ui, state: &ViewerState) -> bool {
    let mut next = false;
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(format!("Figure {}", state.step));
        ui.separator();

        let label = if state.finished { "Close" } else { "Next ▶" };
        if ui.button(label).clicked() {
            next = true;
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
    next
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask for a dataset when none was given on the command line.
pub fn pick_dataset() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("CSV", &["csv", "txt"])
        .pick_file()
}
