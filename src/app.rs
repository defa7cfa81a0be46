use eframe::egui;

use crate::pipeline::Pipeline;
use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// One window for the whole run. Each figure stays up until it is
/// acknowledged (Next button, Right arrow, or closing the window); the
/// window only really closes after the last figure.
pub struct EdaApp {
    pub pipeline: Pipeline,
    pub state: ViewerState,
}

impl EdaApp {
    pub fn new(pipeline: Pipeline, state: ViewerState) -> Self {
        Self { pipeline, state }
    }

    fn advance(&mut self, ctx: &egui::Context) {
        if !self.state.acknowledge(&mut self.pipeline) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for EdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Closing the window acknowledges the figure ----
        if ctx.input(|i| i.viewport().close_requested())
            && self.state.acknowledge(&mut self.pipeline)
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }

        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.advance(ctx);
        }

        // ---- Top panel: title and navigation ----
        let mut next_clicked = false;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            next_clicked = panels::top_bar(ui, &self.state);
        });
        if next_clicked {
            self.advance(ctx);
        }

        // ---- Left side panel: dataset overview ----
        egui::SidePanel::left("dataset_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.pipeline);
            });

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_plot(ui, &mut self.state);
        });
    }
}
