use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AuthorExplorerApp {
    pub state: AppState,
}

impl AuthorExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for AuthorExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: statistics, results, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading("Author Career and Publications Search");
                    ui.separator();
                    let state = &self.state;
                    panels::statistics(ui, state);
                    ui.separator();
                    table::results_table(ui, state);
                    ui.separator();
                    plot::country_map(ui, state);
                    ui.separator();
                    plot::institution_chart(ui, state);
                    plot::field_chart(ui, state);
                    plot::subfield_rank_chart(ui, state);
                    plot::rank_histogram(ui, state);
                });
        });
    }
}
