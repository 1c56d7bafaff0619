use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Filtered rows, restricted to the display columns.
pub fn results_table(ui: &mut Ui, state: &AppState) {
    ui.label(format!("Showing {} results", state.view.len()));

    let columns = state.display_columns();
    if columns.is_empty() {
        ui.label("No data to display.");
        return;
    }

    let table = &state.table;
    let view = &state.view;

    ui.push_id("results_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(320.0)
            .columns(Column::auto().at_least(80.0).clip(true), columns.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for col in &columns {
                    header.col(|ui| {
                        ui.strong(*col);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, view.len(), |mut row| {
                    let record = &table.records[view.indices[row.index()]];
                    for col in &columns {
                        row.col(|ui| {
                            ui.label(record.display(col));
                        });
                    }
                });
            });
    });
}
