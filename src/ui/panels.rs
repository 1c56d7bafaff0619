use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::loader::DataSource;
use crate::state::AppState;

const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the selectors.  Each change recomputes the view immediately.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.table.is_empty() {
        ui.label("No data loaded.");
        return;
    }

    // ---- Country ----
    ui.strong("Select Country");
    let mut country = state.selection.country.clone();
    egui::ComboBox::from_id_salt("country")
        .selected_text(state.country_label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut country, None, ALL);
            for option in &state.country_options {
                ui.selectable_value(&mut country, Some(option.code.clone()), option.label.as_str());
            }
        });
    state.set_country(country);
    ui.add_space(6.0);

    // ---- Institution: options follow the country choice ----
    ui.strong("Select Institution");
    let mut institution = state.selection.institution.clone();
    egui::ComboBox::from_id_salt("institution")
        .selected_text(institution.as_deref().unwrap_or(ALL))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut institution, None, ALL);
            for name in &state.view.institution_options {
                ui.selectable_value(&mut institution, Some(name.clone()), name.as_str());
            }
        });
    state.set_institution(institution);
    ui.add_space(6.0);

    // ---- Author ----
    ui.strong("Search by Author Name (Partial or Full)");
    let mut query = state.selection.author_query.clone();
    ui.add(egui::TextEdit::singleline(&mut query).hint_text("e.g. smith"));
    state.set_author_query(&query);

    ui.add_space(6.0);
    if ui.button("Clear filters").clicked() {
        state.set_country(None);
        state.set_institution(None);
        state.set_author_query("");
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Distinct counts plus the top-N rankings.
pub fn statistics(ui: &mut Ui, state: &AppState) {
    let s = &state.summary;
    ui.heading("Statistics");
    ui.label(RichText::new(format!("Number of Authors: {}", s.distinct.authors)).strong());
    ui.label(RichText::new(format!("Number of Institutions: {}", s.distinct.institutions)).strong());
    ui.label(RichText::new(format!("Number of Countries: {}", s.distinct.countries)).strong());

    if s.rows == 0 {
        return;
    }

    ui.add_space(4.0);
    ui.columns(2, |cols| {
        cols[0].strong(format!("Top {} countries", state.config.summary.top_n));
        for (code, count) in &s.top_countries {
            cols[0].label(format!("{}  {count}", state.resolver.option_label(code)));
        }
        cols[1].strong(format!("Top {} institutions", state.config.summary.top_n));
        for (name, count) in &s.top_institutions {
            cols[1].label(format!("{name}  {count}"));
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                let source = state.source().clone();
                state.restart_session(source);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} authors loaded, showing {}",
            state.table.len(),
            state.view.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open author table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.restart_session(DataSource::File(path));
    }
}
