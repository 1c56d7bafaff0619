use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::color::{generate_palette, ColorScale};
use crate::data::stats::{HistogramBin, MapCount};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 240.0;
const TILE_SIZE: Vec2 = Vec2::new(64.0, 40.0);

// ---------------------------------------------------------------------------
// Country map
// ---------------------------------------------------------------------------

/// One tile per valid ISO alpha-3 code, shaded by author count.
pub fn country_map(ui: &mut Ui, state: &AppState) {
    ui.heading("Author Distribution by Country");

    if state.view.is_empty() {
        ui.label("No data to display.");
        return;
    }
    let map = &state.summary.map;
    let Some(scale) = ColorScale::spanning(map.iter().map(|m| m.count as f64)) else {
        ui.label("No valid country data to display on the map.");
        return;
    };

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for entry in map {
            country_tile(ui, entry, &scale);
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Number of Authors:");
        for (value, color) in scale.legend_entries(5) {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, color);
            ui.label(format!("{value:.0}"));
        }
    });
}

fn country_tile(ui: &mut Ui, entry: &MapCount, scale: &ColorScale) {
    let (rect, response) = ui.allocate_exact_size(TILE_SIZE, Sense::hover());
    let fill = scale.color_for(entry.count as f64);
    let text_color = if scale.fraction(entry.count as f64) > 0.6 {
        Color32::BLACK
    } else {
        Color32::WHITE
    };
    let painter = ui.painter();
    painter.rect_filled(rect, 4.0, fill);
    painter.text(
        rect.center() - Vec2::new(0.0, 7.0),
        Align2::CENTER_CENTER,
        &entry.code,
        FontId::proportional(13.0),
        text_color,
    );
    painter.text(
        rect.center() + Vec2::new(0.0, 9.0),
        Align2::CENTER_CENTER,
        entry.count.to_string(),
        FontId::proportional(11.0),
        text_color,
    );
    response.on_hover_text(format!("{}\n{} authors", entry.name, entry.count));
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Vertical bar chart over labelled categories; labels appear on the x axis
/// and on hover.
fn category_bars(ui: &mut Ui, id: &str, x_label: &str, y_label: &str, data: &[(String, f64)]) {
    let colors = generate_palette(data.len());
    let bars: Vec<Bar> = data
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((label, value), color))| {
            Bar::new(i as f64, *value).name(label).fill(color).width(0.7)
        })
        .collect();

    let labels: Vec<String> = data.iter().map(|(l, _)| short_label(l)).collect();
    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn short_label(label: &str) -> String {
    const MAX: usize = 18;
    if label.chars().count() <= MAX {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX - 1).collect();
        format!("{head}…")
    }
}

fn counts_as_f64(counts: &[(String, usize)]) -> Vec<(String, f64)> {
    counts.iter().map(|(l, c)| (l.clone(), *c as f64)).collect()
}

/// Most frequent institutions in the view.
pub fn institution_chart(ui: &mut Ui, state: &AppState) {
    let n = state.config.summary.chart_top_n;
    ui.heading("Top Institutions by Author Count");
    let data = &state.summary.institution_chart;
    if data.is_empty() {
        ui.label("No data to display.");
        return;
    }
    ui.label(format!("Top {n} Institutions by Author Count"));
    category_bars(ui, "institution_chart", "Institution", "Number of Authors", &counts_as_f64(data));
}

/// Authors per main field; skipped when the dataset has no field column.
pub fn field_chart(ui: &mut Ui, state: &AppState) {
    let Some(data) = &state.summary.field_counts else {
        return;
    };
    ui.heading("Authors by Field");
    if data.is_empty() {
        ui.label("No data to display.");
        return;
    }
    category_bars(ui, "field_chart", "Field", "Number of Authors", &counts_as_f64(data));
}

/// Mean subfield rank; skipped when the subfield columns are absent.
pub fn subfield_rank_chart(ui: &mut Ui, state: &AppState) {
    let Some(data) = &state.summary.subfield_mean_rank else {
        return;
    };
    ui.heading("Average Subfield Rank");
    if data.is_empty() {
        ui.label("No data to display.");
        return;
    }
    category_bars(ui, "subfield_rank_chart", "Subfield", "Mean Rank", data);
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Distribution of the overall rank; skipped when the rank column is absent.
pub fn rank_histogram(ui: &mut Ui, state: &AppState) {
    let Some(bins) = &state.summary.rank_histogram else {
        return;
    };
    ui.heading("Rank Distribution");
    if bins.is_empty() {
        ui.label("No data to display.");
        return;
    }

    let fill = ColorScale::new(0.0, 1.0).color_for(0.35);
    let bars: Vec<Bar> = bins.iter().map(|bin| histogram_bar(bin, fill)).collect();

    Plot::new("rank_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Rank")
        .y_axis_label("Number of Authors")
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn histogram_bar(bin: &HistogramBin, fill: Color32) -> Bar {
    Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
        .width(bin.end - bin.start)
        .name(format!("{:.0} – {:.0}", bin.start, bin.end))
        .fill(fill)
        .stroke(egui::Stroke::new(1.0, Color32::from_gray(30)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(short_label("MIT"), "MIT");
        let long = short_label("Massachusetts Institute of Technology");
        assert_eq!(long.chars().count(), 18);
        assert!(long.ends_with('…'));
    }
}
