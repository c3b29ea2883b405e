use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::DateRange;
use crate::state::AppState;

use super::charts::format_amount;

// ---------------------------------------------------------------------------
// Left side panel – date range selector
// ---------------------------------------------------------------------------

/// Render the left panel: the date range picker and the load summary.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Date range");
    ui.separator();

    let mut start = state.range.start;
    let mut end = state.range.end;

    egui::Grid::new("date_range")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("From");
            ui.add(
                DatePickerButton::new(&mut start)
                    .id_salt("start_date")
                    .format("%Y-%m-%d"),
            );
            ui.end_row();

            ui.label("To");
            ui.add(
                DatePickerButton::new(&mut end)
                    .id_salt("end_date")
                    .format("%Y-%m-%d"),
            );
            ui.end_row();
        });

    // Both bounds go to the pipeline together, once per change.
    let picked = DateRange::new(start, end);
    if picked != state.range {
        state.set_range(picked);
    }

    if start > end {
        ui.label(RichText::new("Start is after end: nothing to show.").color(Color32::YELLOW));
    }

    ui.add_space(4.0);
    if ui
        .add_enabled(state.range != state.default_range, egui::Button::new("Full range"))
        .clicked()
    {
        state.reset_range();
    }

    ui.add_space(12.0);
    ui.heading("Dataset");
    ui.separator();

    let report = state.load_report;
    egui::Grid::new("load_report")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Rows read");
            ui.label(report.total_rows.to_string());
            ui.end_row();
            ui.label("Bad dates");
            ui.label(report.invalid_dates.to_string());
            ui.end_row();
            ui.label("Bad amounts");
            ui.label(report.invalid_amounts.to_string());
            ui.end_row();
            ui.label("Orders kept");
            ui.label(RichText::new(report.kept_rows.to_string()).strong());
            ui.end_row();
            ui.label("First day");
            ui.label(state.default_range.start.to_string());
            ui.end_row();
            ui.label("Last day");
            ui.label(state.default_range.end.to_string());
            ui.end_row();
        });

    if let Some(charts) = &state.charts {
        ui.add_space(12.0);
        let total: f64 = charts
            .trend
            .ready()
            .map(|trend| trend.iter().map(|p| p.amount).sum())
            .unwrap_or(0.0);
        ui.label(format!("{} orders in range", charts.matched_orders));
        ui.label(format!("Total: {}", format_amount(total)));
    }
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
        });

        ui.separator();

        let file = state
            .source
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| state.source.display().to_string());
        ui.label(format!("{file}: {} orders", state.dataset.len()));

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
        .set_title("Open sales report")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path, chrono::Local::now().date_naive());
    }
}
