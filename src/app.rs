use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: date range ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the four charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Amazon Sale Report");
            });
            ui.add_space(6.0);

            let set = self.state.charts();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    charts::trend_chart(ui, &set.trend, 260.0);
                    ui.add_space(6.0);
                    ui.columns(2, |cols| {
                        charts::city_chart(&mut cols[0], &set.city_ranking, 280.0);
                        charts::status_chart(&mut cols[1], &set.status_distribution, 280.0);
                    });
                    ui.add_space(6.0);
                    charts::map_chart(ui, &set.geo_points, 420.0);
                });
        });
    }
}
