use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{panels, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("🛵 Delivery efficiency dashboard");
            ui.label("Delivery times broken down by weather, traffic and vehicle.");

            ui.horizontal(|ui: &mut Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.title());
                }
            });
            ui.separator();

            // A rejected range stops this frame's charts; the warning sits in
            // the filter panel.
            if self.state.dashboard.is_err() {
                ui.label(
                    RichText::new("Charts are paused until the distance range is fixed.")
                        .color(Color32::YELLOW),
                );
                return;
            }

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| match self.state.tab {
                    Tab::Overview => {
                        if let Ok(dash) = &self.state.dashboard {
                            tabs::overview_tab(ui, &self.state, dash);
                        }
                    }
                    Tab::Fleet => tabs::fleet_tab(ui, &mut self.state),
                    Tab::Routes => tabs::routes_tab(ui, &mut self.state),
                });
        });
    }
}
