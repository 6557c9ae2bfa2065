use eframe::egui;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::loader::LoadedData;
use crate::state::{DashboardState, Tab};
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: DashboardState,
    /// Region colours, fixed for the session.
    pub region_colors: ColorMap,
}

impl DashboardApp {
    pub fn new(loaded: LoadedData, config: &DashboardConfig) -> Self {
        let region_colors = ColorMap::new(&loaded.table.distinct().regions);
        Self {
            state: DashboardState::new(loaded, config),
            region_colors,
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and data summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::tab_bar(ui, &mut self.state);
            ui.separator();

            let half = (ui.available_width() - ui.spacing().item_spacing.x) / 2.0;
            let height = (ui.available_height() * 0.62).max(240.0);
            ui.horizontal(|ui| match self.state.tab {
                Tab::States => {
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        charts::state_map(ui, &self.state, height);
                    });
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        charts::state_bars(ui, &self.state, height);
                    });
                }
                Tab::Regions => {
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        charts::region_bars(ui, &self.state, &self.region_colors, height);
                    });
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        charts::region_lines(ui, &self.state, &self.region_colors, height);
                    });
                }
            });

            ui.separator();
            egui::CollapsingHeader::new("Data")
                .default_open(false)
                .show(ui, |ui| table::observation_table(ui, &self.state));
        });
    }
}
