use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use super::format_value;
use crate::state::DashboardState;

/// Striped table of the year + race rows behind the map.
pub fn observation_table(ui: &mut Ui, state: &DashboardState) {
    let rows = state.table().rows();
    let indices = &state.views.year_race_rows;
    if indices.is_empty() {
        ui.label("No rows for this selection.");
        return;
    }
    let indicator = state.selection.indicator;

    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(220.0)
        .column(Column::auto().at_least(150.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(110.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["State", "Code", "Region", indicator.label()] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, indices.len(), |mut row| {
                let obs = &rows[indices[row.index()]];
                row.col(|ui| {
                    ui.label(obs.locality.as_str());
                });
                row.col(|ui| {
                    ui.label(obs.locality_code.as_deref().unwrap_or("–"));
                });
                row.col(|ui| {
                    ui.label(obs.region.as_str());
                });
                row.col(|ui| {
                    ui.label(format_value(obs.value(indicator)));
                });
            });
        });
}
