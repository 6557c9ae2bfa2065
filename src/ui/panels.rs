use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::loader::DataSource;
use crate::data::model::Indicator;
use crate::state::{DashboardState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter dropdowns
// ---------------------------------------------------------------------------

/// Render the four filter dropdowns. Options come from the table's distinct
/// values; indicators from the fixed list.
pub fn side_panel(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state afterwards.
    let distinct = state.table().distinct().clone();

    let mut year = state.selection.year;
    ui.strong("Year");
    egui::ComboBox::from_id_salt("year")
        .width(180.0)
        .selected_text(year.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for y in &distinct.years {
                ui.selectable_value(&mut year, *y, y.to_string());
            }
        });
    ui.add_space(6.0);

    let mut race = state.selection.race_category.clone();
    ui.strong("Race / colour");
    egui::ComboBox::from_id_salt("race")
        .width(180.0)
        .selected_text(&race)
        .show_ui(ui, |ui: &mut Ui| {
            for r in &distinct.race_categories {
                ui.selectable_value(&mut race, r.clone(), r.as_str());
            }
        });
    ui.add_space(6.0);

    let mut region = state.selection.region.clone();
    ui.strong("Region");
    egui::ComboBox::from_id_salt("region")
        .width(180.0)
        .selected_text(&region)
        .show_ui(ui, |ui: &mut Ui| {
            for r in &distinct.regions {
                ui.selectable_value(&mut region, r.clone(), r.as_str());
            }
        });
    ui.add_space(6.0);

    let mut indicator = state.selection.indicator;
    ui.strong("Indicator");
    egui::ComboBox::from_id_salt("indicator")
        .width(180.0)
        .selected_text(indicator.label())
        .show_ui(ui, |ui: &mut Ui| {
            for i in Indicator::ALL {
                ui.selectable_value(&mut indicator, i, i.label());
            }
        });

    // Each setter re-renders only if its value changed.
    state.set_year(year);
    state.set_race(&race);
    state.set_region(&region);
    state.set_indicator(indicator);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Title plus a summary of what was loaded.
pub fn top_bar(ui: &mut Ui, state: &DashboardState) {
    ui.add_space(4.0);
    ui.heading(
        RichText::new("PNADC Dashboard – Indicators by Race and Locality")
            .color(Color32::from_rgb(46, 134, 171)),
    );
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Source: {}", state.source));
        if state.source == DataSource::Synthetic {
            ui.label(RichText::new("(example data)").color(Color32::from_rgb(230, 160, 40)));
        }
        ui.separator();
        ui.label(state.summary());
    });
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut DashboardState) {
    let mut tab = state.tab;
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut tab, Tab::States, "By state");
        ui.selectable_value(&mut tab, Tab::Regions, "By region");
    });
    state.set_tab(tab);
}
