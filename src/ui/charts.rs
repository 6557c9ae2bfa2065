use eframe::egui::{self, Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Polygon, Text,
    uniform_grid_spacer,
};

use super::{format_value, geo};
use crate::color::{ColorMap, ContinuousScale, gradient};
use crate::data::aggregate::series_by_region;
use crate::state::DashboardState;

const BAR_COLOR: Color32 = Color32::from_rgb(46, 134, 171);
const NO_VALUE_COLOR: Color32 = Color32::from_gray(90);

// ---------------------------------------------------------------------------
// State tab
// ---------------------------------------------------------------------------

/// Tile choropleth of every state in the year + race selection.
pub fn state_map(ui: &mut Ui, state: &DashboardState, height: f32) {
    let sel = &state.selection;
    ui.strong(format!(
        "{} by state ({}) – {}",
        sel.indicator.label(),
        sel.year,
        sel.race_category
    ));

    let cells = &state.views.map;
    if cells.is_empty() {
        no_data(ui, height);
        return;
    }

    let scale = ContinuousScale::from_values(cells.iter().filter_map(|c| c.value));
    let unplaced = cells
        .iter()
        .filter(|c| geo::tile_position(&c.locality_code).is_none())
        .count();

    Plot::new("state_map")
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for cell in cells {
                let Some(centre) = geo::tile_position(&cell.locality_code) else {
                    continue;
                };
                let fill = match (cell.value, scale) {
                    (Some(v), Some(s)) => s.color_for(v),
                    _ => NO_VALUE_COLOR,
                };

                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(geo::tile_corners(centre)))
                        .fill_color(fill)
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .name(format!("{}: {}", cell.locality, format_value(cell.value))),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(centre[0], centre[1]),
                        RichText::new(&cell.locality_code).strong(),
                    )
                    .color(Color32::WHITE)
                    .anchor(Align2::CENTER_CENTER),
                );
            }
        });

    if let Some(scale) = scale {
        scale_legend(ui, scale);
    }
    if unplaced > 0 {
        ui.weak(format!("{unplaced} localities have no map position"));
    }
}

/// One bar per state of the selected region.
pub fn state_bars(ui: &mut Ui, state: &DashboardState, height: f32) {
    let sel = &state.selection;
    ui.strong(format!(
        "{} – states of {}",
        sel.indicator.label(),
        sel.region
    ));

    let bars = &state.views.state_bars;
    if bars.is_empty() {
        no_data(ui, height);
        return;
    }

    let labels: Vec<String> = bars.iter().map(|b| b.locality.clone()).collect();
    let values: Vec<Option<f64>> = bars.iter().map(|b| b.value).collect();
    labelled_bars(ui, "state_bars", height, labels, &values, |_| BAR_COLOR);
    ui.label(RichText::new(state.region_rows_note()).weak().small());
}

// ---------------------------------------------------------------------------
// Region tab
// ---------------------------------------------------------------------------

/// Mean per region for the year + race selection.
pub fn region_bars(ui: &mut Ui, state: &DashboardState, colors: &ColorMap, height: f32) {
    ui.strong(format!(
        "{} – mean by region ({})",
        state.selection.indicator.label(),
        state.selection.year
    ));

    let means = &state.views.region_means;
    if means.is_empty() {
        no_data(ui, height);
        return;
    }

    let labels: Vec<String> = means.iter().map(|m| m.region.clone()).collect();
    let values: Vec<Option<f64>> = means.iter().map(|m| Some(m.mean)).collect();
    labelled_bars(ui, "region_bars", height, labels.clone(), &values, |i| {
        colors.color_for(&labels[i])
    });
}

/// Yearly mean per region for the race selection.
pub fn region_lines(ui: &mut Ui, state: &DashboardState, colors: &ColorMap, height: f32) {
    ui.strong(format!(
        "{} over time by region ({})",
        state.selection.indicator.label(),
        state.selection.race_category
    ));

    if state.views.series.is_empty() {
        no_data(ui, height);
        return;
    }

    Plot::new("region_lines")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(state.selection.indicator.label())
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(|mark: GridMark, _range| format!("{:.0}", mark.value))
        .show(ui, |plot_ui| {
            for (region, points) in series_by_region(&state.views.series) {
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .name(region)
                        .color(colors.color_for(region))
                        .width(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Categorical bar chart with a value label above each bar. Missing values
/// keep their slot on the axis but draw no bar.
fn labelled_bars(
    ui: &mut Ui,
    id: &str,
    height: f32,
    labels: Vec<String>,
    values: &[Option<f64>],
    color_of: impl Fn(usize) -> Color32,
) {
    let bars: Vec<Bar> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let v = (*v)?;
            Some(
                Bar::new(i as f64, v)
                    .name(&labels[i])
                    .fill(color_of(i))
                    .width(0.6),
            )
        })
        .collect();

    Plot::new(id)
        .height(height)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark: GridMark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, v) in values.iter().enumerate() {
                if let Some(v) = v {
                    plot_ui.text(
                        Text::new(PlotPoint::new(i as f64, *v), format_value(Some(*v)))
                            .anchor(Align2::CENTER_BOTTOM),
                    );
                }
            }
        });
}

/// Horizontal colour ramp with the scale's bounds.
fn scale_legend(ui: &mut Ui, scale: ContinuousScale) {
    const STEPS: usize = 32;
    ui.horizontal(|ui| {
        ui.label(format_value(Some(scale.min)));
        let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 12.0), egui::Sense::hover());
        let step = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let t = i as f32 / (STEPS - 1) as f32;
            let swatch = egui::Rect::from_min_size(
                rect.min + egui::vec2(i as f32 * step, 0.0),
                egui::vec2(step + 0.5, rect.height()),
            );
            ui.painter().rect_filled(swatch, 0.0, gradient(t));
        }
        ui.label(format_value(Some(scale.max)));
    });
}

fn no_data(ui: &mut Ui, height: f32) {
    ui.add_sized(
        [ui.available_width(), height],
        egui::Label::new(RichText::new("No data for this selection").weak()),
    );
}
