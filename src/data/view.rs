use super::aggregate::{RegionMean, SeriesPoint, region_means, region_year_series};
use super::filter::{
    MapCell, Selection, StateBar, map_cells, state_bars, year_race, year_race_indices,
    year_race_region,
};
use super::model::Table;

/// Everything the charts need for one selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewBundle {
    /// Choropleth over all regions (year + race).
    pub map: Vec<MapCell>,
    /// Bars for the states of the selected region.
    pub state_bars: Vec<StateBar>,
    /// Mean per region (year + race).
    pub region_means: Vec<RegionMean>,
    /// Mean per (year, region) for the race, all years.
    pub series: Vec<SeriesPoint>,
    /// Indices into `Table::rows()` of the year + race set.
    pub year_race_rows: Vec<usize>,
    /// Number of rows in the year + race + region set.
    pub region_row_count: usize,
}

impl ViewBundle {
    /// True when no chart has anything to draw.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
            && self.state_bars.is_empty()
            && self.region_means.is_empty()
            && self.series.is_empty()
    }
}

/// Compute all views for `selection`. Pure: the same table and selection
/// always give the same bundle.
pub fn render(table: &Table, selection: &Selection) -> ViewBundle {
    let indicator = selection.indicator;
    let by_year_race = year_race(table, selection.year, &selection.race_category);
    let by_region = year_race_region(
        table,
        selection.year,
        &selection.race_category,
        &selection.region,
    );

    let year_race_rows = year_race_indices(table, selection.year, &selection.race_category);

    let bundle = ViewBundle {
        map: map_cells(&by_year_race, indicator),
        state_bars: state_bars(&by_region, indicator),
        region_means: region_means(&by_year_race, indicator),
        series: region_year_series(table, &selection.race_category, indicator),
        year_race_rows,
        region_row_count: by_region.len(),
    };

    log::debug!(
        "Rendered {:?}: {} map cells, {} state bars, {} regions, {} series points",
        selection,
        bundle.map.len(),
        bundle.state_bars.len(),
        bundle.region_means.len(),
        bundle.series.len()
    );
    bundle
}
