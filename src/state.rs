use crate::config::DashboardConfig;
use crate::data::filter::Selection;
use crate::data::loader::{DataSource, LoadedData};
use crate::data::model::{Indicator, Table};
use crate::data::view::{ViewBundle, render};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Which pair of charts is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Map plus bars for the states of one region.
    #[default]
    States,
    /// Region means plus the yearly evolution per region.
    Regions,
}

/// The full UI state, independent of rendering.
pub struct DashboardState {
    /// Loaded once at start-up, never mutated.
    table: Table,
    pub source: DataSource,
    pub selection: Selection,
    pub tab: Tab,
    /// Views for the current selection (cached).
    pub views: ViewBundle,
}

impl DashboardState {
    /// Take ownership of the table and pick the initial selection.
    ///
    /// Configured defaults are used only if the data contains them; otherwise
    /// the first distinct value is chosen. The year starts at the latest one.
    pub fn new(loaded: LoadedData, config: &DashboardConfig) -> Self {
        let LoadedData { table, source } = loaded;
        let distinct = table.distinct();

        let pick = |values: &[String], preferred: &str| {
            if values.iter().any(|v| v == preferred) {
                preferred.to_string()
            } else {
                values.first().cloned().unwrap_or_default()
            }
        };

        let selection = Selection {
            year: distinct.years.last().copied().unwrap_or_default(),
            race_category: pick(distinct.race_categories.as_slice(), &config.default_race),
            region: pick(distinct.regions.as_slice(), &config.default_region),
            indicator: config.default_indicator,
        };

        let views = render(&table, &selection);
        Self {
            table,
            source,
            selection,
            tab: Tab::default(),
            views,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Recompute `views` after a selection change.
    pub fn refresh(&mut self) {
        self.views = render(&self.table, &self.selection);
    }

    pub fn set_year(&mut self, year: i32) {
        if self.selection.year != year {
            self.selection.year = year;
            self.refresh();
        }
    }

    pub fn set_race(&mut self, race: &str) {
        if self.selection.race_category != race {
            self.selection.race_category = race.to_string();
            self.refresh();
        }
    }

    pub fn set_region(&mut self, region: &str) {
        if self.selection.region != region {
            self.selection.region = region.to_string();
            self.refresh();
        }
    }

    pub fn set_indicator(&mut self, indicator: Indicator) {
        if self.selection.indicator != indicator {
            self.selection.indicator = indicator;
            self.refresh();
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Caption under the state bars: how many rows the region selection
    /// matched, and whether duplicates were folded into one bar.
    pub fn region_rows_note(&self) -> String {
        let rows = self.views.region_row_count;
        let bars = self.views.state_bars.len();
        let noun = if rows == 1 { "row" } else { "rows" };
        if rows > bars {
            format!(
                "{rows} {noun} in {}, first row per state shown",
                self.selection.region
            )
        } else {
            format!("{rows} {noun} in {}", self.selection.region)
        }
    }

    /// One-line description of the loaded data for the info banner.
    pub fn summary(&self) -> String {
        let distinct = self.table.distinct();
        let years = match self.table.year_range() {
            Some((first, last)) => format!("{first}–{last}"),
            None => "no years".to_string(),
        };
        format!(
            "{} rows, {years} · {} states, {} regions",
            self.table.len(),
            distinct.locality_count,
            distinct.regions.len()
        )
    }
}
