use std::collections::BTreeSet;

use super::model::{Indicator, Observation, Table};

// ---------------------------------------------------------------------------
// Selection – the four user-chosen parameters
// ---------------------------------------------------------------------------

/// Current dropdown state. Values need not exist in the table; unknown values
/// simply select nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub year: i32,
    pub race_category: String,
    /// Only used by the per-state view.
    pub region: String,
    pub indicator: Indicator,
}

// ---------------------------------------------------------------------------
// Filtered sets
// ---------------------------------------------------------------------------

/// Rows matching `year` and `race` exactly, in table order.
pub fn year_race<'a>(table: &'a Table, year: i32, race: &str) -> Vec<&'a Observation> {
    table
        .rows()
        .iter()
        .filter(|row| row.year == year && row.race_category == race)
        .collect()
}

/// Positions in `table.rows()` of the [`year_race`] set.
pub fn year_race_indices(table: &Table, year: i32, race: &str) -> Vec<usize> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.year == year && row.race_category == race)
        .map(|(i, _)| i)
        .collect()
}

/// [`year_race`] further restricted to one region.
pub fn year_race_region<'a>(
    table: &'a Table,
    year: i32,
    race: &str,
    region: &str,
) -> Vec<&'a Observation> {
    table
        .rows()
        .iter()
        .filter(|row| row.year == year && row.race_category == race && row.region == region)
        .collect()
}

/// Keep the first row for each locality.
///
/// Within one (year, race) slice a locality should appear once. When it does
/// not, the earliest row in table order is the one charted.
pub fn first_per_locality<'a>(rows: &[&'a Observation]) -> Vec<&'a Observation> {
    let mut seen = BTreeSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    for &row in rows {
        if seen.insert(row.locality.as_str()) {
            kept.push(row);
        }
    }

    if kept.len() != rows.len() {
        log::debug!(
            "Ignored {} duplicate locality rows",
            rows.len() - kept.len()
        );
    }
    kept
}

// ---------------------------------------------------------------------------
// Chart projections
// ---------------------------------------------------------------------------

/// One choropleth cell, keyed by state code.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCell {
    pub locality: String,
    pub locality_code: String,
    pub value: Option<f64>,
}

/// One bar of the per-state chart.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBar {
    pub locality: String,
    pub value: Option<f64>,
}

/// Project the year+race set onto map cells, one per state code. Rows without
/// a code cannot be placed and are skipped. When several rows share a code the
/// first one in table order is drawn.
pub fn map_cells(rows: &[&Observation], indicator: Indicator) -> Vec<MapCell> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut cells = Vec::with_capacity(rows.len());
    for &row in rows {
        let Some(code) = row.locality_code.as_deref() else {
            log::debug!("No state code for '{}', not shown on map", row.locality);
            continue;
        };
        if !seen.insert(code) {
            log::debug!("State code '{code}' already drawn, skipping '{}'", row.locality);
            continue;
        }
        cells.push(MapCell {
            locality: row.locality.clone(),
            locality_code: code.to_string(),
            value: row.value(indicator),
        });
    }
    cells
}

/// Project the year+race+region set onto one bar per state.
pub fn state_bars(rows: &[&Observation], indicator: Indicator) -> Vec<StateBar> {
    first_per_locality(rows)
        .into_iter()
        .map(|row| StateBar {
            locality: row.locality.clone(),
            value: row.value(indicator),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::obs;

    fn sample() -> Table {
        Table::new(vec![
            obs(2017, "WHITE", "StateA", "RegionX", 80.0),
            obs(2017, "WHITE", "StateB", "RegionX", 90.0),
            obs(2017, "WHITE", "StateC", "RegionY", 70.0),
            obs(2016, "WHITE", "StateA", "RegionX", 79.0),
            obs(2017, "BLACK", "StateA", "RegionX", 75.0),
        ])
    }

    #[test]
    fn year_race_matches_both_predicates() {
        let table = sample();
        let rows = year_race(&table, 2017, "WHITE");
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.year == 2017 && r.race_category == "WHITE"));
    }

    #[test]
    fn year_race_region_restricts_to_region() {
        let table = sample();
        let rows = year_race_region(&table, 2017, "WHITE", "RegionX");
        let names: Vec<_> = rows.iter().map(|r| r.locality.as_str()).collect();
        assert_eq!(names, vec!["StateA", "StateB"]);
    }

    #[test]
    fn unknown_values_select_nothing() {
        let table = sample();
        assert!(year_race(&table, 1999, "WHITE").is_empty());
        assert!(year_race(&table, 2017, "ASIAN").is_empty());
        assert!(year_race_region(&table, 2017, "WHITE", "Nowhere").is_empty());
    }

    #[test]
    fn duplicates_keep_first_row() {
        let table = Table::new(vec![
            obs(2017, "WHITE", "StateA", "RegionX", 80.0),
            obs(2017, "WHITE", "StateA", "RegionX", 10.0),
            obs(2017, "WHITE", "StateB", "RegionX", 90.0),
        ]);
        let rows = year_race_region(&table, 2017, "WHITE", "RegionX");
        let bars = state_bars(&rows, Indicator::LifeExpectancy);
        assert_eq!(
            bars,
            vec![
                StateBar { locality: "StateA".into(), value: Some(80.0) },
                StateBar { locality: "StateB".into(), value: Some(90.0) },
            ]
        );
    }

    #[test]
    fn map_cells_skip_rows_without_code() {
        let mut uncoded = obs(2017, "WHITE", "StateD", "RegionY", 60.0);
        uncoded.locality_code = None;
        let table = Table::new(vec![obs(2017, "WHITE", "StateA", "RegionX", 80.0), uncoded]);

        let cells = map_cells(&year_race(&table, 2017, "WHITE"), Indicator::LifeExpectancy);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].locality_code, "ST");
        assert_eq!(cells[0].value, Some(80.0));
    }

    #[test]
    fn map_cells_keep_first_row_per_code() {
        // Both localities abbreviate to "ST".
        let table = Table::new(vec![
            obs(2017, "WHITE", "StateA", "RegionX", 80.0),
            obs(2017, "WHITE", "StateB", "RegionX", 90.0),
            obs(2017, "WHITE", "Other", "RegionY", 70.0),
        ]);

        let cells = map_cells(&year_race(&table, 2017, "WHITE"), Indicator::LifeExpectancy);
        let drawn: Vec<_> = cells
            .iter()
            .map(|c| (c.locality_code.as_str(), c.locality.as_str(), c.value))
            .collect();
        assert_eq!(drawn, vec![("ST", "StateA", Some(80.0)), ("OT", "Other", Some(70.0))]);
    }

    #[test]
    fn missing_indicator_value_is_kept_as_none() {
        let table = sample();
        let rows = year_race(&table, 2017, "WHITE");
        let bars = state_bars(&rows, Indicator::OccupationalIncome);
        assert_eq!(bars.len(), 3);
        assert!(bars.iter().all(|b| b.value.is_none()));
    }
}
