use std::collections::BTreeMap;

use super::model::{Indicator, Observation, Table};

/// Mean of one indicator over the rows of a region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMean {
    pub region: String,
    pub mean: f64,
    /// Rows that contributed a value.
    pub count: usize,
}

/// Mean of one indicator for a (year, region) group.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub year: i32,
    pub region: String,
    pub mean: f64,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Group `rows` by region and average `indicator`, one entry per region present.
///
/// Ordered by region name. A region whose rows carry no value for the
/// indicator is left out rather than reported as NaN.
pub fn region_means(rows: &[&Observation], indicator: Indicator) -> Vec<RegionMean> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.region.as_str())
            .or_default()
            .push(row.value(indicator));
    }

    groups
        .into_iter()
        .filter_map(|(region, acc)| {
            Some(RegionMean {
                region: region.to_string(),
                mean: acc.mean()?,
                count: acc.count,
            })
        })
        .collect()
}

/// Per-region yearly means for one race category, across every year.
///
/// Sorted by year, then region.
pub fn region_year_series(table: &Table, race: &str, indicator: Indicator) -> Vec<SeriesPoint> {
    let mut groups: BTreeMap<(i32, &str), Accumulator> = BTreeMap::new();
    for row in table.rows().iter().filter(|r| r.race_category == race) {
        groups
            .entry((row.year, row.region.as_str()))
            .or_default()
            .push(row.value(indicator));
    }

    groups
        .into_iter()
        .filter_map(|((year, region), acc)| {
            Some(SeriesPoint {
                year,
                region: region.to_string(),
                mean: acc.mean()?,
            })
        })
        .collect()
}

/// Split a series into one `[year, mean]` polyline per region, years ascending.
pub fn series_by_region(points: &[SeriesPoint]) -> BTreeMap<&str, Vec<[f64; 2]>> {
    let mut lines: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        lines
            .entry(p.region.as_str())
            .or_default()
            .push([f64::from(p.year), p.mean]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::year_race;
    use crate::data::model::tests::obs;

    #[test]
    fn region_means_average_each_region() {
        let table = Table::new(vec![
            obs(2017, "WHITE", "StateA", "RegionX", 80.0),
            obs(2017, "WHITE", "StateB", "RegionX", 90.0),
            obs(2017, "WHITE", "StateC", "RegionY", 70.0),
        ]);
        let rows = year_race(&table, 2017, "WHITE");
        let means = region_means(&rows, Indicator::LifeExpectancy);
        assert_eq!(
            means,
            vec![
                RegionMean { region: "RegionX".into(), mean: 85.0, count: 2 },
                RegionMean { region: "RegionY".into(), mean: 70.0, count: 1 },
            ]
        );
    }

    #[test]
    fn region_without_values_is_omitted() {
        let table = Table::new(vec![obs(2017, "WHITE", "StateA", "RegionX", 80.0)]);
        let rows = year_race(&table, 2017, "WHITE");
        assert!(region_means(&rows, Indicator::EducationIndex).is_empty());
    }

    #[test]
    fn empty_input_gives_empty_means() {
        assert!(region_means(&[], Indicator::LifeExpectancy).is_empty());
    }

    #[test]
    fn series_ignores_year_and_sorts_by_year_then_region() {
        let table = Table::new(vec![
            obs(2017, "WHITE", "StateC", "RegionY", 70.0),
            obs(2016, "WHITE", "StateA", "RegionX", 78.0),
            obs(2017, "WHITE", "StateA", "RegionX", 80.0),
            obs(2016, "WHITE", "StateB", "RegionX", 88.0),
            obs(2017, "BLACK", "StateA", "RegionX", 10.0),
        ]);
        let series = region_year_series(&table, "WHITE", Indicator::LifeExpectancy);
        let keys: Vec<_> = series.iter().map(|p| (p.year, p.region.as_str(), p.mean)).collect();
        assert_eq!(
            keys,
            vec![
                (2016, "RegionX", 83.0),
                (2017, "RegionX", 80.0),
                (2017, "RegionY", 70.0),
            ]
        );
    }

    #[test]
    fn series_splits_into_lines() {
        let points = vec![
            SeriesPoint { year: 2016, region: "RegionX".into(), mean: 1.0 },
            SeriesPoint { year: 2017, region: "RegionX".into(), mean: 2.0 },
            SeriesPoint { year: 2017, region: "RegionY".into(), mean: 3.0 },
        ];
        let lines = series_by_region(&points);
        assert_eq!(lines["RegionX"], vec![[2016.0, 1.0], [2017.0, 2.0]]);
        assert_eq!(lines["RegionY"], vec![[2017.0, 3.0]]);
    }
}
