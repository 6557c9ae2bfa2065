use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell read from a spreadsheet or export
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a spreadsheet column can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Numeric strings are accepted because
    /// CSV and some spreadsheet exports store numbers as text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a whole number. `2017.0` is accepted, `2017.5` is not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text form of a categorical cell. Empty text counts as missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            other => Some(other.to_string()),
        }
    }

    /// Null, or a float NaN (how pandas writes a missing number).
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Indicator – the fixed set of numeric measures
// ---------------------------------------------------------------------------

/// A named socioeconomic measure. The set is fixed, not derived from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Indicator {
    LifeExpectancy,
    EducationIndex,
    LongevityIndex,
    OccupationalIncome,
    IlliteracyRate,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::LifeExpectancy,
        Indicator::EducationIndex,
        Indicator::LongevityIndex,
        Indicator::OccupationalIncome,
        Indicator::IlliteracyRate,
    ];

    /// Column name in the source sheet.
    pub fn column(self) -> &'static str {
        match self {
            Indicator::LifeExpectancy => "ESPVIDA",
            Indicator::EducationIndex => "IDHM_E",
            Indicator::LongevityIndex => "IDHM_L",
            Indicator::OccupationalIncome => "V_RENOCUP",
            Indicator::IlliteracyRate => "T_ANALF25M",
        }
    }

    /// Human-readable label for dropdowns and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::LifeExpectancy => "Life expectancy",
            Indicator::EducationIndex => "HDI – Education",
            Indicator::LongevityIndex => "HDI – Longevity",
            Indicator::OccupationalIncome => "Occupational income",
            Indicator::IlliteracyRate => "Illiteracy rate (25+)",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One optional value per [`Indicator`], indexed by the enum's order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorValues([Option<f64>; 5]);

impl IndicatorValues {
    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        self.0[indicator.index()]
    }

    pub fn set(&mut self, indicator: Indicator, value: Option<f64>) {
        self.0[indicator.index()] = value;
    }
}

impl FromIterator<(Indicator, f64)> for IndicatorValues {
    fn from_iter<I: IntoIterator<Item = (Indicator, f64)>>(iter: I) -> Self {
        let mut values = IndicatorValues::default();
        for (indicator, value) in iter {
            values.set(indicator, Some(value));
        }
        values
    }
}

// ---------------------------------------------------------------------------
// Observation – one usable row
// ---------------------------------------------------------------------------

/// One row for a given year, race category and locality.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub year: i32,
    pub race_category: String,
    pub locality: String,
    pub locality_code: Option<String>,
    pub region: String,
    pub indicators: IndicatorValues,
}

impl Observation {
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        self.indicators.get(indicator)
    }
}

/// A row as read from the source, before incomplete rows are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub year: Option<i32>,
    pub race_category: Option<String>,
    pub locality: Option<String>,
    pub locality_code: Option<String>,
    pub region: Option<String>,
    pub indicators: IndicatorValues,
}

impl RawRecord {
    /// Promote to an [`Observation`] if every key dimension is present.
    pub fn into_observation(self) -> Option<Observation> {
        Some(Observation {
            year: self.year?,
            race_category: self.race_category?,
            locality: self.locality?,
            locality_code: self.locality_code,
            region: self.region?,
            indicators: self.indicators,
        })
    }
}

// ---------------------------------------------------------------------------
// Table – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// Distinct values used to populate the filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistinctValues {
    /// Sorted ascending.
    pub years: Vec<i32>,
    /// First-appearance order.
    pub race_categories: Vec<String>,
    /// First-appearance order.
    pub regions: Vec<String>,
    pub locality_count: usize,
}

/// A locality whose rows disagree on code or region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalityConflict {
    pub locality: String,
    pub codes: BTreeSet<String>,
    pub regions: BTreeSet<String>,
}

/// The immutable observation table with pre-computed distinct values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Observation>,
    distinct: DistinctValues,
}

impl Table {
    /// Build the distinct-value index from cleaned rows.
    pub fn new(rows: Vec<Observation>) -> Self {
        let mut years = BTreeSet::new();
        let mut race_categories: Vec<String> = Vec::new();
        let mut regions: Vec<String> = Vec::new();
        let mut localities = BTreeSet::new();

        for row in &rows {
            years.insert(row.year);
            if !race_categories.contains(&row.race_category) {
                race_categories.push(row.race_category.clone());
            }
            if !regions.contains(&row.region) {
                regions.push(row.region.clone());
            }
            localities.insert(row.locality.as_str());
        }

        let distinct = DistinctValues {
            years: years.into_iter().collect(),
            race_categories,
            regions,
            locality_count: localities.len(),
        };
        Table { rows, distinct }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn distinct(&self) -> &DistinctValues {
        &self.distinct
    }

    /// Earliest and latest survey year, if any rows exist.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.distinct.years.first()?, *self.distinct.years.last()?))
    }

    /// Localities whose rows do not agree on a single code and region.
    pub fn locality_conflicts(&self) -> Vec<LocalityConflict> {
        let mut seen: BTreeMap<&str, (BTreeSet<String>, BTreeSet<String>)> = BTreeMap::new();
        for row in &self.rows {
            let (codes, regions) = seen.entry(row.locality.as_str()).or_default();
            if let Some(code) = &row.locality_code {
                codes.insert(code.clone());
            }
            regions.insert(row.region.clone());
        }

        seen.into_iter()
            .filter(|(_, (codes, regions))| codes.len() > 1 || regions.len() > 1)
            .map(|(locality, (codes, regions))| LocalityConflict {
                locality: locality.to_string(),
                codes,
                regions,
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn obs(year: i32, race: &str, locality: &str, region: &str, value: f64) -> Observation {
        Observation {
            year,
            race_category: race.to_string(),
            locality: locality.to_string(),
            locality_code: Some(locality.chars().take(2).collect::<String>().to_uppercase()),
            region: region.to_string(),
            indicators: [(Indicator::LifeExpectancy, value)].into_iter().collect(),
        }
    }

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let table = Table::new(vec![
            obs(2017, "PRETA", "Bahia", "Nordeste", 1.0),
            obs(2012, "BRANCA", "Paraná", "Sul", 1.0),
            obs(2015, "PRETA", "Bahia", "Nordeste", 1.0),
        ]);
        let distinct = table.distinct();
        assert_eq!(distinct.years, vec![2012, 2015, 2017]);
        assert_eq!(distinct.race_categories, vec!["PRETA", "BRANCA"]);
        assert_eq!(distinct.regions, vec!["Nordeste", "Sul"]);
        assert_eq!(distinct.locality_count, 2);
        assert_eq!(table.year_range(), Some((2012, 2017)));
    }

    #[test]
    fn empty_table_has_no_year_range() {
        let table = Table::new(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.year_range(), None);
    }

    #[test]
    fn conflicting_region_is_reported() {
        let mut moved = obs(2013, "BRANCA", "Bahia", "Sudeste", 2.0);
        moved.locality_code = Some("BA".to_string());
        let mut original = obs(2012, "BRANCA", "Bahia", "Nordeste", 1.0);
        original.locality_code = Some("BA".to_string());

        let table = Table::new(vec![original, moved, obs(2012, "BRANCA", "Paraná", "Sul", 1.0)]);
        let conflicts = table.locality_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].locality, "Bahia");
        assert_eq!(conflicts[0].regions.len(), 2);
        assert_eq!(conflicts[0].codes.len(), 1);
    }

    #[test]
    fn raw_record_without_region_is_unusable() {
        let raw = RawRecord {
            year: Some(2012),
            race_category: Some("BRANCA".into()),
            locality: Some("Bahia".into()),
            ..Default::default()
        };
        assert!(raw.into_observation().is_none());
    }

    #[test]
    fn cell_value_conversions() {
        assert_eq!(CellValue::Float(2017.0).as_i64(), Some(2017));
        assert_eq!(CellValue::Float(2017.5).as_i64(), None);
        assert_eq!(CellValue::String(" 3.5 ".into()).as_f64(), Some(3.5));
        assert_eq!(CellValue::String("   ".into()).as_text(), None);
        assert_eq!(CellValue::Integer(7).as_text().as_deref(), Some("7"));
        assert!(CellValue::Float(f64::NAN).is_missing());
    }
}
