use super::model::{Indicator, IndicatorValues, RawRecord, Table};

/// Race category used for every synthetic row.
pub const SYNTHETIC_RACE: &str = "WHITE";

/// (state, code, region), indexed by position.
const LOCALITIES: [(&str, &str, &str); 6] = [
    ("São Paulo", "SP", "Sudeste"),
    ("Rio de Janeiro", "RJ", "Sudeste"),
    ("Minas Gerais", "MG", "Sudeste"),
    ("Bahia", "BA", "Nordeste"),
    ("Paraná", "PR", "Sul"),
    ("Rio Grande do Sul", "RS", "Sul"),
];

const FIRST_YEAR: i32 = 2012;
const YEARS: i32 = 6;

/// Deterministic demo rows used when no spreadsheet is available.
///
/// Each indicator is a linear function of the year offset and the locality
/// index: reproducible, not realistic.
pub fn synthesize() -> Vec<RawRecord> {
    let mut records = Vec::with_capacity(LOCALITIES.len() * YEARS as usize);

    for year in FIRST_YEAR..FIRST_YEAR + YEARS {
        let k = f64::from(year - FIRST_YEAR);
        for (i, (state, code, region)) in LOCALITIES.iter().enumerate() {
            let i = i as f64;
            let indicators: IndicatorValues = [
                (Indicator::LifeExpectancy, 75.0 + k * 0.5 + i * 0.3),
                (Indicator::EducationIndex, 0.7 + k * 0.02 + i * 0.03),
                (Indicator::LongevityIndex, 0.8 + k * 0.01 + i * 0.02),
                (Indicator::OccupationalIncome, 1500.0 + k * 100.0 + i * 200.0),
                (Indicator::IlliteracyRate, 5.0 - k * 0.2 - i * 0.3),
            ]
            .into_iter()
            .collect();

            records.push(RawRecord {
                year: Some(year),
                race_category: Some(SYNTHETIC_RACE.to_string()),
                locality: Some(state.to_string()),
                locality_code: Some(code.to_string()),
                region: Some(region.to_string()),
                indicators,
            });
        }
    }

    records
}

/// The synthetic rows, cleaned into a [`Table`].
pub fn fallback_table() -> Table {
    super::loader::clean(synthesize())
}
