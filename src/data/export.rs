use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use super::loader::{COL_LOCALITY, COL_LOCALITY_CODE, COL_RACE, COL_REGION, COL_YEAR};
use super::model::{Indicator, Observation, Table};

/// Lay a table out in the sheet's column order as one Arrow batch.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let rows = table.rows();

    let mut fields = vec![
        Field::new(COL_YEAR, DataType::Int32, false),
        Field::new(COL_RACE, DataType::Utf8, false),
        Field::new(COL_LOCALITY, DataType::Utf8, false),
        Field::new(COL_LOCALITY_CODE, DataType::Utf8, true),
        Field::new(COL_REGION, DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.race_category.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.locality.as_str()),
        )),
        Arc::new(
            rows.iter()
                .map(|r| r.locality_code.as_deref())
                .collect::<StringArray>(),
        ),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.region.as_str()),
        )),
    ];

    for indicator in Indicator::ALL {
        fields.push(Field::new(indicator.column(), DataType::Float64, true));
        columns.push(Arc::new(
            rows.iter()
                .map(|r| r.value(indicator))
                .collect::<Float64Array>(),
        ));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("building record batch")
}

/// Write `table` as Parquet, readable again by `loader::load_file`.
pub fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Write `table` as CSV with the sheet's headers. Missing values are empty cells.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![COL_YEAR, COL_RACE, COL_LOCALITY, COL_LOCALITY_CODE, COL_REGION];
    header.extend(Indicator::ALL.iter().map(|i| i.column()));
    writer.write_record(&header).context("writing CSV header")?;

    for row in table.rows() {
        let mut record = vec![
            row.year.to_string(),
            row.race_category.clone(),
            row.locality.clone(),
            row.locality_code.clone().unwrap_or_default(),
            row.region.clone(),
        ];
        record.extend(
            Indicator::ALL
                .iter()
                .map(|&i| row.value(i).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record).context("writing CSV row")?;
    }

    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// One table row under the sheet's column names, as written by [`write_json`].
#[derive(Serialize)]
struct SheetRecord<'a> {
    #[serde(rename = "Ano")]
    year: i32,
    #[serde(rename = "COR")]
    race_category: &'a str,
    #[serde(rename = "Localidade")]
    locality: &'a str,
    #[serde(rename = "Sigla_Localidade")]
    locality_code: Option<&'a str>,
    #[serde(rename = "Regiao")]
    region: &'a str,
    #[serde(rename = "ESPVIDA")]
    life_expectancy: Option<f64>,
    #[serde(rename = "IDHM_E")]
    education_index: Option<f64>,
    #[serde(rename = "IDHM_L")]
    longevity_index: Option<f64>,
    #[serde(rename = "V_RENOCUP")]
    occupational_income: Option<f64>,
    #[serde(rename = "T_ANALF25M")]
    illiteracy_rate: Option<f64>,
}

impl<'a> From<&'a Observation> for SheetRecord<'a> {
    fn from(row: &'a Observation) -> Self {
        SheetRecord {
            year: row.year,
            race_category: &row.race_category,
            locality: &row.locality,
            locality_code: row.locality_code.as_deref(),
            region: &row.region,
            life_expectancy: row.value(Indicator::LifeExpectancy),
            education_index: row.value(Indicator::EducationIndex),
            longevity_index: row.value(Indicator::LongevityIndex),
            occupational_income: row.value(Indicator::OccupationalIncome),
            illiteracy_rate: row.value(Indicator::IlliteracyRate),
        }
    }
}

/// Write `table` as a JSON array of records keyed by the sheet's column
/// names. Missing values are `null`.
pub fn write_json(table: &Table, path: &Path) -> Result<()> {
    let records: Vec<SheetRecord<'_>> = table.rows().iter().map(SheetRecord::from).collect();
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)
        .context("writing JSON records")?;
    Ok(())
}
