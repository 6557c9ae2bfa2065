use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Indicator, IndicatorValues, RawRecord, Table};
use super::synth;
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Column layout of the source sheet
// ---------------------------------------------------------------------------

pub const COL_YEAR: &str = "Ano";
pub const COL_RACE: &str = "COR";
pub const COL_LOCALITY: &str = "Localidade";
pub const COL_LOCALITY_CODE: &str = "Sigla_Localidade";
pub const COL_REGION: &str = "Regiao";

/// Schema problems in an input file. Always fatal at start-up.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}, column '{column}': expected {expected}, found '{found}'")]
    InvalidCell {
        /// 1-based, counting the header as row 1.
        row: usize,
        column: &'static str,
        expected: &'static str,
        found: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Where the table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Synthetic,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Synthetic => write!(f, "synthetic example data"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: Table,
    pub source: DataSource,
}

/// Load the configured spreadsheet, or synthesize example data if it is absent.
///
/// A missing file is not an error. A file that exists but does not match the
/// expected layout is.
pub fn load(config: &DashboardConfig) -> Result<LoadedData> {
    let path = &config.data_path;

    let loaded = if path.exists() {
        let table = load_file(path, &config.sheet_name)
            .with_context(|| format!("loading {}", path.display()))?;
        log::info!("Loaded data from {}", path.display());
        LoadedData {
            table,
            source: DataSource::File(path.clone()),
        }
    } else {
        log::warn!(
            "{} not found, using synthetic example data",
            path.display()
        );
        LoadedData {
            table: synth::fallback_table(),
            source: DataSource::Synthetic,
        }
    };

    let table = &loaded.table;
    log::info!(
        "Dataset: {} rows, {} states, {} regions, years {:?}",
        table.len(),
        table.distinct().locality_count,
        table.distinct().regions.len(),
        table.year_range()
    );
    for conflict in table.locality_conflicts() {
        log::warn!(
            "Locality '{}' has inconsistent codes {:?} / regions {:?}; first match wins",
            conflict.locality,
            conflict.codes,
            conflict.regions
        );
    }

    Ok(loaded)
}

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – the sheet named `sheet`
/// * `.csv`     – header row, one observation per line
/// * `.json`    – `[{ "Ano": 2017, "COR": "BRANCA", ... }, ...]`
/// * `.parquet` – flat columns named like the sheet headers
pub fn load_file(path: &Path, sheet: &str) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path, sheet)?,
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Ok(clean(records))
}

/// Drop rows missing year, race category, locality or region.
pub fn clean(records: Vec<RawRecord>) -> Table {
    let before = records.len();
    let rows: Vec<_> = records
        .into_iter()
        .filter_map(RawRecord::into_observation)
        .collect();

    let dropped = before - rows.len();
    if dropped > 0 {
        log::info!("Dropped {dropped} of {before} rows with missing key columns");
    }
    Table::new(rows)
}

// ---------------------------------------------------------------------------
// Column resolution shared by every format
// ---------------------------------------------------------------------------

static NULL_CELL: CellValue = CellValue::Null;

/// Positions of the required columns within a header row.
struct ColumnIndex {
    year: usize,
    race: usize,
    locality: usize,
    code: usize,
    region: usize,
    indicators: Vec<(Indicator, usize)>,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Result<Self, SchemaError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
        };

        let indicators = Indicator::ALL
            .into_iter()
            .map(|i| Ok((i, find(i.column())?)))
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(ColumnIndex {
            year: find(COL_YEAR)?,
            race: find(COL_RACE)?,
            locality: find(COL_LOCALITY)?,
            code: find(COL_LOCALITY_CODE)?,
            region: find(COL_REGION)?,
            indicators,
        })
    }

    fn record(&self, row: usize, cells: &[CellValue]) -> Result<RawRecord, SchemaError> {
        let cell = |idx: usize| cells.get(idx).unwrap_or(&NULL_CELL);
        let invalid = |column: &'static str, expected: &'static str, found: &CellValue| {
            SchemaError::InvalidCell {
                row,
                column,
                expected,
                found: found.to_string(),
            }
        };
        let text = |idx: usize| {
            let c = cell(idx);
            if c.is_missing() { None } else { c.as_text() }
        };

        let year_cell = cell(self.year);
        let year = if year_cell.is_missing() {
            None
        } else {
            let year = year_cell
                .as_i64()
                .and_then(|y| i32::try_from(y).ok())
                .ok_or_else(|| invalid(COL_YEAR, "an integer year", year_cell))?;
            Some(year)
        };

        let mut indicators = IndicatorValues::default();
        for &(indicator, idx) in &self.indicators {
            let c = cell(idx);
            if c.is_missing() {
                continue;
            }
            let value = c
                .as_f64()
                .ok_or_else(|| invalid(indicator.column(), "a number", c))?;
            indicators.set(indicator, Some(value));
        }

        Ok(RawRecord {
            year,
            race_category: text(self.race),
            locality: text(self.locality),
            locality_code: text(self.code),
            region: text(self.region),
            indicators,
        })
    }
}

fn records_from_rows<I>(headers: &[String], rows: I) -> Result<Vec<RawRecord>>
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    let columns = ColumnIndex::from_headers(headers)?;
    let records = rows
        .into_iter()
        .enumerate()
        // Reported as a sheet row number: the header is row 1.
        .map(|(row_no, cells)| columns.record(row_no + 2, &cells))
        .collect::<Result<Vec<_>, SchemaError>>()?;
    Ok(records)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read `sheet` with its first row as the header. A wrong sheet name is an error.
fn load_spreadsheet(path: &Path, sheet: &str) -> Result<Vec<RawRecord>> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| spreadsheet_cell(c).as_text().unwrap_or_default())
            .collect(),
        None => bail!("sheet '{sheet}' is empty"),
    };

    records_from_rows(
        &headers,
        rows.map(|row| row.iter().map(spreadsheet_cell).collect()),
    )
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        // #N/A and friends read as missing, like pandas does.
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the sheet's column names; an empty cell is null.
fn load_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    records_from_rows(&headers, rows)
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Ano": 2017, "COR": "BRANCA", "Localidade": "Bahia", "Sigla_Localidade": "BA",
///     "Regiao": "Nordeste", "ESPVIDA": 76.1, "IDHM_E": 0.61, ... },
///   ...
/// ]
/// ```
///
/// The header is taken from the keys of the first record.
fn load_json(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = first
        .as_object()
        .context("Row 0 is not a JSON object")?
        .keys()
        .cloned()
        .collect();

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        rows.push(
            headers
                .iter()
                .map(|h| obj.get(h).map_or(CellValue::Null, json_to_cell))
                .collect(),
        );
    }

    records_from_rows(&headers, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the sheet.
///
/// Works with files written by **Pandas** (`df.to_parquet()`), including
/// categorical columns, which arrive dictionary-encoded.
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let columns = batch
            .columns()
            .iter()
            .map(|col| match col.data_type() {
                DataType::Dictionary(_, _) => arrow::compute::cast(col, &DataType::Utf8)
                    .context("decoding dictionary column"),
                _ => Ok(col.clone()),
            })
            .collect::<Result<Vec<ArrayRef>>>()?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }

    records_from_rows(&headers, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Ano,COR,Localidade,Sigla_Localidade,Regiao,ESPVIDA,IDHM_E,IDHM_L,V_RENOCUP,T_ANALF25M";

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_rows_missing_key_columns_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{HEADER}\n\
             2017,BRANCA,Bahia,BA,Nordeste,76.1,0.61,0.85,1800,9.5\n\
             2017,BRANCA,Paraná,PR,,77.0,0.66,0.86,2100,4.0\n\
             ,BRANCA,Paraná,PR,Sul,77.0,0.66,0.86,2100,4.0\n\
             2016,PRETA,Paraná,,Sul,,0.60,0.84,1700,6.0\n"
        );
        let path = write(&dir, "pnadc.csv", &csv);

        let table = load_file(&path, "ignored").unwrap();
        assert_eq!(table.len(), 2);

        let bahia = &table.rows()[0];
        assert_eq!(bahia.year, 2017);
        assert_eq!(bahia.locality_code.as_deref(), Some("BA"));
        assert_eq!(bahia.value(Indicator::OccupationalIncome), Some(1800.0));

        // Missing indicator and code do not drop the row.
        let parana = &table.rows()[1];
        assert_eq!(parana.locality_code, None);
        assert_eq!(parana.value(Indicator::LifeExpectancy), None);
        assert_eq!(parana.value(Indicator::IlliteracyRate), Some(6.0));
    }

    #[test]
    fn csv_without_indicator_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "short.csv",
            "Ano,COR,Localidade,Sigla_Localidade,Regiao,ESPVIDA\n2017,BRANCA,Bahia,BA,Nordeste,76.1\n",
        );
        let err = load_file(&path, "ignored").unwrap_err();
        assert!(format!("{err:#}").contains("missing required column 'IDHM_E'"));
    }

    #[test]
    fn non_numeric_indicator_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "bad.csv",
            &format!("{HEADER}\n2017,BRANCA,Bahia,BA,Nordeste,high,0.61,0.85,1800,9.5\n"),
        );
        let err = load_file(&path, "ignored").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("ESPVIDA"), "{message}");
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "pnadc.json",
            r#"[
              {"Ano": 2016.0, "COR": "PARDA", "Localidade": "Bahia", "Sigla_Localidade": "BA",
               "Regiao": "Nordeste", "ESPVIDA": 75.2, "IDHM_E": 0.6, "IDHM_L": 0.8,
               "V_RENOCUP": 1500, "T_ANALF25M": null, "extra": "ignored"},
              {"Ano": 2017, "COR": null, "Localidade": "Bahia", "Sigla_Localidade": "BA",
               "Regiao": "Nordeste", "ESPVIDA": 75.9, "IDHM_E": 0.6, "IDHM_L": 0.8,
               "V_RENOCUP": 1600, "T_ANALF25M": 9.0}
            ]"#,
        );
        let table = load_file(&path, "ignored").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].year, 2016);
        assert_eq!(table.rows()[0].value(Indicator::IlliteracyRate), None);
    }

    #[test]
    fn empty_json_array_is_an_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.json", "[]");
        assert!(load_file(&path, "ignored").unwrap().is_empty());
    }

    /// Write a workbook with one sheet named `sheet` in the source layout.
    /// The first data row stores its year as a float, as Excel does; the
    /// second has no region.
    fn write_workbook(dir: &tempfile::TempDir, sheet: &str) -> PathBuf {
        use rust_xlsxwriter::Workbook;

        let path = dir.path().join("pnadc.xlsx");
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();

        for (col, name) in HEADER.split(',').enumerate() {
            worksheet.write_string(0, col as u16, name).unwrap();
        }

        worksheet.write_number(1, 0, 2017.0).unwrap();
        for (col, text) in ["BRANCA", "Bahia", "BA", "Nordeste"].into_iter().enumerate() {
            worksheet.write_string(1, col as u16 + 1, text).unwrap();
        }
        for (col, value) in [76.1, 0.61, 0.85, 1800.0, 9.5].into_iter().enumerate() {
            worksheet.write_number(1, col as u16 + 5, value).unwrap();
        }

        worksheet.write_number(2, 0, 2017.0).unwrap();
        for (col, text) in ["BRANCA", "Paraná", "PR"].into_iter().enumerate() {
            worksheet.write_string(2, col as u16 + 1, text).unwrap();
        }
        worksheet.write_number(2, 5, 77.0).unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn spreadsheet_sheet_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir, "Dados_Cor_Dashboard");

        let table = load_file(&path, "Dados_Cor_Dashboard").unwrap();
        assert_eq!(table.len(), 1);

        let bahia = &table.rows()[0];
        assert_eq!(bahia.year, 2017);
        assert_eq!(bahia.race_category, "BRANCA");
        assert_eq!(bahia.locality, "Bahia");
        assert_eq!(bahia.locality_code.as_deref(), Some("BA"));
        assert_eq!(bahia.region, "Nordeste");
        assert_eq!(bahia.value(Indicator::LifeExpectancy), Some(76.1));
        assert_eq!(bahia.value(Indicator::OccupationalIncome), Some(1800.0));
        assert_eq!(bahia.value(Indicator::IlliteracyRate), Some(9.5));
    }

    #[test]
    fn unknown_sheet_name_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir, "Dados_Cor_Dashboard");

        let err = load_file(&path, "Wrong").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("reading sheet 'Wrong'"), "{message}");
    }

    #[test]
    fn invalid_cell_reports_sheet_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "bad_row.csv",
            &format!(
                "{HEADER}\n\
                 2017,BRANCA,Bahia,BA,Nordeste,76.1,0.61,0.85,1800,9.5\n\
                 2017,BRANCA,Paraná,PR,Sul,77.0,0.66,0.86,n/d,4.0\n"
            ),
        );
        let err = load_file(&path, "ignored").unwrap_err();
        let message = format!("{err:#}");
        // Header is row 1, so the second data row is row 3.
        assert!(
            message.contains("row 3, column 'V_RENOCUP': expected a number, found 'n/d'"),
            "{message}"
        );
    }

    #[test]
    fn corrupt_spreadsheet_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "broken.xlsx", "not a zip archive");
        assert!(load_file(&path, "Dados_Cor_Dashboard").is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.txt", "");
        let err = load_file(&path, "ignored").unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn missing_file_falls_back_to_synthetic_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::default().with_data_path(dir.path().join("absent.xlsx"));
        let loaded = load(&config).unwrap();
        assert_eq!(loaded.source, DataSource::Synthetic);
        assert_eq!(loaded.table.len(), 36);
    }

    #[test]
    fn existing_file_is_preferred_over_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "pnadc.csv",
            &format!("{HEADER}\n2017,BRANCA,Bahia,BA,Nordeste,76.1,0.61,0.85,1800,9.5\n"),
        );
        let config = DashboardConfig::default().with_data_path(&path);
        let loaded = load(&config).unwrap();
        assert_eq!(loaded.source, DataSource::File(path));
        assert_eq!(loaded.table.len(), 1);
    }
}
