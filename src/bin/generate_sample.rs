use std::path::Path;

use anyhow::Result;

use pnadc_dashboard::data::export::{write_csv, write_json, write_parquet};
use pnadc_dashboard::data::synth::fallback_table;

/// Write the synthetic example table as Parquet, CSV and JSON, in the sheet's
/// column layout, so the file loaders can be tried without the spreadsheet.
fn main() -> Result<()> {
    env_logger::init();

    let table = fallback_table();

    let parquet_path = Path::new("pnadc_sample.parquet");
    write_parquet(&table, parquet_path)?;

    let csv_path = Path::new("pnadc_sample.csv");
    write_csv(&table, csv_path)?;

    let json_path = Path::new("pnadc_sample.json");
    write_json(&table, json_path)?;

    println!(
        "Wrote {} observations ({} states, years {:?}) to {}, {} and {}",
        table.len(),
        table.distinct().locality_count,
        table.year_range(),
        parquet_path.display(),
        csv_path.display(),
        json_path.display()
    );
    Ok(())
}
