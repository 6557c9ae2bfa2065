use std::path::PathBuf;

use crate::data::model::Indicator;

/// Spreadsheet looked up relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "dados_PNADC_preparado_dashboard.xlsx";
pub const DEFAULT_SHEET: &str = "Dados_Cor_Dashboard";

/// Start-up settings. There are no CLI flags; everything has a fixed default.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Sheet read from spreadsheet files; ignored for CSV/JSON/Parquet.
    pub sheet_name: String,
    /// Initial race selection, used only if present in the data.
    pub default_race: String,
    /// Initial region selection, used only if present in the data.
    pub default_region: String,
    pub default_indicator: Indicator,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            sheet_name: DEFAULT_SHEET.to_string(),
            default_race: "BRANCA".to_string(),
            default_region: "Sudeste".to_string(),
            default_indicator: Indicator::LifeExpectancy,
            window_size: [1280.0, 860.0],
            min_window_size: [720.0, 480.0],
        }
    }
}

impl DashboardConfig {
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }
}
