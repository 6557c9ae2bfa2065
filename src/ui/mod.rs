pub mod charts;
pub mod geo;
pub mod panels;
pub mod table;

/// Two-decimal label for a chart value; a dash when the value is missing.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "–".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_use_two_decimals() {
        assert_eq!(format_value(Some(76.456)), "76.46");
        assert_eq!(format_value(None), "–");
    }
}
