//! Configuration validation.
//!
//! Validates the `[data]`, `[report]` and `[indicators]` sections before any
//! data is fetched. Values are read as strings and parsed here so that a
//! malformed number is reported instead of silently falling back to a default.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::engine_config::ReportStyle;
use crate::domain::error::StockboardError;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::{ReportFormat, Theme};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const INDICATOR_FLOATS: &[&str] = &[
    "bollinger_multiplier",
    "volume_percentile",
    "upper_percentile",
    "lower_percentile",
    "volume_spike_sigma",
    "risk_free_pct",
    "trading_days_per_year",
];
const INDICATOR_INTS: &[&str] = &["bollinger_period", "volatility_window"];
const INDICATOR_BOOLS: &[&str] = &["bollinger", "anomaly_signals"];

pub fn validate_all(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    validate_data_config(config)?;
    validate_report_config(config)?;
    validate_indicator_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    match source.trim().to_lowercase().as_str() {
        "csv" | "sqlite" => {}
        other => {
            return Err(invalid(
                "data",
                "source",
                format!("unknown data source '{other}' (expected csv or sqlite)"),
            ));
        }
    }

    match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => {}
        _ => return Err(missing("data", "path")),
    }

    if let Some(size) = optional_number::<u32>(config, "data", "pool_size")? {
        if size == 0 {
            return Err(invalid("data", "pool_size", "pool_size must be at least 1".into()));
        }
    }
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    let start = optional_date(config, "report", "start_date")?;
    let end = optional_date(config, "report", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "report",
                "start_date",
                "start_date must not be after end_date".into(),
            ));
        }
    }

    optional_parsed::<ReportStyle>(config, "report", "style")?;
    optional_parsed::<ReportFormat>(config, "report", "format")?;
    optional_parsed::<Theme>(config, "report", "theme")?;
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    if let Some(raw) = config.get_string("indicators", "ma_windows") {
        parse_ma_windows(&raw)?;
    }
    for key in INDICATOR_FLOATS {
        optional_number::<f64>(config, "indicators", key)?;
    }
    for key in INDICATOR_INTS {
        optional_number::<usize>(config, "indicators", key)?;
    }
    for key in INDICATOR_BOOLS {
        optional_bool(config, "indicators", key)?;
    }
    Ok(())
}

/// Parses a comma-separated window list such as `5,20,60`.
pub fn parse_ma_windows(raw: &str) -> Result<Vec<usize>, StockboardError> {
    let mut windows = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let w: usize = part.parse().map_err(|_| {
            invalid(
                "indicators",
                "ma_windows",
                format!("'{part}' is not a window length"),
            )
        })?;
        if w == 0 {
            return Err(invalid(
                "indicators",
                "ma_windows",
                "window length must be at least 1".into(),
            ));
        }
        if !windows.contains(&w) {
            windows.push(w);
        }
    }
    Ok(windows)
}

pub fn parse_date(section: &str, key: &str, value: &str) -> Result<NaiveDate, StockboardError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        invalid(
            section,
            key,
            format!("invalid {key} format, expected YYYY-MM-DD"),
        )
    })
}

pub fn optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, StockboardError> {
    match non_empty(config, section, key) {
        Some(v) => parse_date(section, key, &v).map(Some),
        None => Ok(None),
    }
}

pub fn optional_number<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, StockboardError> {
    match non_empty(config, section, key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{v}' is not a valid number"))),
        None => Ok(None),
    }
}

pub fn optional_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<bool>, StockboardError> {
    match non_empty(config, section, key) {
        Some(v) => match v.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(invalid(section, key, format!("'{v}' is not a boolean"))),
        },
        None => Ok(None),
    }
}

pub fn optional_parsed<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, StockboardError>
where
    T: FromStr<Err = String>,
{
    match non_empty(config, section, key) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|reason| invalid(section, key, reason)),
        None => Ok(None),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .filter(|v| !v.trim().is_empty())
}

fn missing(section: &str, key: &str) -> StockboardError {
    StockboardError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> StockboardError {
    StockboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(ini: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(ini).unwrap()
    }

    const VALID: &str = r#"
[data]
source = csv
path = ./data

[report]
ticker = AAPL
start_date = 2024-01-01
end_date = 2024-12-31
style = kakao
format = html
theme = dark

[indicators]
ma_windows = 5, 20, 60
bollinger = true
volatility_window = 20
risk_free_pct = 3.0
"#;

    #[test]
    fn valid_config_passes() {
        assert!(validate_all(&config(VALID)).is_ok());
    }

    #[test]
    fn missing_data_path() {
        let err = validate_data_config(&config("[data]\nsource = csv\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigMissing { ref key, .. } if key == "path"));
    }

    #[test]
    fn unknown_data_source() {
        let err =
            validate_data_config(&config("[data]\nsource = postgres\npath = x\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { ref key, .. } if key == "source"));
    }

    #[test]
    fn zero_pool_size_rejected() {
        let err = validate_data_config(&config("[data]\npath = x\npool_size = 0\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { ref key, .. } if key == "pool_size"));
    }

    #[test]
    fn inverted_dates_rejected() {
        let ini = "[report]\nstart_date = 2024-06-01\nend_date = 2024-01-01\n";
        assert!(validate_report_config(&config(ini)).is_err());
    }

    #[test]
    fn same_day_range_allowed() {
        let ini = "[report]\nstart_date = 2024-06-01\nend_date = 2024-06-01\n";
        assert!(validate_report_config(&config(ini)).is_ok());
    }

    #[test]
    fn malformed_date_rejected() {
        let err = validate_report_config(&config("[report]\nstart_date = 01/02/2024\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { ref key, .. } if key == "start_date"));
    }

    #[test]
    fn unknown_style_format_theme_rejected() {
        assert!(validate_report_config(&config("[report]\nstyle = fancy\n")).is_err());
        assert!(validate_report_config(&config("[report]\nformat = pdf\n")).is_err());
        assert!(validate_report_config(&config("[report]\ntheme = neon\n")).is_err());
    }

    #[test]
    fn malformed_number_is_reported() {
        let err = validate_indicator_config(&config("[indicators]\nrisk_free_pct = three\n"))
            .unwrap_err();
        assert!(
            matches!(err, StockboardError::ConfigInvalid { ref key, .. } if key == "risk_free_pct")
        );
    }

    #[test]
    fn malformed_bool_is_reported() {
        assert!(validate_indicator_config(&config("[indicators]\nbollinger = maybe\n")).is_err());
    }

    #[test]
    fn ma_windows_parse() {
        assert_eq!(parse_ma_windows("5,20, 60").unwrap(), vec![5, 20, 60]);
        assert_eq!(parse_ma_windows("20,20,5").unwrap(), vec![20, 5]);
        assert!(parse_ma_windows("").unwrap().is_empty());
        assert!(parse_ma_windows("5,x").is_err());
        assert!(parse_ma_windows("0").is_err());
    }
}
