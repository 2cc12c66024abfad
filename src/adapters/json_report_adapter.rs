//! JSON report adapter implementing ReportPort.
//!
//! Writes the full `IndicatorReport` as pretty-printed JSON. Undefined
//! values are omitted rather than written as `null`.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::engine::IndicatorReport;
use crate::domain::error::StockboardError;
use crate::ports::report_port::{ReportOptions, ReportPort};

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, report: &IndicatorReport) -> Result<String, StockboardError> {
        serde_json::to_string_pretty(report).map_err(|e| StockboardError::Render {
            reason: e.to_string(),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        report: &IndicatorReport,
        _options: &ReportOptions,
        output_path: &str,
    ) -> Result<(), StockboardError> {
        let json = self.render(report)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        info!(path = output_path, "json report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::compute;
    use crate::domain::engine_config::ReportStyle;
    use crate::domain::ohlcv::{PriceBar, PriceSeries};
    use chrono::NaiveDate;
    use serde_json::Value;

    fn report(days: usize) -> IndicatorReport {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bars = (0..days)
            .map(|i| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: 50.0,
                high: 52.0 + i as f64,
                low: 49.0,
                close: 50.0 + i as f64,
                volume: 500,
            })
            .collect();
        compute(
            &PriceSeries::new("000660", bars).unwrap(),
            &ReportStyle::Kakao.engine_config(),
        )
        .unwrap()
    }

    #[test]
    fn undefined_fields_are_skipped() {
        let json: Value = serde_json::from_str(&JsonReportAdapter::new().render(&report(3)).unwrap())
            .unwrap();

        assert_eq!(json["ticker"], "000660");
        let first = &json["rows"][0];
        assert!(first.get("daily_return_pct").is_none());
        assert!(first.get("bollinger").is_none());
        assert!(first.get("signal").is_none());
        assert_eq!(first["moving_averages"].as_object().unwrap().len(), 0);
        assert!(json["rows"][1].get("daily_return_pct").is_some());
        assert!(json["summary"].get("avg_loss_pct").is_none());
    }

    #[test]
    fn no_nulls_anywhere() {
        let text = JsonReportAdapter::new().render(&report(25)).unwrap();
        assert!(!text.contains("null"));
    }

    #[test]
    fn write_round_trips_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let report = report(5);

        JsonReportAdapter::new()
            .write(&report, &ReportOptions::default(), path.to_str().unwrap())
            .unwrap();

        let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["rows"].as_array().unwrap().len(), 5);
        assert_eq!(json["latest"]["close"], 54.0);
        assert_eq!(json["summary"]["total_days"], 5);
    }
}
