//! CLI integration tests for report command orchestration.
//!
//! Tests cover:
//! - Engine configuration from `[indicators]` on top of style presets
//! - Report request resolution with command-line overrides
//! - Validation of real INI files on disk
//! - Data source selection errors

mod common;

use common::*;
use std::io::Write;
use std::path::PathBuf;
use stockboard::adapters::file_config_adapter::FileConfigAdapter;
use stockboard::cli::{self, Overrides};
use stockboard::domain::config_validation::validate_all;
use stockboard::domain::engine_config::ReportStyle;
use stockboard::domain::error::StockboardError;
use stockboard::ports::report_port::{ReportFormat, Theme};

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[data]
source = csv
path = ./data

[report]
ticker = 035720
start_date = 2024-01-01
end_date = 2024-12-31
style = kakao
format = html
theme = dark
title = Kakao 2024

[indicators]
ma_windows = 20, 60, 120
bollinger_period = 20
bollinger_multiplier = 2.0
volume_percentile = 0.9
upper_percentile = 0.9
lower_percentile = 0.1
volatility_window = 20
risk_free_pct = 3.0
"#;

mod engine_config {
    use super::*;

    #[test]
    fn empty_indicators_section_keeps_preset() {
        let adapter = FileConfigAdapter::from_string("[data]\npath = x\n").unwrap();
        for style in [ReportStyle::Standard, ReportStyle::Kakao, ReportStyle::Annual] {
            let engine = cli::build_engine_config(&adapter, style).unwrap();
            assert_eq!(engine, style.engine_config(), "{style}");
        }
    }

    #[test]
    fn overrides_apply_on_top_of_style() {
        let ini = r#"
[indicators]
ma_windows = 10,30
bollinger = true
bollinger_period = 30
bollinger_multiplier = 2.5
anomaly_signals = on
upper_percentile = 0.95
lower_percentile = 0.05
volatility_window = 10
volume_spike_sigma = 3
risk_free_pct = 1.5
"#;
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let engine = cli::build_engine_config(&adapter, ReportStyle::Standard).unwrap();

        assert_eq!(engine.ma_windows, vec![10, 30]);
        let bb = engine.bollinger.unwrap();
        assert_eq!(bb.period, 30);
        assert!((bb.multiplier - 2.5).abs() < f64::EPSILON);
        let an = engine.anomaly.unwrap();
        assert!((an.upper_percentile - 0.95).abs() < f64::EPSILON);
        assert!((an.lower_percentile - 0.05).abs() < f64::EPSILON);
        assert!((an.volume_percentile - 0.9).abs() < f64::EPSILON);
        assert_eq!(engine.volatility_window, 10);
        assert!((engine.volume_spike_sigma - 3.0).abs() < f64::EPSILON);
        assert!((engine.risk_free_pct - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn overlays_can_be_switched_off() {
        let ini = "[indicators]\nbollinger = false\nanomaly_signals = no\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let engine = cli::build_engine_config(&adapter, ReportStyle::Kakao).unwrap();

        assert!(engine.bollinger.is_none());
        assert!(engine.anomaly.is_none());
        assert_eq!(engine.ma_windows, vec![20, 60, 120]);
    }

    #[test]
    fn bad_values_are_config_errors() {
        for ini in [
            "[indicators]\nma_windows = 5,zero\n",
            "[indicators]\nbollinger_multiplier = wide\n",
            "[indicators]\nanomaly_signals = maybe\n",
        ] {
            let adapter = FileConfigAdapter::from_string(ini).unwrap();
            let err = cli::build_engine_config(&adapter, ReportStyle::Annual).unwrap_err();
            assert!(
                matches!(err, StockboardError::ConfigInvalid { .. }),
                "{ini}: {err}"
            );
        }
    }

    #[test]
    fn out_of_range_percentile_fails_validation() {
        let ini = "[indicators]\nlower_percentile = 0.8\nupper_percentile = 0.2\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_engine_config(&adapter, ReportStyle::Kakao).unwrap_err();
        assert!(matches!(err, StockboardError::InvalidConfig { .. }));
    }
}

mod report_request {
    use super::*;

    #[test]
    fn resolves_everything_from_config() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let req = cli::build_report_request(&adapter, &Overrides::default()).unwrap();

        assert_eq!(req.ticker, "035720");
        assert_eq!(req.start_date, date(2024, 1, 1));
        assert_eq!(req.end_date, date(2024, 12, 31));
        assert_eq!(req.style, ReportStyle::Kakao);
        assert_eq!(req.format, ReportFormat::Html);
        assert_eq!(req.options.theme, Theme::Dark);
        assert_eq!(req.options.title.as_deref(), Some("Kakao 2024"));
        assert_eq!(req.output, PathBuf::from("035720_kakao.html"));
        assert_eq!(req.engine.ma_windows, vec![20, 60, 120]);
    }

    #[test]
    fn command_line_wins_over_config() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            ticker: Some("aapl".into()),
            start: Some(date(2024, 6, 1)),
            end: None,
            style: Some(ReportStyle::Annual),
            format: Some(ReportFormat::Json),
            output: None,
            theme: Some(Theme::Light),
        };
        let req = cli::build_report_request(&adapter, &overrides).unwrap();

        assert_eq!(req.ticker, "AAPL");
        assert_eq!(req.start_date, date(2024, 6, 1));
        assert_eq!(req.end_date, date(2024, 12, 31));
        assert_eq!(req.style, ReportStyle::Annual);
        assert_eq!(req.output, PathBuf::from("AAPL_annual.json"));
        assert_eq!(req.options.theme, Theme::Light);
        // [indicators] still applies to the overriding style
        assert_eq!(req.engine.ma_windows, vec![20, 60, 120]);
        assert!(req.engine.anomaly.is_some());
    }

    #[test]
    fn defaults_without_report_section() {
        let adapter = FileConfigAdapter::from_string("[data]\npath = ./data\n").unwrap();
        let overrides = Overrides {
            ticker: Some("msft".into()),
            ..Overrides::default()
        };
        let req = cli::build_report_request(&adapter, &overrides).unwrap();

        assert_eq!(req.style, ReportStyle::Standard);
        assert_eq!(req.format, ReportFormat::Html);
        assert_eq!(req.options.theme, Theme::Dark);
        assert!(req.options.title.is_none());
        assert!(req.start_date <= date(1900, 1, 1));
        assert!(req.end_date >= date(2100, 1, 1));
        assert_eq!(req.output, PathBuf::from("MSFT_standard.html"));
    }

    #[test]
    fn missing_ticker() {
        let adapter = FileConfigAdapter::from_string("[data]\npath = ./data\n").unwrap();
        match cli::build_report_request(&adapter, &Overrides::default()) {
            Err(StockboardError::ConfigMissing { section, key }) => {
                assert_eq!(section, "report");
                assert_eq!(key, "ticker");
            }
            other => panic!("expected ConfigMissing, got {other:?}"),
        }
    }

    #[test]
    fn start_after_end_rejected() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            start: Some(date(2025, 1, 1)),
            ..Overrides::default()
        };
        let err = cli::build_report_request(&adapter, &overrides).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { .. }));
    }
}

mod validation_on_disk {
    use super::*;

    #[test]
    fn valid_file_passes() {
        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        validate_all(&adapter).unwrap();
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/stockboard.ini")
            .err()
            .unwrap();
        assert!(matches!(err, StockboardError::ConfigParse { .. }));
    }

    #[test]
    fn each_invalid_file_is_rejected() {
        for ini in [
            "[data]\nsource = parquet\npath = x\n",
            "[report]\nticker = X\n",
            "[data]\npath = x\n[report]\nstart_date = 2024/01/01\n",
            "[data]\npath = x\n[report]\nstart_date = 2024-02-01\nend_date = 2024-01-01\n",
            "[data]\npath = x\n[report]\nstyle = fancy\n",
            "[data]\npath = x\n[report]\ntheme = sepia\n",
            "[data]\npath = x\n[indicators]\nvolatility_window = ten\n",
        ] {
            let file = write_temp_ini(ini);
            let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
            assert!(validate_all(&adapter).is_err(), "accepted:\n{ini}");
        }
    }
}

mod data_source_selection {
    use super::*;

    #[test]
    fn unknown_source_rejected() {
        let adapter =
            FileConfigAdapter::from_string("[data]\nsource = parquet\npath = x\n").unwrap();
        let err = cli::open_data_port(&adapter).err().unwrap();
        assert!(matches!(err, StockboardError::ConfigInvalid { .. }));
    }

    #[test]
    fn csv_source_requires_path() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource = csv\n").unwrap();
        let err = cli::open_data_port(&adapter).err().unwrap();
        assert!(matches!(err, StockboardError::ConfigMissing { .. }));
    }

    #[test]
    fn csv_source_lists_files() {
        let dir = tempfile::TempDir::new().unwrap();
        write_csv(dir.path(), "AAPL", &generate_bars("2024-01-01", 3, 10.0));
        write_csv(dir.path(), "035720", &generate_bars("2024-01-01", 3, 10.0));
        let ini = format!("[data]\npath = {}\n", dir.path().display());
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();

        let port = cli::open_data_port(&adapter).unwrap();
        assert_eq!(port.list_symbols().unwrap(), vec!["035720", "AAPL"]);
        let (first, last, count) = port.get_data_range("AAPL").unwrap().unwrap();
        assert_eq!(first, date(2024, 1, 1));
        assert_eq!(last, date(2024, 1, 3));
        assert_eq!(count, 3);
    }
}
