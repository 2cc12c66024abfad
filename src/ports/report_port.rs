//! Report generation port trait.

use std::fmt;
use std::str::FromStr;

use crate::domain::engine::IndicatorReport;
use crate::domain::error::StockboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}' (expected dark or light)")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{other}' (expected html or json)")),
        }
    }
}

/// Presentation settings passed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Page heading; renderers fall back to the ticker when `None`.
    pub title: Option<String>,
    pub theme: Theme,
}

impl ReportOptions {
    pub fn title_for(&self, report: &IndicatorReport) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} Stock Dashboard", report.ticker))
    }
}

/// Port for writing indicator reports.
pub trait ReportPort {
    fn write(
        &self,
        report: &IndicatorReport,
        options: &ReportOptions,
        output_path: &str,
    ) -> Result<(), StockboardError>;
}
