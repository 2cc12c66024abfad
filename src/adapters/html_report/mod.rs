//! HTML dashboard adapter implementing ReportPort.
//!
//! Renders `templates/report.html` with askama into one self-contained file
//! with inline CSS and SVG. No scripts or external assets are referenced.

pub mod chart_svg;
pub mod tables;

use std::fs;
use std::path::Path;

use askama::Template;
use tracing::info;

use crate::domain::engine::IndicatorReport;
use crate::domain::error::StockboardError;
use crate::domain::indicator::IndicatorKind;
use crate::domain::summary::ReturnHistogram;
use crate::ports::report_port::{ReportOptions, ReportPort};

use chart_svg::Palette;
use tables::{Table, Tile, fmt_compact, month_label};

struct ChartPanel {
    heading: String,
    svg: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: String,
    ticker: &'a str,
    first_date: String,
    last_date: String,
    trading_days: usize,
    palette: Palette,
    tiles: Vec<Tile>,
    charts: Vec<ChartPanel>,
    tables: Vec<Table>,
}

/// One value per calendar month, January first; months without data are 0.
fn by_calendar_month(values: &[(u32, f64)]) -> Vec<f64> {
    (1..=12)
        .map(|month| {
            values
                .iter()
                .find(|(m, _)| *m == month)
                .map_or(0.0, |&(_, v)| v)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        report: &IndicatorReport,
        options: &ReportOptions,
    ) -> Result<String, StockboardError> {
        let palette = Palette::for_theme(options.theme);
        let rows = &report.rows;
        let dates: Vec<_> = rows.iter().map(|r| r.bar.date).collect();

        let mut charts = Vec::new();
        let mut chart = |heading: String, svg: String| {
            if !svg.is_empty() {
                charts.push(ChartPanel { heading, svg });
            }
        };

        let overlays: Vec<String> = report
            .config
            .overlays()
            .iter()
            .map(ToString::to_string)
            .collect();
        chart(
            format!("Price ({})", overlays.join(", ")),
            chart_svg::price_chart(rows, &report.config.ma_windows, &palette),
        );
        chart(
            "Volume".to_string(),
            chart_svg::volume_chart(rows, report.volume_spike_threshold, &palette),
        );
        chart(
            IndicatorKind::Drawdown.to_string(),
            chart_svg::area_chart(
                "Drawdown (%)",
                &dates,
                &rows.iter().map(|r| r.drawdown_pct).collect::<Vec<_>>(),
                palette.drawdown,
                &palette,
            ),
        );
        chart(
            IndicatorKind::CumulativeReturn.to_string(),
            chart_svg::line_chart(
                "Cumulative return (%)",
                &dates,
                &rows.iter().map(|r| Some(r.cumulative_return_pct)).collect::<Vec<_>>(),
                palette.accent,
                &palette,
            ),
        );
        chart(
            IndicatorKind::RollingVolatility(report.config.volatility_window).to_string(),
            chart_svg::line_chart(
                "Std of daily return (%)",
                &dates,
                &rows.iter().map(|r| r.rolling_volatility).collect::<Vec<_>>(),
                palette.ma_color(2),
                &palette,
            ),
        );

        let month_labels: Vec<String> = (1..=12).map(|m| month_label(m).to_string()).collect();
        chart(
            "Monthly return".to_string(),
            chart_svg::bar_chart(
                "Return (%)",
                &month_labels,
                &by_calendar_month(&report.summary.monthly_returns()),
                None,
                &palette,
                |v| format!("{v:.1}%"),
            ),
        );
        chart(
            "Monthly average trade value".to_string(),
            chart_svg::bar_chart(
                "Close x volume",
                &month_labels,
                &by_calendar_month(&report.summary.monthly_avg_trade_value()),
                Some(palette.accent),
                &palette,
                fmt_compact,
            ),
        );
        if let Some(hist) = ReturnHistogram::from_rows(rows, ReturnHistogram::DEFAULT_BINS) {
            chart(
                "Daily return distribution".to_string(),
                chart_svg::histogram_chart(&hist, &palette),
            );
        }

        let mut sections = vec![tables::statistics_table(
            &report.summary,
            report.config.risk_free_pct,
        )];
        if let Some(thresholds) = &report.thresholds {
            sections.push(tables::thresholds_table(thresholds));
        }
        sections.push(tables::monthly_table(&report.summary.monthly));

        let template = ReportTemplate {
            title: options.title_for(report),
            ticker: &report.ticker,
            first_date: dates.first().map(ToString::to_string).unwrap_or_default(),
            last_date: dates.last().map(ToString::to_string).unwrap_or_default(),
            trading_days: rows.len(),
            palette,
            tiles: tables::kpi_tiles(report),
            charts,
            tables: sections,
        };
        template.render().map_err(|e| StockboardError::Render {
            reason: e.to_string(),
        })
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        report: &IndicatorReport,
        options: &ReportOptions,
        output_path: &str,
    ) -> Result<(), StockboardError> {
        let html = self.render(report, options)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;
        info!(path = output_path, "html report written");
        Ok(())
    }
}
