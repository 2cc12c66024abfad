//! Number formatting plus the KPI tiles and tables the report template renders.

use crate::domain::engine::IndicatorReport;
use crate::domain::indicator::anomaly::AnomalyThresholds;
use crate::domain::summary::{MonthlyBreakdown, SummaryStatistics};

/// Placeholder for undefined values.
pub const MISSING: &str = "—";

/// Fixed-point number with thousands separators, e.g. `1,234,567.89`.
pub fn fmt_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Short axis label: `950`, `12.5K`, `3.40M`, `1.20B`.
pub fn fmt_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e4 {
        format!("{:.1}K", value / 1e3)
    } else if abs >= 100.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn fmt_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}

pub fn fmt_opt_pct(value: Option<f64>) -> String {
    value.map(fmt_pct).unwrap_or_else(|| MISSING.to_string())
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short name of calendar month `1..=12`.
pub fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or(MISSING)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub label: String,
    pub value: String,
    pub class: &'static str,
}

impl Tile {
    fn new(label: impl Into<String>, value: impl Into<String>, class: &'static str) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            class,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub heading: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

fn sign_class(value: f64) -> &'static str {
    if value > 0.0 {
        "pos"
    } else if value < 0.0 {
        "neg"
    } else {
        ""
    }
}

pub fn kpi_tiles(report: &IndicatorReport) -> Vec<Tile> {
    let s = &report.summary;
    let latest = &report.latest;

    vec![
        Tile::new(
            format!("Latest close ({})", latest.date),
            format!(
                "{} ({} / {})",
                fmt_number(latest.close, 2),
                fmt_number(latest.change, 2),
                fmt_pct(latest.change_pct)
            ),
            sign_class(latest.change),
        ),
        Tile::new("Start price", fmt_number(s.start_price, 2), ""),
        Tile::new("End price", fmt_number(s.end_price, 2), ""),
        Tile::new(
            "Period return",
            fmt_pct(s.period_return_pct),
            sign_class(s.period_return_pct),
        ),
        Tile::new("High", fmt_number(s.high_price, 2), ""),
        Tile::new("Low", fmt_number(s.low_price, 2), ""),
        Tile::new("Max drawdown", fmt_pct(s.max_drawdown_pct), "neg"),
    ]
}

pub fn statistics_table(summary: &SummaryStatistics, risk_free_pct: f64) -> Table {
    let rows = vec![
        vec!["Trading days".into(), summary.total_days.to_string()],
        vec!["Up days".into(), summary.up_days.to_string()],
        vec!["Down days".into(), summary.down_days.to_string()],
        vec!["Win rate".into(), format!("{:.2}%", summary.win_rate_pct)],
        vec!["Average gain".into(), fmt_opt_pct(summary.avg_gain_pct)],
        vec!["Average loss".into(), fmt_opt_pct(summary.avg_loss_pct)],
        vec!["Profit/loss ratio".into(), format!("{:.2}", summary.profit_loss_ratio)],
        vec![
            "Annualized volatility".into(),
            format!("{:.2}%", summary.annualized_volatility_pct),
        ],
        vec![
            format!("Sharpe ratio (rf {risk_free_pct}%)"),
            format!("{:.2}", summary.sharpe_ratio),
        ],
    ];
    Table {
        heading: "Statistics",
        headers: vec!["Metric", "Value"],
        rows,
    }
}

pub fn thresholds_table(thresholds: &AnomalyThresholds) -> Table {
    let rows = vec![
        vec![
            "Volume upper percentile".into(),
            fmt_number(thresholds.volume_upper, 0),
        ],
        vec![
            "Return upper percentile".into(),
            fmt_pct(thresholds.return_upper),
        ],
        vec![
            "Return lower percentile".into(),
            fmt_pct(thresholds.return_lower),
        ],
        vec!["Sample rows".into(), thresholds.samples.to_string()],
    ];
    Table {
        heading: "Anomaly signals",
        headers: vec!["Signal threshold", "Value"],
        rows,
    }
}

pub fn monthly_table(monthly: &[MonthlyBreakdown]) -> Table {
    let rows = monthly
        .iter()
        .map(|m| {
            vec![
                month_label(m.month).to_string(),
                fmt_number(m.first_close, 2),
                fmt_number(m.last_close, 2),
                fmt_pct(m.return_pct),
                fmt_number(m.avg_trade_value, 0),
                m.trading_days.to_string(),
            ]
        })
        .collect();
    Table {
        heading: "Monthly breakdown",
        headers: vec!["Month", "First close", "Last close", "Return", "Avg trade value", "Days"],
        rows,
    }
}
