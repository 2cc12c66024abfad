//! Inline SVG panels for the HTML dashboard.
//!
//! Every chart is a self-contained `<svg>` string. Undefined points break a
//! line into separate segments instead of being drawn as zero.

use askama::{Html, MarkupDisplay};
use chrono::NaiveDate;

use crate::domain::indicator::IndicatorRow;
use crate::domain::summary::ReturnHistogram;
use crate::ports::report_port::Theme;

use super::tables::fmt_compact;

pub const CHART_WIDTH: f64 = 900.0;
pub const PRICE_HEIGHT: f64 = 380.0;
pub const PANEL_HEIGHT: f64 = 200.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 30.0;
const MAX_CATEGORY_LABELS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub panel: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub grid: &'static str,
    pub up: &'static str,
    pub down: &'static str,
    pub ma: [&'static str; 4],
    pub band: &'static str,
    pub band_fill: &'static str,
    pub buy: &'static str,
    pub sell: &'static str,
    pub drawdown: &'static str,
    pub accent: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                background: "#0e1117",
                panel: "#262730",
                text: "#ffffff",
                muted: "#9e9e9e",
                grid: "rgba(128,128,128,0.2)",
                up: "#ff5252",
                down: "#448aff",
                ma: ["#ffeb3b", "#00e676", "#e040fb", "#ff9800"],
                band: "rgba(135,206,250,0.5)",
                band_fill: "rgba(135,206,250,0.1)",
                buy: "#00ff7f",
                sell: "#ff4500",
                drawdown: "#ef5350",
                accent: "#00e676",
            },
            Theme::Light => Palette {
                background: "#ffffff",
                panel: "#f8f9fa",
                text: "#31333f",
                muted: "#666666",
                grid: "rgba(128,128,128,0.2)",
                up: "#e53935",
                down: "#1e88e5",
                ma: ["#f9a825", "#2e7d32", "#8e24aa", "#ef6c00"],
                band: "rgba(30,136,229,0.5)",
                band_fill: "rgba(30,136,229,0.08)",
                buy: "#2e7d32",
                sell: "#d84315",
                drawdown: "#c62828",
                accent: "#00897b",
            },
        }
    }

    pub fn ma_color(&self, index: usize) -> &'static str {
        self.ma[index % self.ma.len()]
    }
}

/// Maps data coordinates onto the plot area of one chart.
struct Frame {
    count: usize,
    min: f64,
    max: f64,
    height: f64,
}

impl Frame {
    fn new(count: usize, min: f64, max: f64, height: f64) -> Self {
        let (min, max) = if max > min {
            (min, max)
        } else {
            let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.01 };
            (min - pad, max + pad)
        };
        Self {
            count,
            min,
            max,
            height,
        }
    }

    fn plot_width(&self) -> f64 {
        CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height(&self) -> f64 {
        self.height - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn bottom(&self) -> f64 {
        self.height - MARGIN_BOTTOM
    }

    /// x of the `i`-th point of a time series.
    fn x(&self, i: usize) -> f64 {
        if self.count <= 1 {
            return MARGIN_LEFT + self.plot_width() / 2.0;
        }
        MARGIN_LEFT + i as f64 / (self.count - 1) as f64 * self.plot_width()
    }

    /// Centre of the `i`-th category slot.
    fn slot_center(&self, i: usize) -> f64 {
        MARGIN_LEFT + (i as f64 + 0.5) * self.plot_width() / self.count.max(1) as f64
    }

    fn slot_width(&self, fill: f64) -> f64 {
        (self.plot_width() / self.count.max(1) as f64 * fill).max(1.0)
    }

    fn y(&self, v: f64) -> f64 {
        MARGIN_TOP + self.plot_height() - (v - self.min) / (self.max - self.min) * self.plot_height()
    }
}

fn open_svg(height: f64, title: &str, palette: &Palette) -> String {
    let mut svg = format!(
        r#"<svg width="100%" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
        CHART_WIDTH, height
    );
    svg.push_str(&format!(
        "\n  <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        palette.panel
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"18\" font-size=\"13\" fill=\"{}\">{}</text>\n",
        MARGIN_LEFT,
        palette.text,
        MarkupDisplay::new_unsafe(title, Html)
    ));
    svg
}

fn value_axis(svg: &mut String, frame: &Frame, palette: &Palette, label: impl Fn(f64) -> String) {
    for step in 0..=4 {
        let v = frame.min + (frame.max - frame.min) * step as f64 / 4.0;
        let y = frame.y(v);
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"/>\n",
            MARGIN_LEFT,
            y,
            CHART_WIDTH - MARGIN_RIGHT,
            y,
            palette.grid
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"{}\">{}</text>\n",
            MARGIN_LEFT - 5.0,
            y + 3.0,
            palette.muted,
            MarkupDisplay::new_unsafe(label(v), Html)
        ));
    }
}

fn date_axis(svg: &mut String, frame: &Frame, dates: &[NaiveDate], palette: &Palette) {
    if dates.is_empty() {
        return;
    }
    let mut picks = vec![0, dates.len() / 2, dates.len() - 1];
    picks.dedup();
    for i in picks {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" fill=\"{}\">{}</text>\n",
            frame.x(i),
            frame.height - 8.0,
            palette.muted,
            dates[i]
        ));
    }
}

fn category_axis(svg: &mut String, frame: &Frame, labels: &[String], palette: &Palette) {
    let stride = labels.len().div_ceil(MAX_CATEGORY_LABELS).max(1);
    for (i, label) in labels.iter().enumerate().step_by(stride) {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" fill=\"{}\">{}</text>\n",
            frame.slot_center(i),
            frame.height - 8.0,
            palette.muted,
            MarkupDisplay::new_unsafe(label, Html)
        ));
    }
}

fn rect(x: f64, top: f64, width: f64, height: f64, fill: &str) -> String {
    format!(
        "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
        x, top, width, height, fill
    )
}

fn triangle(x: f64, y: f64, pointing_up: bool, fill: &str) -> String {
    let (tip, base) = if pointing_up { (-7.0, 5.0) } else { (7.0, -5.0) };
    format!(
        "  <polygon class=\"{}\" points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{}\"/>\n",
        if pointing_up { "marker-buy" } else { "marker-down" },
        x,
        y + tip,
        x - 5.0,
        y + base,
        x + 5.0,
        y + base,
        fill
    )
}

fn stroke_path(d: &str, color: &str, width: f64) -> String {
    format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
        d, color, width
    )
}

/// SVG path data for `values`, lifting the pen over undefined points.
fn segmented_path(frame: &Frame, values: &[Option<f64>]) -> String {
    let mut d = String::new();
    let mut pen_down = false;
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => {
                if !d.is_empty() {
                    d.push(' ');
                }
                let cmd = if pen_down { 'L' } else { 'M' };
                d.push_str(&format!("{} {:.1} {:.1}", cmd, frame.x(i), frame.y(*v)));
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    d
}

/// Closed polygons between upper and lower bounds, one per defined run.
fn band_areas(frame: &Frame, bounds: &[Option<(f64, f64)>]) -> Vec<String> {
    let mut areas = Vec::new();
    let mut run: Vec<(usize, f64, f64)> = Vec::new();

    let mut flush = |run: &mut Vec<(usize, f64, f64)>| {
        if run.is_empty() {
            return;
        }
        let mut d = String::new();
        for (k, &(i, upper, _)) in run.iter().enumerate() {
            let cmd = if k == 0 { 'M' } else { 'L' };
            d.push_str(&format!("{} {:.1} {:.1} ", cmd, frame.x(i), frame.y(upper)));
        }
        for &(i, _, lower) in run.iter().rev() {
            d.push_str(&format!("L {:.1} {:.1} ", frame.x(i), frame.y(lower)));
        }
        d.push('Z');
        areas.push(d);
        run.clear();
    };

    for (i, bound) in bounds.iter().enumerate() {
        match bound {
            Some((upper, lower)) => run.push((i, *upper, *lower)),
            None => flush(&mut run),
        }
    }
    flush(&mut run);
    areas
}

fn dates_of(rows: &[IndicatorRow]) -> Vec<NaiveDate> {
    rows.iter().map(|r| r.bar.date).collect()
}

/// Candles with moving averages, the Bollinger channel and anomaly markers.
pub fn price_chart(rows: &[IndicatorRow], ma_windows: &[usize], palette: &Palette) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for r in rows {
        min = min.min(r.bar.low);
        max = max.max(r.bar.high);
        if let Some(band) = r.bollinger {
            min = min.min(band.lower);
            max = max.max(band.upper);
        }
    }
    let frame = Frame::new(rows.len(), min, max, PRICE_HEIGHT);

    let mut svg = open_svg(PRICE_HEIGHT, "Price", palette);
    value_axis(&mut svg, &frame, palette, fmt_compact);
    date_axis(&mut svg, &frame, &dates_of(rows), palette);

    let bounds: Vec<Option<(f64, f64)>> = rows
        .iter()
        .map(|r| r.bollinger.map(|b| (b.upper, b.lower)))
        .collect();
    let areas = band_areas(&frame, &bounds);
    for area in &areas {
        svg.push_str(&format!(
            "  <path class=\"band\" d=\"{}\" fill=\"{}\" stroke=\"none\"/>\n",
            area, palette.band_fill
        ));
    }
    let uppers: Vec<Option<f64>> = rows.iter().map(|r| r.bollinger.map(|b| b.upper)).collect();
    let lowers: Vec<Option<f64>> = rows.iter().map(|r| r.bollinger.map(|b| b.lower)).collect();
    for values in [&uppers, &lowers] {
        let d = segmented_path(&frame, values);
        if !d.is_empty() {
            svg.push_str(&stroke_path(&d, palette.band, 1.0));
        }
    }

    let body = frame.slot_width(0.7);
    for (i, r) in rows.iter().enumerate() {
        let color = if r.is_up { palette.up } else { palette.down };
        let x = frame.x(i);
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"/>\n",
            x,
            frame.y(r.bar.high),
            x,
            frame.y(r.bar.low),
            color
        ));
        let top = frame.y(r.bar.open.max(r.bar.close));
        let bottom = frame.y(r.bar.open.min(r.bar.close));
        svg.push_str(&rect(x - body / 2.0, top, body, (bottom - top).max(1.0), color));
    }

    let mut legend_x = CHART_WIDTH - MARGIN_RIGHT;
    for (k, &w) in ma_windows.iter().enumerate() {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.ma(w)).collect();
        let d = segmented_path(&frame, &values);
        if !d.is_empty() {
            svg.push_str(&stroke_path(&d, palette.ma_color(k), 1.5));
        }
    }
    for (k, &w) in ma_windows.iter().enumerate().rev() {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"18\" text-anchor=\"end\" font-size=\"11\" fill=\"{}\">MA{}</text>\n",
            legend_x,
            palette.ma_color(k),
            w
        ));
        legend_x -= 50.0;
    }

    for (i, r) in rows.iter().enumerate() {
        let y = frame.y(r.bar.close);
        if r.signal_buy() {
            svg.push_str(&triangle(frame.x(i), y, true, palette.buy));
        }
        if r.signal_down() {
            svg.push_str(&triangle(frame.x(i), y, false, palette.sell));
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Volume bars coloured by candle direction; signal days are highlighted and
/// the spike threshold is drawn as a dashed line.
pub fn volume_chart(rows: &[IndicatorRow], spike_threshold: Option<f64>, palette: &Palette) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let max = rows
        .iter()
        .map(|r| r.bar.volume as f64)
        .fold(0.0, f64::max)
        .max(spike_threshold.unwrap_or(0.0));
    let frame = Frame::new(rows.len(), 0.0, max, PANEL_HEIGHT);

    let mut svg = open_svg(PANEL_HEIGHT, "Volume", palette);
    value_axis(&mut svg, &frame, palette, fmt_compact);
    date_axis(&mut svg, &frame, &dates_of(rows), palette);

    let width = frame.slot_width(0.7);
    let base = frame.y(0.0);
    for (i, r) in rows.iter().enumerate() {
        let color = if r.signal_buy() {
            palette.buy
        } else if r.signal_down() {
            palette.sell
        } else if r.is_up {
            palette.up
        } else {
            palette.down
        };
        let top = frame.y(r.bar.volume as f64);
        svg.push_str(&rect(frame.x(i) - width / 2.0, top, width, base - top, color));
    }

    if let Some(threshold) = spike_threshold {
        let y = frame.y(threshold);
        svg.push_str(&format!(
            "  <line class=\"spike-threshold\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-dasharray=\"4 3\" stroke-width=\"1\"/>\n",
            MARGIN_LEFT,
            y,
            CHART_WIDTH - MARGIN_RIGHT,
            y,
            palette.muted
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Line over a date axis, e.g. cumulative return or rolling volatility.
pub fn line_chart(
    title: &str,
    dates: &[NaiveDate],
    values: &[Option<f64>],
    color: &str,
    palette: &Palette,
) -> String {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        return String::new();
    }
    let min = defined.iter().copied().fold(f64::INFINITY, f64::min);
    let max = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let frame = Frame::new(values.len(), min, max, PANEL_HEIGHT);

    let mut svg = open_svg(PANEL_HEIGHT, title, palette);
    value_axis(&mut svg, &frame, palette, |v| format!("{v:.1}%"));
    date_axis(&mut svg, &frame, dates, palette);
    svg.push_str(&stroke_path(&segmented_path(&frame, values), color, 1.5));
    svg.push_str("</svg>");
    svg
}

/// Area between `values` and zero, used for the drawdown panel.
pub fn area_chart(
    title: &str,
    dates: &[NaiveDate],
    values: &[f64],
    color: &str,
    palette: &Palette,
) -> String {
    if values.is_empty() {
        return String::new();
    }
    let min = values.iter().copied().fold(0.0, f64::min);
    let max = values.iter().copied().fold(0.0, f64::max);
    let frame = Frame::new(values.len(), min, max, PANEL_HEIGHT);

    let mut svg = open_svg(PANEL_HEIGHT, title, palette);
    value_axis(&mut svg, &frame, palette, |v| format!("{v:.1}%"));
    date_axis(&mut svg, &frame, dates, palette);

    let zero = frame.y(0.0);
    let mut d = format!("M {:.1} {:.1}", frame.x(0), zero);
    for (i, &v) in values.iter().enumerate() {
        d.push_str(&format!(" L {:.1} {:.1}", frame.x(i), frame.y(v)));
    }
    d.push_str(&format!(" L {:.1} {:.1} Z", frame.x(values.len() - 1), zero));
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"{}\" fill-opacity=\"0.3\" stroke=\"{}\" stroke-width=\"1\"/>\n",
        d, color, color
    ));
    svg.push_str("</svg>");
    svg
}

/// Categorical bars from zero. With `color = None` bars are coloured by
/// sign using the palette's up/down colours.
pub fn bar_chart(
    title: &str,
    labels: &[String],
    values: &[f64],
    color: Option<&str>,
    palette: &Palette,
    label: impl Fn(f64) -> String,
) -> String {
    if values.is_empty() {
        return String::new();
    }
    let min = values.iter().copied().fold(0.0, f64::min);
    let max = values.iter().copied().fold(0.0, f64::max);
    let frame = Frame::new(values.len(), min, max, PANEL_HEIGHT);

    let mut svg = open_svg(PANEL_HEIGHT, title, palette);
    value_axis(&mut svg, &frame, palette, label);
    category_axis(&mut svg, &frame, labels, palette);

    let width = frame.slot_width(0.7);
    let zero = frame.y(0.0);
    for (i, &v) in values.iter().enumerate() {
        let fill = color.unwrap_or(if v >= 0.0 { palette.up } else { palette.down });
        let y = frame.y(v);
        let (top, height) = if y <= zero { (y, zero - y) } else { (zero, y - zero) };
        svg.push_str(&rect(frame.slot_center(i) - width / 2.0, top, width, height, fill));
    }
    svg.push_str("</svg>");
    svg
}

/// Daily-return distribution; empty bins draw nothing.
pub fn histogram_chart(histogram: &ReturnHistogram, palette: &Palette) -> String {
    if histogram.counts.is_empty() {
        return String::new();
    }
    let max = histogram.counts.iter().copied().max().unwrap_or(0) as f64;
    let frame = Frame::new(histogram.counts.len(), 0.0, max, PANEL_HEIGHT);

    let mut svg = open_svg(PANEL_HEIGHT, "Daily return distribution", palette);
    value_axis(&mut svg, &frame, palette, |v| format!("{v:.0}"));

    let bins = histogram.counts.len();
    let edges = [
        (0, histogram.lower),
        (bins / 2, histogram.lower + histogram.bin_width() * (bins / 2) as f64),
        (bins - 1, histogram.upper),
    ];
    for (i, edge) in edges {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" fill=\"{}\">{:.1}%</text>\n",
            frame.slot_center(i),
            frame.height - 8.0,
            palette.muted,
            edge
        ));
    }

    let width = frame.slot_width(0.95);
    let base = frame.bottom();
    for (i, &count) in histogram.counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let top = frame.y(count as f64);
        svg.push_str(&rect(
            frame.slot_center(i) - width / 2.0,
            top,
            width,
            base - top,
            palette.accent,
        ));
    }
    svg.push_str("</svg>");
    svg
}
