//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report::HtmlReportAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::{
    optional_bool, optional_date, optional_number, optional_parsed, parse_ma_windows, validate_all,
};
use crate::domain::engine::{self, IndicatorReport};
use crate::domain::engine_config::{EngineConfig, ReportStyle};
use crate::domain::error::StockboardError;
use crate::domain::indicator::anomaly::AnomalyConfig;
use crate::domain::indicator::bollinger::BollingerConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportFormat, ReportOptions, ReportPort, Theme};

#[derive(Parser, Debug)]
#[command(
    name = "stockboard",
    about = "Technical-indicator dashboards for daily stock prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators for one ticker and write a report
    Report {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// First date, YYYY-MM-DD
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date, YYYY-MM-DD
        #[arg(long)]
        end: Option<NaiveDate>,
        /// standard, kakao or annual
        #[arg(long)]
        style: Option<ReportStyle>,
        /// html or json
        #[arg(long)]
        format: Option<ReportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// dark or light
        #[arg(long)]
        theme: Option<Theme>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available date range for a ticker (or every ticker)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// List tickers available in the configured data source
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ticker: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub style: Option<ReportStyle>,
    pub format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
    pub theme: Option<Theme>,
}

/// Everything needed to produce one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub style: ReportStyle,
    pub format: ReportFormat,
    pub output: PathBuf,
    pub options: ReportOptions,
    pub engine: EngineConfig,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Report {
            config,
            ticker,
            start,
            end,
            style,
            format,
            output,
            theme,
        } => run_report(
            &config,
            &Overrides {
                ticker,
                start,
                end,
                style,
                format,
                output,
                theme,
            },
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn fail(err: &StockboardError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Applies the `[indicators]` section on top of the style preset.
pub fn build_engine_config(
    config: &dyn ConfigPort,
    style: ReportStyle,
) -> Result<EngineConfig, StockboardError> {
    const S: &str = "indicators";
    let mut engine = style.engine_config();

    if let Some(raw) = config.get_string(S, "ma_windows") {
        let windows = parse_ma_windows(&raw)?;
        if !windows.is_empty() {
            engine.ma_windows = windows;
        }
    }

    match optional_bool(config, S, "bollinger")? {
        Some(false) => engine.bollinger = None,
        Some(true) if engine.bollinger.is_none() => {
            engine.bollinger = Some(BollingerConfig::default())
        }
        _ => {}
    }
    if let Some(bb) = engine.bollinger.as_mut() {
        if let Some(period) = optional_number(config, S, "bollinger_period")? {
            bb.period = period;
        }
        if let Some(mult) = optional_number(config, S, "bollinger_multiplier")? {
            bb.multiplier = mult;
        }
    }

    match optional_bool(config, S, "anomaly_signals")? {
        Some(false) => engine.anomaly = None,
        Some(true) if engine.anomaly.is_none() => engine.anomaly = Some(AnomalyConfig::default()),
        _ => {}
    }
    if let Some(an) = engine.anomaly.as_mut() {
        if let Some(p) = optional_number(config, S, "volume_percentile")? {
            an.volume_percentile = p;
        }
        if let Some(p) = optional_number(config, S, "upper_percentile")? {
            an.upper_percentile = p;
        }
        if let Some(p) = optional_number(config, S, "lower_percentile")? {
            an.lower_percentile = p;
        }
    }

    if let Some(w) = optional_number(config, S, "volatility_window")? {
        engine.volatility_window = w;
    }
    if let Some(sigma) = optional_number(config, S, "volume_spike_sigma")? {
        engine.volume_spike_sigma = sigma;
    }
    if let Some(rf) = optional_number(config, S, "risk_free_pct")? {
        engine.risk_free_pct = rf;
    }
    if let Some(days) = optional_number(config, S, "trading_days_per_year")? {
        engine.trading_days_per_year = days;
    }

    engine.validate()?;
    Ok(engine)
}

pub fn build_report_request(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<ReportRequest, StockboardError> {
    let ticker = overrides
        .ticker
        .clone()
        .or_else(|| config.get_string("report", "ticker"))
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StockboardError::ConfigMissing {
            section: "report".into(),
            key: "ticker".into(),
        })?;

    let start_date = match overrides.start {
        Some(d) => d,
        None => optional_date(config, "report", "start_date")?.unwrap_or(NaiveDate::MIN),
    };
    let end_date = match overrides.end {
        Some(d) => d,
        None => optional_date(config, "report", "end_date")?.unwrap_or(NaiveDate::MAX),
    };
    if start_date > end_date {
        return Err(StockboardError::ConfigInvalid {
            section: "report".into(),
            key: "start_date".into(),
            reason: format!("start date {start_date} is after end date {end_date}"),
        });
    }

    let style = match overrides.style {
        Some(s) => s,
        None => optional_parsed(config, "report", "style")?.unwrap_or_default(),
    };
    let format = match overrides.format {
        Some(f) => f,
        None => optional_parsed(config, "report", "format")?.unwrap_or_default(),
    };
    let theme = match overrides.theme {
        Some(t) => t,
        None => optional_parsed(config, "report", "theme")?.unwrap_or_default(),
    };
    let output = overrides
        .output
        .clone()
        .or_else(|| config.get_string("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("{ticker}_{style}.{}", format.extension())));

    let engine = build_engine_config(config, style)?;

    Ok(ReportRequest {
        ticker,
        start_date,
        end_date,
        style,
        format,
        output,
        options: ReportOptions {
            title: config
                .get_string("report", "title")
                .filter(|t| !t.trim().is_empty()),
            theme,
        },
        engine,
    })
}

pub fn open_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, StockboardError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    match source.trim().to_lowercase().as_str() {
        "csv" => {
            let path = config
                .get_string("data", "path")
                .ok_or_else(|| StockboardError::ConfigMissing {
                    section: "data".into(),
                    key: "path".into(),
                })?;
            info!(path = %path, "using csv data source");
            Ok(Box::new(CsvAdapter::new(path)))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(config)?))
        }
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(StockboardError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "built without the sqlite feature".into(),
        }),
        other => Err(StockboardError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown data source '{other}'"),
        }),
    }
}

pub fn report_writer(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Html => Box::new(HtmlReportAdapter::new()),
        ReportFormat::Json => Box::new(JsonReportAdapter::new()),
    }
}

/// Fetch, compute and write. Returns the computed report for the console
/// summary.
pub fn run_report_pipeline(
    data_port: &dyn DataPort,
    request: &ReportRequest,
) -> Result<IndicatorReport, StockboardError> {
    let series =
        data_port.fetch_daily_prices(&request.ticker, request.start_date, request.end_date)?;
    info!(
        ticker = %request.ticker,
        bars = series.len(),
        style = %request.style,
        "computing indicators"
    );

    let report = engine::compute(&series, &request.engine)?;
    report_writer(request.format).write(
        &report,
        &request.options,
        &request.output.to_string_lossy(),
    )?;
    Ok(report)
}

pub fn print_summary(report: &IndicatorReport) {
    let s = &report.summary;
    eprintln!(
        "\n=== {} ({} to {}) ===",
        report.ticker,
        report.rows.first().map(|r| r.bar.date.to_string()).unwrap_or_default(),
        report.latest.date
    );
    eprintln!(
        "Last close:       {:.2} ({:+.2}, {:+.2}%)",
        report.latest.close, report.latest.change, report.latest.change_pct
    );
    eprintln!("Period return:    {:+.2}%", s.period_return_pct);
    eprintln!("High / Low:       {:.2} / {:.2}", s.high_price, s.low_price);
    eprintln!("Max drawdown:     {:.2}%", s.max_drawdown_pct);
    eprintln!(
        "Up / Down days:   {} / {} ({:.1}% win rate)",
        s.up_days, s.down_days, s.win_rate_pct
    );
    eprintln!("Volatility (ann): {:.2}%", s.annualized_volatility_pct);
    eprintln!("Sharpe ratio:     {:.2}", s.sharpe_ratio);

    if report.thresholds.is_some() {
        let buys = report.rows.iter().filter(|r| r.signal_buy()).count();
        let downs = report.rows.iter().filter(|r| r.signal_down()).count();
        eprintln!("Signals:          {buys} buy, {downs} down");
    }
}

fn run_report(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&config) {
        return fail(&e);
    }
    let request = match build_report_request(&config, overrides) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let data_port = match open_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    match run_report_pipeline(data_port.as_ref(), &request) {
        Ok(report) => {
            print_summary(&report);
            eprintln!("\nReport written to: {}", request.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&config) {
        return fail(&e);
    }

    let style: ReportStyle = optional_parsed(&config, "report", "style")
        .ok()
        .flatten()
        .unwrap_or_default();
    let engine = match build_engine_config(&config, style) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };

    eprintln!("Style:      {style}");
    let overlays: Vec<String> = engine.overlays().iter().map(ToString::to_string).collect();
    eprintln!("Overlays:   {}", overlays.join(", "));
    eprintln!(
        "Signals:    {}",
        if engine.anomaly.is_some() { "enabled" } else { "disabled" }
    );
    match config.get_string("report", "ticker") {
        Some(t) => eprintln!("Ticker:     {t}"),
        None => warn!("no [report] ticker configured; pass --ticker when running a report"),
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, ticker: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data_port = match open_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let tickers = match ticker
        .map(str::to_string)
        .or_else(|| config.get_string("report", "ticker"))
    {
        Some(t) => vec![t.trim().to_uppercase()],
        None => match data_port.list_symbols() {
            Ok(symbols) => symbols,
            Err(e) => return fail(&e),
        },
    };

    for t in &tickers {
        match data_port.get_data_range(t) {
            Ok(Some((first, last, count))) => {
                println!("{t}: {count} bars, {first} to {last}");
            }
            Ok(None) => eprintln!("{t}: no data found"),
            Err(e) => eprintln!("error querying {t}: {e}"),
        }
    }
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data_port = match open_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    match data_port.list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found");
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{symbol}");
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
