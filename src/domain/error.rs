//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stockboard.
#[derive(Debug, thiserror::Error)]
pub enum StockboardError {
    #[error("price series is empty: nothing to compute")]
    EmptySeries,

    #[error("invalid bar at index {index} ({date}): {reason}")]
    InvalidBar {
        index: usize,
        date: NaiveDate,
        reason: String,
    },

    #[error("bar at index {index} ({date}) is not after the previous bar")]
    UnorderedSeries { index: usize, date: NaiveDate },

    #[error("invalid indicator configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("data source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report rendering failed: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockboardError {
    pub(crate) fn source_unavailable(reason: impl Into<String>) -> Self {
        StockboardError::SourceUnavailable {
            reason: reason.into(),
        }
    }
}

impl From<&StockboardError> for std::process::ExitCode {
    fn from(err: &StockboardError) -> Self {
        let code: u8 = match err {
            StockboardError::Io(_) | StockboardError::Render { .. } => 1,
            StockboardError::ConfigParse { .. }
            | StockboardError::ConfigMissing { .. }
            | StockboardError::ConfigInvalid { .. }
            | StockboardError::InvalidConfig { .. } => 2,
            StockboardError::SourceUnavailable { .. } => 3,
            StockboardError::NoData { .. } | StockboardError::EmptySeries => 5,
            StockboardError::InvalidBar { .. } | StockboardError::UnorderedSeries { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
