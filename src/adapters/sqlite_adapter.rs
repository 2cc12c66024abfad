//! SQLite data adapter.

use crate::domain::config_validation::DATE_FORMAT;
use crate::domain::error::StockboardError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::{debug, info};

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_error(e: rusqlite::Error) -> StockboardError {
    StockboardError::source_unavailable(format!("query failed: {e}"))
}

fn parse_stored_date(raw: &str) -> Result<NaiveDate, StockboardError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        StockboardError::source_unavailable(format!("stored date '{raw}' is malformed: {e}"))
    })
}

/// Text form of a query bound. Dates are stored as `YYYY-MM-DD`, so bounds
/// outside four-digit years are clamped to keep string ordering valid.
fn date_bound(date: NaiveDate) -> String {
    let lo = NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN);
    let hi = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX);
    date.clamp(lo, hi).format(DATE_FORMAT).to_string()
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockboardError> {
        let db_path = config
            .get_string("data", "path")
            .ok_or_else(|| StockboardError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?;
        let pool_size = config.get_int("data", "pool_size", 4).max(1) as u32;

        info!(path = %db_path, pool_size, "opening sqlite database");
        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| StockboardError::source_unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, StockboardError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StockboardError::source_unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockboardError> {
        self.pool
            .get()
            .map_err(|e| StockboardError::source_unavailable(e.to_string()))
    }

    pub fn initialize_schema(&self) -> Result<(), StockboardError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS daily_prices (
                    ticker TEXT NOT NULL,
                    date TEXT NOT NULL,
                    open REAL NOT NULL,
                    high REAL NOT NULL,
                    low REAL NOT NULL,
                    close REAL NOT NULL,
                    volume INTEGER NOT NULL,
                    PRIMARY KEY (ticker, date)
                );
                CREATE INDEX IF NOT EXISTS idx_daily_prices_date ON daily_prices(date);",
            )
            .map_err(query_error)
    }

    /// Upserts `bars` for `ticker` in a single transaction.
    pub fn insert_bars(&self, ticker: &str, bars: &[PriceBar]) -> Result<(), StockboardError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for (index, bar) in bars.iter().enumerate() {
            let volume = i64::try_from(bar.volume).map_err(|_| StockboardError::InvalidBar {
                index,
                date: bar.date,
                reason: format!("volume {} does not fit an INTEGER column", bar.volume),
            })?;
            tx.execute(
                "INSERT OR REPLACE INTO daily_prices (ticker, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    ticker,
                    bar.date.format(DATE_FORMAT).to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    volume
                ],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)?;
        debug!(ticker, bars = bars.len(), "stored bars");
        Ok(())
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_daily_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, StockboardError> {
        let conn = self.conn()?;
        let start_str = date_bound(start_date);
        let end_str = date_bound(end_date);

        let mut stmt = conn
            .prepare(
                "SELECT date, open, high, low, close, volume
                 FROM daily_prices
                 WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![ticker, start_str, end_str], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(query_error)?;

        let mut bars = Vec::new();
        for row in rows {
            let (date, open, high, low, close, volume) = row.map_err(query_error)?;
            let date = parse_stored_date(&date)?;
            let volume = u64::try_from(volume).map_err(|_| StockboardError::InvalidBar {
                index: bars.len(),
                date,
                reason: format!("volume must be non-negative, got {volume}"),
            })?;
            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        if bars.is_empty() {
            return Err(StockboardError::NoData {
                ticker: ticker.to_string(),
            });
        }
        debug!(ticker, bars = bars.len(), "loaded bars from sqlite");
        PriceSeries::new(ticker, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockboardError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT ticker FROM daily_prices ORDER BY ticker")
            .map_err(query_error)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockboardError> {
        let conn = self.conn()?;
        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM daily_prices WHERE ticker = ?1",
                params![ticker],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match result {
            (Some(min), Some(max), count) if count > 0 => Ok(Some((
                parse_stored_date(&min)?,
                parse_stored_date(&max)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}
