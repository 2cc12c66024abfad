//! Data access port trait.

use crate::domain::error::StockboardError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `ticker` within `[start_date, end_date]`, ascending by
    /// date. Fails with `NoData` when the range holds no bars.
    fn fetch_daily_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, StockboardError>;

    fn list_symbols(&self) -> Result<Vec<String>, StockboardError>;

    /// First date, last date and bar count, or `None` for an unknown ticker.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockboardError>;
}
