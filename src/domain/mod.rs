//! Core domain types and logic: price series, indicators, statistics.

pub mod config_validation;
pub mod engine;
pub mod engine_config;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod summary;
