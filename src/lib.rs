//! # sop-forecast
//!
//! Seasonal demand/supply forecasting for sales & operations planning.
//!
//! Fits a seasonal ARIMA model per quantity to a monthly history, scores
//! out-of-sample accuracy on a train/test split, and projects a
//! multi-month forecast with the derived availability gap and service
//! level per month.
//!
//! ```
//! use chrono::NaiveDate;
//! use sop_forecast::prelude::*;
//! use sop_forecast::sim::{simulate, SimulationConfig};
//!
//! let history = simulate(&SimulationConfig::default()).unwrap();
//! let engine = ForecastEngine::new(history.demand, history.supply).unwrap();
//!
//! let split = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
//! let report = engine.train_and_evaluate(split).unwrap();
//! assert!(report.demand.mape < 100.0);
//!
//! let train_end = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! let table = engine.forecast_future(18, train_end).unwrap();
//! assert_eq!(table.len(), 18);
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod sim;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{ForecastRecord, ForecastTable, MonthlySeries};
    pub use crate::engine::{EvaluationReport, ForecastEngine};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{SarimaSpec, SeasonalModel};
    pub use crate::utils::{evaluate, AccuracyMetrics};
}
