//! Core data structures: monthly series and the forecast output table.

mod series;
mod table;

pub use series::{month_floor, MonthlySeries};
pub use table::{ForecastRecord, ForecastTable};
