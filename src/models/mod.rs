//! Seasonal forecasting model and its differencing transforms.

pub mod diff;
mod sarima;

pub use diff::{difference, integrate, seasonal_difference, seasonal_integrate};
pub use sarima::{SarimaSpec, SeasonalModel};
