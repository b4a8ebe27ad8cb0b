//! Error types for the sop-forecast library.
//!
//! Every variant names the quantity (series) it refers to and the operation
//! that was in progress, so a failure can be diagnosed from the message
//! alone.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while fitting, forecasting, or evaluating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Too few historical points for the requested operation.
    #[error("{quantity}: insufficient data for {operation}: need at least {needed}, got {got}")]
    InsufficientData {
        quantity: String,
        operation: &'static str,
        needed: usize,
        got: usize,
    },

    /// Two series that must line up differ in length or month index, or a
    /// series violates the gap-free monthly cadence.
    #[error("{quantity}: misaligned series in {operation}: {detail}")]
    MisalignedSeries {
        quantity: String,
        operation: &'static str,
        detail: String,
    },

    /// A non-positive forecast horizon was requested.
    #[error("{quantity}: invalid horizon {horizon} in {operation}: horizon must be positive")]
    InvalidHorizon {
        quantity: String,
        operation: &'static str,
        horizon: usize,
    },

    /// A zero denominator in percentage-error or service-level arithmetic.
    #[error("{quantity}: division by zero in {operation}: {detail}")]
    DivisionByZero {
        quantity: String,
        operation: &'static str,
        detail: String,
    },

    /// The coefficient optimizer failed, or the model was used before fitting.
    #[error("{quantity}: model fit failure in {operation}: {detail}")]
    ModelFit {
        quantity: String,
        operation: &'static str,
        detail: String,
    },

    /// Reading or writing a forecast table failed.
    #[error("persistence failure in {operation}: {detail}")]
    Persistence {
        operation: &'static str,
        detail: String,
    },
}
