//! Forecast accuracy metrics.

use crate::core::MonthlySeries;
use crate::error::{ForecastError, Result};

/// Out-of-sample accuracy of one (actual, predicted) pairing.
///
/// Computed once per evaluation and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean absolute percentage error.
    pub mape: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Coefficient of determination; `NaN` when the actuals are constant.
    pub r_squared: f64,
}

impl AccuracyMetrics {
    /// Whether the coefficient of determination is defined (the actual
    /// series had non-zero variance).
    pub fn r_squared_defined(&self) -> bool {
        !self.r_squared.is_nan()
    }
}

/// Compare an actual series against a predicted one.
///
/// The two series must cover exactly the same months. A zero in the actual
/// values makes the percentage error undefined and fails the call; a
/// constant actual series leaves `r_squared` as `NaN` rather than dividing
/// by a zero total variance.
pub fn evaluate(actual: &MonthlySeries, predicted: &MonthlySeries) -> Result<AccuracyMetrics> {
    actual.check_aligned(predicted, "evaluate")?;

    let a = actual.values();
    let p = predicted.values();
    let n = a.len() as f64;

    if let Some(i) = a.iter().position(|v| *v == 0.0) {
        return Err(ForecastError::DivisionByZero {
            quantity: actual.name().to_string(),
            operation: "evaluate",
            detail: format!(
                "actual value in {} is zero",
                actual.months()[i].format("%Y-%m")
            ),
        });
    }

    let mape = a
        .iter()
        .zip(p.iter())
        .map(|(a, p)| ((a - p) / a).abs())
        .sum::<f64>()
        * 100.0
        / n;

    let ss_res: f64 = a.iter().zip(p.iter()).map(|(a, p)| (a - p).powi(2)).sum();
    let rmse = (ss_res / n).sqrt();

    let mean = a.iter().sum::<f64>() / n;
    let ss_tot: f64 = a.iter().map(|v| (v - mean).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 {
        f64::NAN
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(AccuracyMetrics {
        mape,
        rmse,
        r_squared,
    })
}
