//! Seasonal ARIMA model for monthly demand and supply series.
//!
//! A `SeasonalModel` fits SARIMA(p,d,q)(P,D,Q)[s] coefficients to one
//! monthly series by minimizing the conditional sum of squares of the
//! doubly-differenced series, then projects point forecasts by recursing
//! the fitted equation forward and undoing both differencing stages.

use crate::core::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::diff::{difference, integrate, seasonal_difference, seasonal_integrate};
use crate::utils::optimization::{minimize, SimplexConfig};
use chrono::{Months, NaiveDate};

/// Model orders: non-seasonal (p,d,q) plus seasonal (P,D,Q) at `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaSpec {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub seasonal_p: usize,
    /// Seasonal differencing order.
    pub seasonal_d: usize,
    /// Seasonal MA order.
    pub seasonal_q: usize,
    /// Seasonal period in months (0 disables the seasonal part).
    pub period: usize,
}

impl SarimaSpec {
    /// Non-seasonal ARIMA(p,d,q) specification.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
            period: 0,
        }
    }

    /// Add a seasonal (P,D,Q) structure at the given period.
    pub fn with_seasonal(mut self, p: usize, d: usize, q: usize, period: usize) -> Self {
        self.seasonal_p = p;
        self.seasonal_d = d;
        self.seasonal_q = q;
        self.period = period;
        self
    }

    /// The reference configuration: SARIMA(1,1,1)(1,1,1)[12].
    pub fn monthly_default() -> Self {
        Self::new(1, 1, 1).with_seasonal(1, 1, 1, 12)
    }

    /// Number of free parameters: intercept + AR + SAR + MA + SMA.
    pub fn num_params(&self) -> usize {
        1 + self.p + self.seasonal_p + self.q + self.seasonal_q
    }

    /// Fewest observations that leave a usable differenced series: both
    /// differencing stages consume points, and at least one residual must
    /// remain for the short-lag AR/MA terms.
    pub fn min_observations(&self) -> usize {
        self.d + self.period * self.seasonal_d + self.p + self.q + 1
    }
}

impl Default for SarimaSpec {
    fn default() -> Self {
        Self::monthly_default()
    }
}

/// A seasonal ARIMA model bound to one quantity (demand or supply).
///
/// Lifecycle: construct unfit, [`fit`](SeasonalModel::fit) once per
/// training window, then call [`forecast`](SeasonalModel::forecast) any
/// number of times. Refitting replaces the stored coefficients.
#[derive(Debug, Clone)]
pub struct SeasonalModel {
    spec: SarimaSpec,
    quantity: String,
    intercept: f64,
    ar: Vec<f64>,
    seasonal_ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ma: Vec<f64>,
    original: Option<Vec<f64>>,
    stage_one: Option<Vec<f64>>,
    differenced: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    last_month: Option<NaiveDate>,
}

impl SeasonalModel {
    /// Create an unfit model for the named quantity.
    pub fn new(quantity: impl Into<String>, spec: SarimaSpec) -> Self {
        Self {
            spec,
            quantity: quantity.into(),
            intercept: 0.0,
            ar: Vec::new(),
            seasonal_ar: Vec::new(),
            ma: Vec::new(),
            seasonal_ma: Vec::new(),
            original: None,
            stage_one: None,
            differenced: None,
            residuals: None,
            last_month: None,
        }
    }

    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    pub fn is_fitted(&self) -> bool {
        self.original.is_some()
    }

    /// Residuals of the fitted equation on the differenced scale.
    pub fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    /// Estimate coefficients from a monthly series.
    ///
    /// Replaces any previously stored fit. The estimation is fully
    /// deterministic: the same series and spec always produce the same
    /// coefficients.
    pub fn fit(&mut self, series: &MonthlySeries) -> Result<()> {
        let values = series.values();
        let needed = self.spec.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                quantity: self.quantity.clone(),
                operation: "fit",
                needed,
                got: values.len(),
            });
        }

        let stage_one = difference(values, self.spec.d);
        let w = seasonal_difference(&stage_one, self.spec.seasonal_d, self.spec.period);
        if w.is_empty() {
            return Err(ForecastError::InsufficientData {
                quantity: self.quantity.clone(),
                operation: "fit",
                needed,
                got: values.len(),
            });
        }

        self.estimate(&w)?;

        let (ar_lags, ma_lags) = lag_polynomials(
            self.spec,
            &self.ar,
            &self.seasonal_ar,
            &self.ma,
            &self.seasonal_ma,
        );
        self.residuals = Some(residual_pass(&w, self.intercept, &ar_lags, &ma_lags));
        self.original = Some(values.to_vec());
        self.stage_one = Some(stage_one);
        self.differenced = Some(w);
        self.last_month = Some(series.last_month());
        Ok(())
    }

    /// Project `horizon` sequential point forecasts continuing one month
    /// after the last fitted month.
    pub fn forecast(&self, horizon: usize) -> Result<MonthlySeries> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon {
                quantity: self.quantity.clone(),
                operation: "forecast",
                horizon,
            });
        }
        let (Some(original), Some(stage_one), Some(w), Some(residuals), Some(last_month)) = (
            self.original.as_ref(),
            self.stage_one.as_ref(),
            self.differenced.as_ref(),
            self.residuals.as_ref(),
            self.last_month,
        ) else {
            return Err(ForecastError::ModelFit {
                quantity: self.quantity.clone(),
                operation: "forecast",
                detail: "model has not been fitted".to_string(),
            });
        };

        let (ar_lags, ma_lags) = lag_polynomials(
            self.spec,
            &self.ar,
            &self.seasonal_ar,
            &self.ma,
            &self.seasonal_ma,
        );

        let mut w_ext = w.clone();
        let mut shocks = residuals.clone();
        for _ in 0..horizon {
            let t = w_ext.len();
            let mut pred = self.intercept;
            for &(lag, c) in &ar_lags {
                if t >= lag {
                    pred += c * (w_ext[t - lag] - self.intercept);
                }
            }
            for &(lag, c) in &ma_lags {
                if t >= lag {
                    pred += c * shocks[t - lag];
                }
            }
            w_ext.push(pred);
            // Future shocks are their zero expectation.
            shocks.push(0.0);
        }

        let w_future = &w_ext[w.len()..];
        let stage_one_future =
            seasonal_integrate(w_future, stage_one, self.spec.seasonal_d, self.spec.period);
        let future = integrate(&stage_one_future, original, self.spec.d);

        MonthlySeries::from_start(self.quantity.clone(), last_month + Months::new(1), future)
    }

    fn estimate(&mut self, w: &[f64]) -> Result<()> {
        let spec = self.spec;
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;

        let mut initial = vec![0.1; spec.num_params()];
        initial[0] = mean;

        // Mean square rather than the raw sum keeps the objective on a
        // scale the convergence tolerances are calibrated for.
        let config = SimplexConfig::default();
        let outcome = minimize(
            |params| {
                let (intercept, ar_lags, ma_lags) = unpack(spec, params);
                sum_of_squares(w, intercept, &ar_lags, &ma_lags) / n
            },
            &initial,
            &config,
        );
        if !outcome.converged {
            return Err(ForecastError::ModelFit {
                quantity: self.quantity.clone(),
                operation: "fit",
                detail: format!(
                    "optimizer did not converge within {} iterations",
                    config.max_iter
                ),
            });
        }
        tracing::debug!(
            quantity = %self.quantity,
            iterations = outcome.iterations,
            mean_square = outcome.value,
            "coefficient estimation converged"
        );

        let point = &outcome.point;
        let p = spec.p;
        let sp = spec.seasonal_p;
        let q = spec.q;
        self.intercept = point[0];
        self.ar = point[1..1 + p].to_vec();
        self.seasonal_ar = point[1 + p..1 + p + sp].to_vec();
        self.ma = point[1 + p + sp..1 + p + sp + q].to_vec();
        self.seasonal_ma = point[1 + p + sp + q..].to_vec();
        Ok(())
    }
}

/// Expand the multiplicative AR and MA polynomials into flat (lag,
/// coefficient) terms. Cross terms between the short and seasonal
/// polynomials land at lag `i + period*j` with sign −φΦ on the AR side and
/// +θΘ on the MA side.
fn lag_polynomials(
    spec: SarimaSpec,
    ar: &[f64],
    seasonal_ar: &[f64],
    ma: &[f64],
    seasonal_ma: &[f64],
) -> (Vec<(usize, f64)>, Vec<(usize, f64)>) {
    let mut ar_lags: Vec<(usize, f64)> = Vec::new();
    for (i, &phi) in ar.iter().enumerate() {
        ar_lags.push((i + 1, phi));
    }
    for (j, &sphi) in seasonal_ar.iter().enumerate() {
        let seasonal_lag = spec.period * (j + 1);
        ar_lags.push((seasonal_lag, sphi));
        for (i, &phi) in ar.iter().enumerate() {
            ar_lags.push((seasonal_lag + i + 1, -phi * sphi));
        }
    }

    let mut ma_lags: Vec<(usize, f64)> = Vec::new();
    for (i, &theta) in ma.iter().enumerate() {
        ma_lags.push((i + 1, theta));
    }
    for (j, &stheta) in seasonal_ma.iter().enumerate() {
        let seasonal_lag = spec.period * (j + 1);
        ma_lags.push((seasonal_lag, stheta));
        for (i, &theta) in ma.iter().enumerate() {
            ma_lags.push((seasonal_lag + i + 1, theta * stheta));
        }
    }

    (ar_lags, ma_lags)
}

fn unpack(spec: SarimaSpec, params: &[f64]) -> (f64, Vec<(usize, f64)>, Vec<(usize, f64)>) {
    let p = spec.p;
    let sp = spec.seasonal_p;
    let q = spec.q;
    let intercept = params[0];
    let (ar_lags, ma_lags) = lag_polynomials(
        spec,
        &params[1..1 + p],
        &params[1 + p..1 + p + sp],
        &params[1 + p + sp..1 + p + sp + q],
        &params[1 + p + sp + q..],
    );
    (intercept, ar_lags, ma_lags)
}

/// Conditional sum of squares of the one-step-ahead residuals.
fn sum_of_squares(w: &[f64], intercept: f64, ar: &[(usize, f64)], ma: &[(usize, f64)]) -> f64 {
    residual_pass(w, intercept, ar, ma)
        .iter()
        .map(|e| e * e)
        .sum()
}

/// One-step-ahead residuals of the fitted equation. Lag terms whose
/// history is not yet available are skipped, which conditions the
/// recursion on zero pre-sample shocks.
fn residual_pass(
    w: &[f64],
    intercept: f64,
    ar: &[(usize, f64)],
    ma: &[(usize, f64)],
) -> Vec<f64> {
    let mut residuals = vec![0.0; w.len()];
    for t in 0..w.len() {
        let mut pred = intercept;
        for &(lag, c) in ar {
            if t >= lag {
                pred += c * (w[t - lag] - intercept);
            }
        }
        for &(lag, c) in ma {
            if t >= lag {
                pred += c * residuals[t - lag];
            }
        }
        residuals[t] = w[t] - pred;
    }
    residuals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn ym(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn seasonal_series(n: usize, mean: f64, amplitude: f64) -> MonthlySeries {
        let values = (0..n)
            .map(|i| mean + amplitude * (i as f64 * TAU / 12.0).sin())
            .collect();
        MonthlySeries::from_start("demand", ym(2022, 1), values).unwrap()
    }

    #[test]
    fn min_observations_for_reference_orders() {
        assert_eq!(SarimaSpec::monthly_default().min_observations(), 16);
        assert_eq!(SarimaSpec::new(1, 1, 1).min_observations(), 4);
        assert_eq!(SarimaSpec::monthly_default().num_params(), 5);
    }

    #[test]
    fn fit_rejects_short_series() {
        let series = seasonal_series(10, 100.0, 5.0);
        let mut model = SeasonalModel::new("demand", SarimaSpec::monthly_default());
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::InsufficientData {
                needed: 16,
                got: 10,
                ..
            })
        ));
    }

    #[test]
    fn forecast_before_fit_fails() {
        let model = SeasonalModel::new("demand", SarimaSpec::monthly_default());
        assert!(matches!(
            model.forecast(3),
            Err(ForecastError::ModelFit { .. })
        ));
    }

    #[test]
    fn zero_horizon_is_invalid() {
        let series = seasonal_series(36, 100.0, 5.0);
        let mut model = SeasonalModel::new("demand", SarimaSpec::monthly_default());
        model.fit(&series).unwrap();
        assert!(matches!(
            model.forecast(0),
            Err(ForecastError::InvalidHorizon { horizon: 0, .. })
        ));
    }

    #[test]
    fn forecast_months_continue_after_last_fitted_month() {
        let series = seasonal_series(30, 500.0, 20.0);
        let mut model = SeasonalModel::new("demand", SarimaSpec::monthly_default());
        model.fit(&series).unwrap();

        let forecast = model.forecast(6).unwrap();
        assert_eq!(forecast.len(), 6);
        assert_eq!(forecast.first_month(), ym(2024, 7));
        assert_eq!(forecast.last_month(), ym(2024, 12));
    }

    #[test]
    fn forecast_extends_a_pure_seasonal_pattern() {
        // A clean period-12 sinusoid vanishes under seasonal differencing,
        // so the forecast must reproduce the cycle almost exactly.
        let series = seasonal_series(24, 500_000.0, 30_000.0);
        let mut model = SeasonalModel::new("demand", SarimaSpec::monthly_default());
        model.fit(&series).unwrap();

        let forecast = model.forecast(12).unwrap();
        for (h, value) in forecast.values().iter().enumerate() {
            let i = 24 + h;
            let expected = 500_000.0 + 30_000.0 * (i as f64 * TAU / 12.0).sin();
            assert_relative_eq!(*value, expected, max_relative = 0.02);
        }
    }

    #[test]
    fn fit_converges_on_a_noisy_seasonal_series() {
        // Seasonal cycle plus a deterministic non-seasonal ripple standing
        // in for observation noise, on the scale of a monthly supply
        // history. The fit must converge and the forecast must stay near
        // the underlying cycle.
        let values: Vec<f64> = (0..42)
            .map(|i| {
                let t = i as f64;
                500_000.0
                    + 25_000.0 * (t * TAU / 12.0 + 0.5).sin()
                    + 5_000.0 * (t * 2.39996).sin()
            })
            .collect();
        let series = MonthlySeries::from_start("supply", ym(2022, 1), values).unwrap();
        let mut model = SeasonalModel::new("supply", SarimaSpec::monthly_default());
        model.fit(&series).unwrap();

        let forecast = model.forecast(18).unwrap();
        assert_eq!(forecast.len(), 18);
        for &v in forecast.values() {
            assert!(v > 400_000.0, "forecast {v} fell below the plausible band");
            assert!(v < 600_000.0, "forecast {v} rose above the plausible band");
        }
    }

    #[test]
    fn css_is_the_sum_of_squared_one_step_residuals() {
        let w = vec![1.0, 2.5, 0.5, 3.0, 1.5, 2.0];
        let ar = vec![(1, 0.4), (2, -0.1)];
        let ma = vec![(1, 0.3)];
        let residuals = residual_pass(&w, 1.5, &ar, &ma);
        let total: f64 = residuals.iter().map(|e| e * e).sum();
        assert_relative_eq!(sum_of_squares(&w, 1.5, &ar, &ma), total, epsilon = 1e-12);
    }

    #[test]
    fn refitting_replaces_coefficients() {
        let mut model = SeasonalModel::new("demand", SarimaSpec::monthly_default());

        let first = seasonal_series(30, 100.0, 10.0);
        model.fit(&first).unwrap();
        let first_last = first.last_month();

        let second = seasonal_series(36, 100.0, 10.0);
        model.fit(&second).unwrap();
        let forecast = model.forecast(1).unwrap();
        assert!(forecast.first_month() > first_last);
    }

    #[test]
    fn fitting_twice_yields_identical_coefficients() {
        let series = seasonal_series(36, 1000.0, 80.0);
        let fit = || {
            let mut model = SeasonalModel::new("demand", SarimaSpec::monthly_default());
            model.fit(&series).unwrap();
            model
        };
        let a = fit();
        let b = fit();
        assert_eq!(a.intercept(), b.intercept());
        assert_eq!(a.ar_coefficients(), b.ar_coefficients());
        assert_eq!(a.seasonal_ar_coefficients(), b.seasonal_ar_coefficients());
        assert_eq!(a.ma_coefficients(), b.ma_coefficients());
        assert_eq!(a.seasonal_ma_coefficients(), b.seasonal_ma_coefficients());
    }

    #[test]
    fn longer_horizon_preserves_shorter_prefix() {
        let series = seasonal_series(36, 2000.0, 150.0);
        let mut model = SeasonalModel::new("demand", SarimaSpec::monthly_default());
        model.fit(&series).unwrap();

        let short = model.forecast(6).unwrap();
        let long = model.forecast(13).unwrap();
        assert_eq!(short.values(), &long.values()[..6]);
        assert_eq!(short.months(), &long.months()[..6]);
    }

    #[test]
    fn non_seasonal_spec_tracks_a_trend() {
        let values: Vec<f64> = (0..30).map(|i| 10.0 + 2.0 * i as f64).collect();
        let series = MonthlySeries::from_start("demand", ym(2022, 1), values).unwrap();
        let mut model = SeasonalModel::new("demand", SarimaSpec::new(1, 1, 0));
        model.fit(&series).unwrap();

        let forecast = model.forecast(3).unwrap();
        // Differenced series is constant 2, so the projection keeps climbing.
        assert!(forecast.values()[0] > 68.0);
        assert!(forecast.values()[2] > forecast.values()[0]);
    }

    #[test]
    fn lag_polynomials_expand_cross_terms() {
        let spec = SarimaSpec::monthly_default();
        let (ar, ma) = lag_polynomials(spec, &[0.5], &[0.4], &[0.3], &[0.2]);
        assert!(ar.contains(&(1, 0.5)));
        assert!(ar.contains(&(12, 0.4)));
        assert!(ar.contains(&(13, -0.2)));
        assert!(ma.contains(&(1, 0.3)));
        assert!(ma.contains(&(12, 0.2)));
        assert!(ma.contains(&(13, 0.3 * 0.2)));
    }
}
