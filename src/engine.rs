//! Forecast engine orchestrating the demand and supply models.

use crate::core::{ForecastRecord, ForecastTable, MonthlySeries};
use crate::error::{ForecastError, Result};
use crate::models::{SarimaSpec, SeasonalModel};
use crate::utils::metrics::{evaluate, AccuracyMetrics};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Out-of-sample accuracy for both quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationReport {
    pub demand: AccuracyMetrics,
    pub supply: AccuracyMetrics,
}

impl EvaluationReport {
    /// Flatten into the key/value mapping external consumers read.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("demand_mape", self.demand.mape),
            ("demand_rmse", self.demand.rmse),
            ("demand_r2", self.demand.r_squared),
            ("supply_mape", self.supply.mape),
            ("supply_rmse", self.supply.rmse),
            ("supply_r2", self.supply.r_squared),
        ])
    }
}

/// Owns the historical demand and supply series and runs the two passes:
/// a train/test evaluation and a full-history future forecast.
///
/// Both passes build fresh models and leave no state behind, so repeated
/// calls with the same arguments produce identical output.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    demand: MonthlySeries,
    supply: MonthlySeries,
    spec: SarimaSpec,
}

impl ForecastEngine {
    /// Create an engine over aligned demand and supply histories, using
    /// the reference SARIMA(1,1,1)(1,1,1)[12] orders.
    pub fn new(demand: MonthlySeries, supply: MonthlySeries) -> Result<Self> {
        demand.check_aligned(&supply, "engine construction")?;
        Ok(Self {
            demand,
            supply,
            spec: SarimaSpec::monthly_default(),
        })
    }

    /// Override the model orders.
    pub fn with_spec(mut self, spec: SarimaSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn demand(&self) -> &MonthlySeries {
        &self.demand
    }

    pub fn supply(&self) -> &MonthlySeries {
        &self.supply
    }

    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    /// Split each history at `train_end` (inclusive), fit on the head,
    /// forecast over the tail, and score the forecasts.
    ///
    /// A `train_end` at or past the last historical month leaves a
    /// zero-length test partition and fails with insufficient data.
    pub fn train_and_evaluate(&self, train_end: NaiveDate) -> Result<EvaluationReport> {
        tracing::info!(%train_end, "running train/test evaluation pass");
        Ok(EvaluationReport {
            demand: self.evaluate_quantity(&self.demand, train_end)?,
            supply: self.evaluate_quantity(&self.supply, train_end)?,
        })
    }

    fn evaluate_quantity(
        &self,
        series: &MonthlySeries,
        train_end: NaiveDate,
    ) -> Result<AccuracyMetrics> {
        let train = series.through(train_end)?;
        let test = series.after(train_end)?;
        let mut model = SeasonalModel::new(series.name(), self.spec);
        model.fit(&train)?;
        let predicted = model.forecast(test.len())?;
        evaluate(&test, &predicted)
    }

    /// Fit fresh models on the history through `train_end` and forecast
    /// `horizon` months beyond it, deriving the availability gap and
    /// service level per month.
    ///
    /// Point forecasts are rounded to whole units first; the gap and
    /// service level are computed from the rounded integers, matching the
    /// presentation contract downstream consumers rely on.
    pub fn forecast_future(&self, horizon: usize, train_end: NaiveDate) -> Result<ForecastTable> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon {
                quantity: self.demand.name().to_string(),
                operation: "forecast_future",
                horizon,
            });
        }
        tracing::info!(horizon, %train_end, "running future forecast pass");

        let demand_forecast = self.project_quantity(&self.demand, horizon, train_end)?;
        let supply_forecast = self.project_quantity(&self.supply, horizon, train_end)?;

        let mut records = Vec::with_capacity(horizon);
        let months = demand_forecast.months();
        for ((&month, &d), &s) in months
            .iter()
            .zip(demand_forecast.values())
            .zip(supply_forecast.values())
        {
            let demand_units = d.round() as i64;
            let supply_units = s.round() as i64;
            if demand_units == 0 {
                return Err(ForecastError::DivisionByZero {
                    quantity: self.demand.name().to_string(),
                    operation: "forecast_future",
                    detail: format!(
                        "forecast demand for {} rounds to zero",
                        month.format("%Y-%m")
                    ),
                });
            }
            records.push(ForecastRecord {
                month,
                demand_forecast: demand_units,
                supply_forecast: supply_units,
                availability_gap: demand_units - supply_units,
                service_level_pct: supply_units as f64 / demand_units as f64 * 100.0,
            });
        }
        Ok(ForecastTable::new(records))
    }

    fn project_quantity(
        &self,
        series: &MonthlySeries,
        horizon: usize,
        train_end: NaiveDate,
    ) -> Result<MonthlySeries> {
        let train = series.through(train_end)?;
        let mut model = SeasonalModel::new(series.name(), self.spec);
        model.fit(&train)?;
        model.forecast(horizon)
    }
}
