//! Synthetic historical-data collaborator.
//!
//! Generates the seasonal demand/supply history the engine consumes, with
//! an explicit seed so every run is reproducible. Also hosts the
//! historical labeling helpers (fulfilment status, availability gap,
//! service level) that describe history rather than forecasts.

use crate::core::MonthlySeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::f64::consts::TAU;

/// Tolerance, in units, within which demand is considered met exactly.
pub const DEFAULT_FULFILMENT_TOLERANCE: f64 = 2000.0;

/// Parameters of the synthetic history generator.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// First history month.
    pub start: NaiveDate,
    /// Number of months to generate.
    pub months: usize,
    /// RNG seed; identical seeds produce identical histories.
    pub seed: u64,
    /// Shared base level of demand and supply.
    pub base_level: f64,
    /// Seasonal amplitude of demand.
    pub demand_amplitude: f64,
    /// Seasonal amplitude of supply.
    pub supply_amplitude: f64,
    /// Phase shift of the supply cycle, in radians.
    pub supply_phase: f64,
    /// Standard deviation of demand noise.
    pub demand_noise_sd: f64,
    /// Standard deviation of supply noise.
    pub supply_noise_sd: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            months: 42,
            seed: 42,
            base_level: 500_000.0,
            demand_amplitude: 30_000.0,
            supply_amplitude: 25_000.0,
            supply_phase: 0.5,
            demand_noise_sd: 3_000.0,
            supply_noise_sd: 5_000.0,
        }
    }
}

/// An aligned demand/supply history pair.
#[derive(Debug, Clone)]
pub struct HistoricalData {
    pub demand: MonthlySeries,
    pub supply: MonthlySeries,
}

/// Generate a seasonal demand/supply history.
///
/// Both quantities follow a period-12 sinusoid around the base level with
/// Gaussian noise, rounded to whole units the way a real history table
/// records them.
pub fn simulate(config: &SimulationConfig) -> Result<HistoricalData> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut demand = Vec::with_capacity(config.months);
    let mut supply = Vec::with_capacity(config.months);
    for i in 0..config.months {
        let angle = i as f64 * TAU / 12.0;
        let demand_noise: f64 = rng.sample::<f64, _>(StandardNormal) * config.demand_noise_sd;
        let supply_noise: f64 = rng.sample::<f64, _>(StandardNormal) * config.supply_noise_sd;
        demand.push((config.base_level + config.demand_amplitude * angle.sin() + demand_noise).round());
        supply.push(
            (config.base_level + config.supply_amplitude * (angle + config.supply_phase).sin()
                + supply_noise)
                .round(),
        );
    }

    Ok(HistoricalData {
        demand: MonthlySeries::from_start("demand", config.start, demand)?,
        supply: MonthlySeries::from_start("supply", config.start, supply)?,
    })
}

/// How supply compared to demand in one historical month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfilmentStatus {
    /// Supply within tolerance of demand.
    Met,
    /// Supply above demand by more than the tolerance.
    Exceeded,
    /// Supply below demand by more than the tolerance.
    NotMet,
}

/// Classify one demand/supply pair.
pub fn fulfilment_status(demand: f64, supply: f64, tolerance: f64) -> FulfilmentStatus {
    if (demand - supply).abs() <= tolerance {
        FulfilmentStatus::Met
    } else if supply > demand {
        FulfilmentStatus::Exceeded
    } else {
        FulfilmentStatus::NotMet
    }
}

/// Label every month of an aligned history pair.
pub fn label_fulfilment(
    demand: &MonthlySeries,
    supply: &MonthlySeries,
    tolerance: f64,
) -> Result<Vec<FulfilmentStatus>> {
    demand.check_aligned(supply, "label_fulfilment")?;
    Ok(demand
        .values()
        .iter()
        .zip(supply.values())
        .map(|(&d, &s)| fulfilment_status(d, s, tolerance))
        .collect())
}

/// Historical availability gap (demand minus supply) per month.
pub fn availability_gap(demand: &MonthlySeries, supply: &MonthlySeries) -> Result<MonthlySeries> {
    demand.check_aligned(supply, "availability_gap")?;
    let values = demand
        .values()
        .iter()
        .zip(supply.values())
        .map(|(d, s)| d - s)
        .collect();
    MonthlySeries::new("availability_gap", demand.months().to_vec(), values)
}

/// Historical service level (supply as a percentage of demand) per month.
pub fn service_level(demand: &MonthlySeries, supply: &MonthlySeries) -> Result<MonthlySeries> {
    demand.check_aligned(supply, "service_level")?;
    if let Some(i) = demand.values().iter().position(|v| *v == 0.0) {
        return Err(ForecastError::DivisionByZero {
            quantity: demand.name().to_string(),
            operation: "service_level",
            detail: format!(
                "demand in {} is zero",
                demand.months()[i].format("%Y-%m")
            ),
        });
    }
    let values = demand
        .values()
        .iter()
        .zip(supply.values())
        .map(|(d, s)| s / d * 100.0)
        .collect();
    MonthlySeries::new("service_level", demand.months().to_vec(), values)
}
