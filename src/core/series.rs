//! Gap-free monthly series keyed by first-of-month dates.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Normalize a date to the first day of its month.
pub fn month_floor(date: NaiveDate) -> NaiveDate {
    // with_day(1) cannot fail for day 1
    date.with_day(1).unwrap_or(date)
}

/// A named, immutable sequence of monthly observations.
///
/// Months are first-of-month dates, strictly increasing with exactly one
/// calendar month between neighbours. Consumers derive new series via
/// [`MonthlySeries::through`] and [`MonthlySeries::after`] instead of
/// mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    name: String,
    months: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl MonthlySeries {
    /// Create a series from explicit month/value pairs.
    pub fn new(name: impl Into<String>, months: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if months.is_empty() {
            return Err(ForecastError::InsufficientData {
                quantity: name,
                operation: "series construction",
                needed: 1,
                got: 0,
            });
        }
        if months.len() != values.len() {
            return Err(ForecastError::MisalignedSeries {
                quantity: name,
                operation: "series construction",
                detail: format!("{} months vs {} values", months.len(), values.len()),
            });
        }
        for month in &months {
            if month.day() != 1 {
                return Err(ForecastError::MisalignedSeries {
                    quantity: name,
                    operation: "series construction",
                    detail: format!("{month} is not a first-of-month date"),
                });
            }
        }
        for pair in months.windows(2) {
            if pair[0] + Months::new(1) != pair[1] {
                return Err(ForecastError::MisalignedSeries {
                    quantity: name,
                    operation: "series construction",
                    detail: format!(
                        "months must advance by one calendar month, found {} then {}",
                        pair[0], pair[1]
                    ),
                });
            }
        }
        Ok(Self {
            name,
            months,
            values,
        })
    }

    /// Create a series of consecutive months beginning at `start`.
    pub fn from_start(
        name: impl Into<String>,
        start: NaiveDate,
        values: Vec<f64>,
    ) -> Result<Self> {
        let start = month_floor(start);
        let months = (0..values.len())
            .map(|i| start + Months::new(i as u32))
            .collect();
        Self::new(name, months, values)
    }

    /// Series name, used as the quantity label in error reporting.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of observations (always at least 1).
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Always false for a constructed series; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_month(&self) -> NaiveDate {
        self.months[0]
    }

    pub fn last_month(&self) -> NaiveDate {
        self.months[self.months.len() - 1]
    }

    /// Observations up to and including `end`'s month.
    pub fn through(&self, end: NaiveDate) -> Result<MonthlySeries> {
        let end = month_floor(end);
        let count = self.months.iter().take_while(|m| **m <= end).count();
        self.sliced(0, count)
    }

    /// Observations strictly after `end`'s month.
    pub fn after(&self, end: NaiveDate) -> Result<MonthlySeries> {
        let end = month_floor(end);
        let skip = self.months.iter().take_while(|m| **m <= end).count();
        self.sliced(skip, self.len())
    }

    fn sliced(&self, start: usize, end: usize) -> Result<MonthlySeries> {
        if start >= end {
            return Err(ForecastError::InsufficientData {
                quantity: self.name.clone(),
                operation: "series slice",
                needed: 1,
                got: 0,
            });
        }
        Ok(MonthlySeries {
            name: self.name.clone(),
            months: self.months[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// Verify that `other` covers exactly the same months as `self`.
    pub fn check_aligned(&self, other: &MonthlySeries, operation: &'static str) -> Result<()> {
        if self.len() != other.len() {
            return Err(ForecastError::MisalignedSeries {
                quantity: self.name.clone(),
                operation,
                detail: format!(
                    "length {} ({}) vs length {} ({})",
                    self.len(),
                    self.name,
                    other.len(),
                    other.name
                ),
            });
        }
        for (a, b) in self.months.iter().zip(other.months.iter()) {
            if a != b {
                return Err(ForecastError::MisalignedSeries {
                    quantity: self.name.clone(),
                    operation,
                    detail: format!("month index {a} ({}) vs {b} ({})", self.name, other.name),
                });
            }
        }
        Ok(())
    }
}
