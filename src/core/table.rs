//! Forecast output table and its delimited persistence contract.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One forecast month with its derived availability indicators.
///
/// Records are always fully populated: the two rounded point forecasts and
/// both derived columns come from the same forecast pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Forecast month (first-of-month date, serialized as `YYYY-MM`).
    #[serde(rename = "Month", with = "month_index")]
    pub month: NaiveDate,
    /// Forecast demand, rounded to whole units.
    #[serde(rename = "Demand_Forecast")]
    pub demand_forecast: i64,
    /// Forecast supply, rounded to whole units.
    #[serde(rename = "Supply_Forecast")]
    pub supply_forecast: i64,
    /// Demand minus supply.
    #[serde(rename = "Availability_Gap")]
    pub availability_gap: i64,
    /// Supply as a percentage of demand.
    #[serde(rename = "Service_Level_%")]
    pub service_level_pct: f64,
}

/// Chronological collection of forecast records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastTable {
    records: Vec<ForecastRecord>,
}

impl ForecastTable {
    pub fn new(records: Vec<ForecastRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastRecord> {
        self.records.iter()
    }

    /// Write the table as a delimited file: a `Month` index column followed
    /// by the four forecast columns, one row per month in chronological
    /// order. This is the byte contract external consumers read.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        for record in &self.records {
            out.serialize(record).map_err(|e| ForecastError::Persistence {
                operation: "write_csv",
                detail: e.to_string(),
            })?;
        }
        out.flush().map_err(|e| ForecastError::Persistence {
            operation: "write_csv",
            detail: e.to_string(),
        })
    }

    /// Read a table previously produced by [`ForecastTable::write_csv`].
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut input = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        for row in input.deserialize() {
            let record: ForecastRecord = row.map_err(|e| ForecastError::Persistence {
                operation: "read_csv",
                detail: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(Self::new(records))
    }
}

impl IntoIterator for ForecastTable {
    type Item = ForecastRecord;
    type IntoIter = std::vec::IntoIter<ForecastRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Serde helpers for the `YYYY-MM` month index format.
mod month_index {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(month: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&month.format("%Y-%m").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_table() -> ForecastTable {
        let months = [
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        ];
        ForecastTable::new(vec![
            ForecastRecord {
                month: months[0],
                demand_forecast: 512_340,
                supply_forecast: 498_111,
                availability_gap: 14_229,
                service_level_pct: 498_111.0 / 512_340.0 * 100.0,
            },
            ForecastRecord {
                month: months[1],
                demand_forecast: 520_000,
                supply_forecast: 523_500,
                availability_gap: -3_500,
                service_level_pct: 523_500.0 / 520_000.0 * 100.0,
            },
        ])
    }

    #[test]
    fn csv_layout_matches_contract() {
        let mut buffer = Vec::new();
        sample_table().write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Month,Demand_Forecast,Supply_Forecast,Availability_Gap,Service_Level_%"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("2025-07,512340,498111,14229,"));
    }

    #[test]
    fn csv_round_trip_is_exact() {
        let table = sample_table();
        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let restored = ForecastTable::read_csv(buffer.as_slice()).unwrap();

        assert_eq!(restored.len(), table.len());
        for (a, b) in table.iter().zip(restored.iter()) {
            assert_eq!(a.month, b.month);
            assert_eq!(a.demand_forecast, b.demand_forecast);
            assert_eq!(a.supply_forecast, b.supply_forecast);
            assert_eq!(a.availability_gap, b.availability_gap);
            assert_relative_eq!(a.service_level_pct, b.service_level_pct, epsilon = 1e-6);
        }
    }

    #[test]
    fn read_rejects_malformed_month() {
        let data = "Month,Demand_Forecast,Supply_Forecast,Availability_Gap,Service_Level_%\n\
                    July,1,1,0,100.0\n";
        let result = ForecastTable::read_csv(data.as_bytes());
        assert!(matches!(result, Err(ForecastError::Persistence { .. })));
    }
}
