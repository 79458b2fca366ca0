//! Emission summaries over the raw reference dataset.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::ReferenceRecord;
use crate::utility::{mean, round_to};

const TOP_COMBINATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelEmissions {
    pub fuel_type: String,
    pub avg_co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransmissionEmissions {
    pub transmission: String,
    pub avg_co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineEmissions {
    pub engine_size: f64,
    pub mean_co2: f64,
    pub min_co2: f64,
    pub max_co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combination {
    pub engine_size: f64,
    pub cylinders: i64,
    pub transmission: String,
    pub fuel_type: String,
    pub co2_emissions: f64,
}

/// Summary payload served by the insights endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionInsights {
    pub fuel_emissions: Vec<FuelEmissions>,
    pub transmission_emissions: Vec<TransmissionEmissions>,
    pub engine_emissions: Vec<EngineEmissions>,
    pub top_5_combinations: Vec<Combination>,
}

impl EmissionInsights {
    pub fn from_records(records: &[ReferenceRecord]) -> Self {
        let fuel_emissions = mean_co2_by(records, |r| r.fuel_type.clone())
            .into_iter()
            .map(|(fuel_type, avg_co2)| FuelEmissions { fuel_type, avg_co2 })
            .collect();

        let transmission_emissions = mean_co2_by(records, |r| r.transmission.clone())
            .into_iter()
            .map(|(transmission, avg_co2)| TransmissionEmissions {
                transmission,
                avg_co2,
            })
            .collect();

        Self {
            fuel_emissions,
            transmission_emissions,
            engine_emissions: engine_emissions(records),
            top_5_combinations: top_combinations(records, TOP_COMBINATIONS),
        }
    }
}

/// Mean CO2 per group, ascending by mean.
fn mean_co2_by<F>(records: &[ReferenceRecord], key: F) -> Vec<(String, f64)>
where
    F: Fn(&ReferenceRecord) -> String,
{
    let mut series: HashMap<String, Vec<f64>> = HashMap::new();
    for record in records {
        series.entry(key(record)).or_default().push(record.co2);
    }

    let mut means: Vec<(String, f64)> = series
        .into_iter()
        .map(|(label, values)| (label, mean(&values)))
        .collect();
    means.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    means
        .into_iter()
        .map(|(label, avg)| (label, round_to(avg, 2)))
        .collect()
}

/// Mean, min and max CO2 per engine size, ascending by engine size.
fn engine_emissions(records: &[ReferenceRecord]) -> Vec<EngineEmissions> {
    let mut series: HashMap<u64, Vec<f64>> = HashMap::new();
    for record in records {
        series
            .entry(record.engine_size.to_bits())
            .or_default()
            .push(record.co2);
    }

    let mut rows: Vec<EngineEmissions> = series
        .into_iter()
        .map(|(bits, values)| {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            EngineEmissions {
                engine_size: f64::from_bits(bits),
                mean_co2: round_to(mean(&values), 2),
                min_co2: round_to(min, 2),
                max_co2: round_to(max, 2),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.engine_size.total_cmp(&b.engine_size));

    rows
}

/// The `limit` lowest-CO2 records, keeping only the first (lowest) record for
/// each engine size, cylinders, transmission and fuel type combination.
fn top_combinations(records: &[ReferenceRecord], limit: usize) -> Vec<Combination> {
    let mut sorted: Vec<&ReferenceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.co2.total_cmp(&b.co2));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|r| {
            seen.insert((
                r.engine_size.to_bits(),
                r.cylinders.to_bits(),
                r.transmission.clone(),
                r.fuel_type.clone(),
            ))
        })
        .take(limit)
        .map(|r| Combination {
            engine_size: r.engine_size,
            cylinders: r.cylinders as i64,
            transmission: r.transmission.clone(),
            fuel_type: r.fuel_type.clone(),
            co2_emissions: round_to(r.co2, 2),
        })
        .collect()
}
