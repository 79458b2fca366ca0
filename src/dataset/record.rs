//! Historical vehicle observations as read from the reference dataset.

use serde::{Deserialize, Serialize};

/// One row of the reference dataset, with raw (uncanonicalized) labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(rename = "Model year")]
    pub year: i32,
    #[serde(rename = "Make")]
    pub make: String,
    #[serde(rename = "Model", default)]
    pub model: Option<String>,
    #[serde(rename = "Vehicle class")]
    pub vehicle_class: String,
    #[serde(rename = "Engine size (L)")]
    pub engine_size: f64,
    #[serde(rename = "Cylinders")]
    pub cylinders: f64,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(rename = "Fuel type")]
    pub fuel_type: String,

    // fuel consumption, L/100 km
    #[serde(rename = "City (L/100 km)")]
    pub city: f64,
    #[serde(rename = "Highway (L/100 km)")]
    pub highway: f64,
    #[serde(rename = "Combined (L/100 km)")]
    pub combined: f64,

    #[serde(rename = "CO2 emissions (g/km)")]
    pub co2: f64,
    #[serde(rename = "Smog rating", default)]
    pub smog_rating: Option<f64>,
}

/// Canonical labels for a record whose make and transmission both map
/// through the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalLabels {
    pub make: String,
    pub transmission: String,
}
