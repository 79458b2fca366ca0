//! Inbound prediction requests and the enumerations a caller may choose from.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::error::ValidationError;

pub const YEAR_MIN: i32 = 2017;
pub const YEAR_MAX: i32 = 2025;

/// Fuel type codes accepted by the models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    #[serde(rename = "D")]
    Diesel,
    #[serde(rename = "E")]
    Ethanol,
    #[serde(rename = "X")]
    Regular,
    #[serde(rename = "Z")]
    Premium,
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [
        FuelType::Diesel,
        FuelType::Ethanol,
        FuelType::Regular,
        FuelType::Premium,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FuelType::Diesel => "D",
            FuelType::Ethanol => "E",
            FuelType::Regular => "X",
            FuelType::Premium => "Z",
        }
    }

    pub fn codes() -> Vec<String> {
        Self::ALL.iter().map(|f| f.code().to_string()).collect()
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FuelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.code() == s)
            .ok_or_else(|| ValidationError::InvalidInput {
                field: "fuel type".to_string(),
                value: s.to_string(),
                valid: Self::codes(),
            })
    }
}

/// A single, partially specified vehicle description.
///
/// Field aliases accept the form names used by the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRequest {
    #[serde(alias = "vehicle_year")]
    pub year: i32,
    pub make: String,
    pub transmission: String,
    pub fuel_type: String,
}

impl VehicleRequest {
    pub fn new(year: i32, make: &str, transmission: &str, fuel_type: &str) -> Self {
        Self {
            year,
            make: make.to_string(),
            transmission: transmission.to_string(),
            fuel_type: fuel_type.to_string(),
        }
    }

    pub fn validate_year(&self) -> Result<(), ValidationError> {
        if (YEAR_MIN..=YEAR_MAX).contains(&self.year) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                year: self.year,
                min: YEAR_MIN,
                max: YEAR_MAX,
            })
        }
    }
}

/// Reads batch requests from CSV with `year,make,transmission,fuel_type` headers.
pub fn read_requests<R: Read>(reader: R) -> Result<Vec<VehicleRequest>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut requests = Vec::new();

    for result in rdr.deserialize() {
        let request: VehicleRequest = result?;
        requests.push(request);
    }

    Ok(requests)
}

/// Choices the presentation layer offers for each input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidOptions {
    pub makes: Vec<String>,
    pub transmissions: Vec<String>,
    pub fuel_types: Vec<String>,
    pub year_min: i32,
    pub year_max: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuel_type_parse() {
        assert_eq!("X".parse::<FuelType>(), Ok(FuelType::Regular));
        assert_eq!("D".parse::<FuelType>(), Ok(FuelType::Diesel));
    }

    #[test]
    fn test_fuel_type_rejects_unknown_code() {
        let err = "Q".parse::<FuelType>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid fuel type. Expected one of: D, E, X, Z");
    }

    #[test]
    fn test_year_bounds_inclusive() {
        assert!(VehicleRequest::new(2017, "Toyota", "A6", "X").validate_year().is_ok());
        assert!(VehicleRequest::new(2025, "Toyota", "A6", "X").validate_year().is_ok());
        assert_eq!(
            VehicleRequest::new(2016, "Toyota", "A6", "X").validate_year(),
            Err(ValidationError::OutOfRange {
                year: 2016,
                min: 2017,
                max: 2025
            })
        );
        assert!(VehicleRequest::new(2026, "Toyota", "A6", "X").validate_year().is_err());
    }

    #[test]
    fn test_read_requests() {
        let csv = "year,make,transmission,fuel_type\n2022,Toyota,A6,X\n2016,Honda,M6,Z\n";
        let requests = read_requests(csv.as_bytes()).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], VehicleRequest::new(2022, "Toyota", "A6", "X"));
        assert_eq!(requests[1].year, 2016);
    }
}
