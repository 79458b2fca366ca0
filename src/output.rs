//! Output formatting and persistence for prediction results.
//!
//! Supports plain-text reports, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::PredictError;
use crate::predictor::PredictionReport;
use crate::request::VehicleRequest;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One batch result row: the request, then either the report or the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub year: i32,
    pub make: String,
    pub transmission: String,
    pub fuel_type: String,

    pub prediction: Option<f64>,
    pub combined_fuel: Option<f64>,
    pub city_fuel: Option<f64>,
    pub highway_fuel: Option<f64>,
    pub combined_mpg: Option<i64>,
    pub smog_rating: Option<i64>,
    pub annual_fuel_cost: Option<i64>,
    pub vehicle_class_range: Option<String>,
    pub co2_rating: Option<f64>,
    pub eco_score: Option<f64>,
    pub co2_tax: Option<f64>,
    pub fuel_efficiency_score: Option<f64>,
    pub cost_per_passenger_km: Option<f64>,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl PredictionRecord {
    fn empty(request: &VehicleRequest) -> Self {
        PredictionRecord {
            timestamp: Utc::now(),
            year: request.year,
            make: request.make.clone(),
            transmission: request.transmission.clone(),
            fuel_type: request.fuel_type.clone(),
            prediction: None,
            combined_fuel: None,
            city_fuel: None,
            highway_fuel: None,
            combined_mpg: None,
            smog_rating: None,
            annual_fuel_cost: None,
            vehicle_class_range: None,
            co2_rating: None,
            eco_score: None,
            co2_tax: None,
            fuel_efficiency_score: None,
            cost_per_passenger_km: None,
            error_type: None,
            error_message: None,
        }
    }

    pub fn from_report(request: &VehicleRequest, report: &PredictionReport) -> Self {
        PredictionRecord {
            prediction: Some(report.prediction),
            combined_fuel: Some(report.combined_fuel),
            city_fuel: Some(report.city_fuel),
            highway_fuel: Some(report.highway_fuel),
            combined_mpg: Some(report.combined_mpg),
            smog_rating: Some(report.smog_rating),
            annual_fuel_cost: Some(report.annual_fuel_cost),
            vehicle_class_range: Some(report.vehicle_class_range.clone()),
            co2_rating: Some(report.co2_rating),
            eco_score: Some(report.eco_score),
            co2_tax: Some(report.co2_tax),
            fuel_efficiency_score: Some(report.fuel_efficiency_score),
            cost_per_passenger_km: Some(report.cost_per_passenger_km),
            ..Self::empty(request)
        }
    }

    pub fn from_error(request: &VehicleRequest, error: &PredictError) -> Self {
        let error_type = if error.is_client_error() {
            "validation_error"
        } else {
            "prediction_error"
        };

        PredictionRecord {
            error_type: Some(error_type.to_string()),
            error_message: Some(error.to_string()),
            ..Self::empty(request)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_type.is_some()
    }
}

/// Prints a value as pretty-printed JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a report as aligned `name: value` lines on stdout.
pub fn print_report(report: &PredictionReport) -> Result<()> {
    let fields = serde_json::to_value(report)?;
    if let serde_json::Value::Object(map) = fields {
        for (name, value) in map {
            match value {
                serde_json::Value::String(s) => println!("{name:<24}{s}"),
                other => println!("{name:<24}{other}"),
            }
        }
    }
    info!(co2 = report.prediction, "Report printed");
    Ok(())
}

/// Appends a [`PredictionRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, record: &PredictionRecord) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
