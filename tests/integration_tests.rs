use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use vehicle_emissions::output::{PredictionRecord, append_record};
use vehicle_emissions::predictor::{Predictor, PredictorConfig};
use vehicle_emissions::request::{VehicleRequest, read_requests};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn config() -> PredictorConfig {
    PredictorConfig {
        dataset: fixtures().join("vehicles.csv"),
        models_dir: fixtures().join("models"),
        pricing: None,
        strict_taxonomy: false,
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_full_pipeline() {
    let predictor = Predictor::load(&config()).expect("Failed to load predictor");
    let report = predictor
        .predict(&VehicleRequest::new(2022, "Toyota", "A6", "X"))
        .unwrap();

    assert_eq!(report.prediction, 260.0);
    assert_eq!(report.combined_fuel, 10.8);
    assert_eq!(report.city_fuel, 12.9);
    assert_eq!(report.highway_fuel, 8.9);
    assert_eq!(report.combined_mpg, 22);
    assert_eq!(report.smog_rating, 5);
    assert_eq!(report.annual_fuel_cost, 3346);
    assert_eq!(report.vehicle_class_range, "7.2 – 8.4");
    assert_eq!(report.co2_rating, 5.8);
    assert_eq!(report.eco_score, 5.4);
    assert_eq!(report.co2_tax, 494.0);
    assert_eq!(report.fuel_efficiency_score, 0.0746);
    assert_eq!(report.cost_per_passenger_km, 2.8685);
}

#[test]
fn test_fallback_profile_still_predicts() {
    let predictor = Predictor::load(&config()).unwrap();
    let request = VehicleRequest::new(2017, "Honda", "M6", "X");

    let aligned = predictor.align(&request).unwrap();
    assert!(aligned.means.used_fallback());
    let engine_size = aligned.vector.get("Engine size (L)").unwrap();
    assert!((engine_size - 2.775).abs() < 1e-9);

    let report = predictor.predict(&request).unwrap();
    assert_eq!(report.prediction, 260.0);
    // Honda ties between Compact and SUV; Compact wins.
    assert_eq!(report.vehicle_class_range, "6.5 – 8.3");
}

#[test]
fn test_feature_vector_matches_schema_for_every_category() {
    let predictor = Predictor::load(&config()).unwrap();
    let options = predictor.options();
    let schema = predictor.schema().columns().to_vec();

    for (make, transmission) in [("Toyota", "A6"), ("Ford", "AS10"), ("BMW", "AS8"), ("Chevrolet", "AV")] {
        for fuel in ["D", "X", "Z"] {
            let aligned = predictor
                .align(&VehicleRequest::new(2022, make, transmission, fuel))
                .unwrap();
            assert_eq!(aligned.vector.columns(), schema.as_slice());
        }
    }
    assert_eq!(options.fuel_types, vec!["D", "E", "X", "Z"]);
}

#[test]
fn test_strict_taxonomy_rejects_unmapped_labels() {
    let config = PredictorConfig {
        strict_taxonomy: true,
        ..config()
    };
    let err = Predictor::load(&config).unwrap_err();
    assert!(format!("{err:#}").contains("Lotus"));
}

#[test]
fn test_missing_models_is_fatal() {
    let dir = temp_dir("vehicle_emissions_it_no_models");
    let config = PredictorConfig {
        models_dir: dir.clone(),
        ..config()
    };
    let err = Predictor::load(&config).unwrap_err();
    assert!(format!("{err:#}").contains("co2"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_gzip_dataset_and_pricing_override() {
    let dir = temp_dir("vehicle_emissions_it_gzip");

    let csv = fs::read(fixtures().join("vehicles.csv")).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&csv).unwrap();
    let dataset = dir.join("vehicles.csv.gz");
    fs::write(&dataset, encoder.finish().unwrap()).unwrap();

    let pricing = dir.join("pricing.json");
    fs::write(&pricing, r#"{"fuel_prices": {"X": 2.0}}"#).unwrap();

    let config = PredictorConfig {
        dataset,
        pricing: Some(pricing),
        ..config()
    };
    let predictor = Predictor::load(&config).unwrap();
    let report = predictor
        .predict(&VehicleRequest::new(2022, "Toyota", "A6", "X"))
        .unwrap();

    // 10.8 L/100 km * 200 * 2.0
    assert_eq!(report.annual_fuel_cost, 4320);
    assert_eq!(report.prediction, 260.0);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_batch_rows_include_errors() {
    let predictor = Predictor::load(&config()).unwrap();
    let dir = temp_dir("vehicle_emissions_it_batch");
    let output = dir.join("predictions.csv");

    let requests = read_requests(File::open(fixtures().join("requests.csv")).unwrap()).unwrap();
    assert_eq!(requests.len(), 4);

    for request in &requests {
        let record = match predictor.predict(request) {
            Ok(report) => PredictionRecord::from_report(request, &report),
            Err(e) => PredictionRecord::from_error(request, &e),
        };
        append_record(&output, &record).unwrap();
    }

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    let error_col = headers.iter().position(|h| h == "error_type").unwrap();
    let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(rows.len(), 4);
    let errors: Vec<_> = rows.iter().map(|r| r[error_col].to_string()).collect();
    assert_eq!(errors, vec!["", "validation_error", "validation_error", ""]);

    fs::remove_dir_all(&dir).unwrap();
}
