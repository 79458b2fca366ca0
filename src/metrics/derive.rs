//! Second-order metrics combining the model outputs with fixed constants.

use serde::Serialize;

use super::constants::MetricConstants;
use crate::dataset::stats::ReferenceStats;
use crate::error::StatsError;
use crate::models::ModelOutputBundle;
use crate::request::VehicleRequest;
use crate::utility::{guarded_div, round_to, round_to_int};

/// Consumer-facing figures derived from one [`ModelOutputBundle`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// CAD per year
    pub annual_fuel_cost: i64,
    pub vehicle_class: String,
    /// Observed combined L/100 km range for `vehicle_class`, "min – max"
    pub vehicle_class_range: String,
    pub co2_rating: f64,
    pub eco_score: f64,
    /// CAD per year
    pub co2_tax: f64,
    pub fuel_efficiency_score: f64,
    /// CAD per passenger per 100 km
    pub cost_per_passenger_km: f64,
}

/// 1 (worst) to 10 (best), falling one point per 50 g/km.
pub fn co2_rating(co2: f64) -> f64 {
    (11.0 - co2 / 50.0).clamp(1.0, 10.0)
}

/// Computes every derived metric.
///
/// The vehicle class is looked up by the raw, uncanonicalized make, so a
/// brand absent from the dataset gets the default class even when its
/// manufacturer group is present.
pub fn derive_metrics(
    bundle: &ModelOutputBundle,
    request: &VehicleRequest,
    stats: &ReferenceStats,
    constants: &MetricConstants,
) -> Result<DerivedMetrics, StatsError> {
    let combined = bundle.combined_fuel;
    let co2 = bundle.co2;
    let fuel_price = constants.fuel_price(&request.fuel_type);

    let annual_fuel_cost = combined * constants.annual_distance_km / 100.0 * fuel_price;

    let vehicle_class = stats
        .vehicle_class_for_make(&request.make)
        .unwrap_or(&constants.default_vehicle_class)
        .to_string();
    let vehicle_class_range = stats.lookup_class_range(&vehicle_class)?.to_string();

    let co2_rating = co2_rating(co2);
    let eco_score = (co2_rating + bundle.smog_rating as f64) / 2.0;
    let co2_tax = co2 * constants.annual_distance_km * constants.carbon_tax_rate;

    let fuel_efficiency_score = if combined > 0.0 {
        guarded_div(1.0, combined + co2 / 100.0)
    } else {
        0.0
    };
    let cost_per_passenger_km =
        guarded_div(fuel_price, combined) * guarded_div(100.0, constants.passengers);

    Ok(DerivedMetrics {
        annual_fuel_cost: round_to_int(annual_fuel_cost),
        vehicle_class,
        vehicle_class_range,
        co2_rating: round_to(co2_rating, 1),
        eco_score: round_to(eco_score, 1),
        co2_tax: round_to(co2_tax, 2),
        fuel_efficiency_score: round_to(fuel_efficiency_score, 4),
        cost_per_passenger_km: round_to(cost_per_passenger_km, 4),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ReferenceDataset;
    use crate::dataset::fixtures::sample_records;
    use crate::taxonomy::Taxonomy;

    fn stats() -> ReferenceStats {
        ReferenceStats::build(&ReferenceDataset::new(sample_records(), &Taxonomy::standard()))
    }

    fn bundle(co2: f64, combined_fuel: f64, smog_rating: i64) -> ModelOutputBundle {
        ModelOutputBundle {
            co2,
            combined_fuel,
            city_fuel: combined_fuel,
            highway_fuel: combined_fuel,
            smog_rating,
            combined_mpg: 0,
        }
    }

    #[test]
    fn test_toyota_regular_metrics() {
        let metrics = derive_metrics(
            &bundle(260.0, 10.8, 5),
            &VehicleRequest::new(2022, "Toyota", "A6", "X"),
            &stats(),
            &MetricConstants::default(),
        )
        .unwrap();

        assert_eq!(metrics.annual_fuel_cost, 3346);
        assert_eq!(metrics.vehicle_class, "Sport utility vehicle: Small");
        assert_eq!(metrics.vehicle_class_range, "7.2 – 8.4");
        assert_eq!(metrics.co2_rating, 5.8);
        assert_eq!(metrics.eco_score, 5.4);
        assert_eq!(metrics.co2_tax, 494.0);
        assert_eq!(metrics.fuel_efficiency_score, 0.0746);
        assert_eq!(metrics.cost_per_passenger_km, 2.8685);
    }

    #[test]
    fn test_zero_combined_fuel_guards() {
        let metrics = derive_metrics(
            &bundle(120.0, 0.0, 6),
            &VehicleRequest::new(2022, "Honda", "AV", "X"),
            &stats(),
            &MetricConstants::default(),
        )
        .unwrap();

        assert_eq!(metrics.fuel_efficiency_score, 0.0);
        assert_eq!(metrics.cost_per_passenger_km, 0.0);
        assert_eq!(metrics.annual_fuel_cost, 0);
    }

    #[test]
    fn test_eco_score_half_rounds_to_even() {
        let metrics = derive_metrics(
            &bundle(225.0, 9.0, 6),
            &VehicleRequest::new(2022, "Toyota", "A6", "X"),
            &stats(),
            &MetricConstants::default(),
        )
        .unwrap();

        assert_eq!(metrics.co2_rating, 6.5);
        // (6.5 + 6) / 2 = 6.25
        assert_eq!(metrics.eco_score, 6.2);
    }

    #[test]
    fn test_co2_rating_bounds() {
        for co2 in [-500.0, 0.0, 49.9, 50.0, 275.0, 499.0, 500.0, 1e9] {
            let rating = co2_rating(co2);
            assert!((1.0..=10.0).contains(&rating), "co2={co2} rating={rating}");
        }
        assert_eq!(co2_rating(0.0), 10.0);
        assert_eq!(co2_rating(1000.0), 1.0);
    }

    #[test]
    fn test_vehicle_class_uses_raw_make() {
        let stats = stats();
        let constants = MetricConstants::default();

        // Lexus canonicalizes to Toyota but has its own class history.
        let lexus = derive_metrics(
            &bundle(222.0, 9.5, 5),
            &VehicleRequest::new(2022, "Lexus", "A8", "X"),
            &stats,
            &constants,
        )
        .unwrap();
        assert_eq!(lexus.vehicle_class, "Mid-size");
        assert_eq!(lexus.vehicle_class_range, "9.5 – 9.5");

        // Mazda never appears in the dataset, so the default class applies.
        let mazda = derive_metrics(
            &bundle(200.0, 8.0, 6),
            &VehicleRequest::new(2022, "Mazda", "A6", "X"),
            &stats,
            &constants,
        )
        .unwrap();
        assert_eq!(mazda.vehicle_class, "Sport utility vehicle: Small");
    }

    #[test]
    fn test_default_class_missing_from_dataset() {
        let constants = MetricConstants {
            default_vehicle_class: "Minivan".to_string(),
            ..MetricConstants::default()
        };
        let err = derive_metrics(
            &bundle(200.0, 8.0, 6),
            &VehicleRequest::new(2022, "Mazda", "A6", "X"),
            &stats(),
            &constants,
        )
        .unwrap_err();
        assert_eq!(err, StatsError::UnknownVehicleClass("Minivan".to_string()));
    }

    #[test]
    fn test_premium_fuel_price() {
        let metrics = derive_metrics(
            &bundle(195.0, 8.3, 6),
            &VehicleRequest::new(2022, "BMW", "AS8", "Z"),
            &stats(),
            &MetricConstants::default(),
        )
        .unwrap();

        // 8.3 L/100 km * 200 * 1.841
        assert_eq!(metrics.annual_fuel_cost, 3056);
        assert_eq!(metrics.vehicle_class, "Compact");
    }
}
