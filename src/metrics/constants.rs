use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Fuel prices and fixed rates used by the derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricConstants {
    /// CAD per litre, keyed by fuel type code.
    pub fuel_prices: BTreeMap<String, f64>,
    /// Price used for a fuel code missing from `fuel_prices`.
    pub default_fuel_price: f64,
    pub annual_distance_km: f64,
    /// CAD per gram of CO2.
    pub carbon_tax_rate: f64,
    pub passengers: f64,
    /// Class used when the requested make never appears in the dataset.
    pub default_vehicle_class: String,
}

impl Default for MetricConstants {
    fn default() -> Self {
        let fuel_prices = [("D", 1.702), ("E", 1.601), ("X", 1.549), ("Z", 1.841)]
            .into_iter()
            .map(|(code, price)| (code.to_string(), price))
            .collect();

        Self {
            fuel_prices,
            default_fuel_price: 1.549,
            annual_distance_km: 20_000.0,
            carbon_tax_rate: 0.000095,
            passengers: 5.0,
            default_vehicle_class: "Sport utility vehicle: Small".to_string(),
        }
    }
}

/// Any subset of [`MetricConstants`], as stored in a pricing file:
///
/// ```json
/// { "fuel_prices": { "X": 1.62 }, "carbon_tax_rate": 0.00008 }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PricingOverrides {
    fuel_prices: Option<BTreeMap<String, f64>>,
    default_fuel_price: Option<f64>,
    annual_distance_km: Option<f64>,
    carbon_tax_rate: Option<f64>,
    passengers: Option<f64>,
    default_vehicle_class: Option<String>,
}

impl MetricConstants {
    /// Loads overrides from a JSON file at `path` on top of the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pricing config '{}'", path.display()))?;
        let constants = Self::from_json(&content)
            .with_context(|| format!("failed to parse pricing config '{}'", path.display()))?;

        info!(path = %path.display(), "Pricing overrides loaded");
        Ok(constants)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let overrides: PricingOverrides = serde_json::from_str(content)?;
        Ok(Self::default().with_overrides(overrides))
    }

    fn with_overrides(mut self, overrides: PricingOverrides) -> Self {
        if let Some(prices) = overrides.fuel_prices {
            self.fuel_prices.extend(prices);
        }
        if let Some(price) = overrides.default_fuel_price {
            self.default_fuel_price = price;
        }
        if let Some(distance) = overrides.annual_distance_km {
            self.annual_distance_km = distance;
        }
        if let Some(rate) = overrides.carbon_tax_rate {
            self.carbon_tax_rate = rate;
        }
        if let Some(passengers) = overrides.passengers {
            self.passengers = passengers;
        }
        if let Some(class) = overrides.default_vehicle_class {
            self.default_vehicle_class = class;
        }
        self
    }

    /// Price per litre for a fuel code, or the default price for an unknown code.
    pub fn fuel_price(&self, fuel_type: &str) -> f64 {
        self.fuel_prices
            .get(fuel_type)
            .copied()
            .unwrap_or(self.default_fuel_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prices() {
        let constants = MetricConstants::default();
        assert_eq!(constants.fuel_price("D"), 1.702);
        assert_eq!(constants.fuel_price("Z"), 1.841);
    }

    #[test]
    fn test_unknown_fuel_uses_default_price() {
        let constants = MetricConstants::default();
        assert_eq!(constants.fuel_price("Q"), 1.549);
    }

    #[test]
    fn test_partial_overrides_keep_other_values() {
        let constants =
            MetricConstants::from_json(r#"{"fuel_prices": {"X": 1.62}, "passengers": 4}"#).unwrap();

        assert_eq!(constants.fuel_price("X"), 1.62);
        assert_eq!(constants.fuel_price("D"), 1.702);
        assert_eq!(constants.passengers, 4.0);
        assert_eq!(constants.annual_distance_km, 20_000.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(MetricConstants::from_json(r#"{"fuel_price": 2.0}"#).is_err());
    }
}
