//! Running the five regression models against one feature vector.

use serde::Serialize;
use std::fmt;
use tracing::{debug, error};

use super::loader::ModelTarget;
use super::regressor::Regressor;
use crate::encoding::{FeatureSchema, FeatureVector};
use crate::error::{InferenceError, ModelError};
use crate::utility::{guarded_div, round_to, round_to_int};

/// Litres per 100 km to US miles per gallon.
pub const MPG_FACTOR: f64 = 235.215;

/// Model outputs at reporting precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelOutputBundle {
    /// CO2 emissions, g/km
    pub co2: f64,
    /// L/100 km
    pub combined_fuel: f64,
    pub city_fuel: f64,
    pub highway_fuel: f64,
    pub smog_rating: i64,
    pub combined_mpg: i64,
}

/// The five immutable models, one per target.
pub struct ModelSet {
    co2: Box<dyn Regressor>,
    combined_fuel: Box<dyn Regressor>,
    city_fuel: Box<dyn Regressor>,
    highway_fuel: Box<dyn Regressor>,
    smog_rating: Box<dyn Regressor>,
}

impl ModelSet {
    pub fn new(
        co2: Box<dyn Regressor>,
        combined_fuel: Box<dyn Regressor>,
        city_fuel: Box<dyn Regressor>,
        highway_fuel: Box<dyn Regressor>,
        smog_rating: Box<dyn Regressor>,
    ) -> Self {
        Self {
            co2,
            combined_fuel,
            city_fuel,
            highway_fuel,
            smog_rating,
        }
    }

    pub fn get(&self, target: ModelTarget) -> &dyn Regressor {
        match target {
            ModelTarget::Co2 => self.co2.as_ref(),
            ModelTarget::CombinedFuel => self.combined_fuel.as_ref(),
            ModelTarget::CityFuel => self.city_fuel.as_ref(),
            ModelTarget::HighwayFuel => self.highway_fuel.as_ref(),
            ModelTarget::SmogRating => self.smog_rating.as_ref(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelTarget, &dyn Regressor)> {
        ModelTarget::ALL.into_iter().map(|t| (t, self.get(t)))
    }

    /// Every model must have been trained on exactly `schema`, in order.
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<(), ModelError> {
        for (_, model) in self.iter() {
            if model.feature_names() != schema.columns() {
                return Err(ModelError::SchemaMismatch {
                    model: model.name().to_string(),
                    expected: schema.columns().to_vec(),
                    found: model.feature_names().to_vec(),
                });
            }
        }
        Ok(())
    }

    fn run(&self, target: ModelTarget, vector: &FeatureVector<'_>) -> Result<f64, InferenceError> {
        let model = self.get(target);
        model.predict(vector.values()).inspect_err(|e| {
            error!(
                model = %target,
                model_name = model.name(),
                features = %vector,
                error = %e,
                "Model prediction failed"
            );
        })
    }

    /// Runs all five models. The models share nothing, so order is irrelevant;
    /// the first failure aborts the request.
    pub fn infer(&self, vector: &FeatureVector<'_>) -> Result<ModelOutputBundle, InferenceError> {
        let co2 = self.run(ModelTarget::Co2, vector)?;
        let combined = self.run(ModelTarget::CombinedFuel, vector)?;
        let city = self.run(ModelTarget::CityFuel, vector)?;
        let highway = self.run(ModelTarget::HighwayFuel, vector)?;
        let smog = self.run(ModelTarget::SmogRating, vector)?;

        debug!(co2, combined, city, highway, smog, "Raw model outputs");

        // mpg comes from the raw output; the other figures from the rounded one.
        let combined_mpg = round_to_int(guarded_div(MPG_FACTOR, combined));

        Ok(ModelOutputBundle {
            co2: round_to(co2, 2),
            combined_fuel: round_to(combined, 1),
            city_fuel: round_to(city, 1),
            highway_fuel: round_to(highway, 1),
            smog_rating: round_to_int(smog),
            combined_mpg,
        })
    }
}

impl fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(target, model)| (target, model.name())))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Returns a fixed value, or fails, regardless of input.
    pub(crate) struct FixedRegressor {
        pub name: String,
        pub feature_names: Vec<String>,
        pub value: Option<f64>,
    }

    impl Regressor for FixedRegressor {
        fn name(&self) -> &str {
            &self.name
        }

        fn feature_names(&self) -> &[String] {
            &self.feature_names
        }

        fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
            if features.len() != self.feature_names.len() {
                return Err(InferenceError::FeatureWidth {
                    model: self.name.clone(),
                    expected: self.feature_names.len(),
                    found: features.len(),
                });
            }
            self.value.ok_or_else(|| InferenceError::NonFinite {
                model: self.name.clone(),
            })
        }
    }

    /// A model set whose outputs are `[co2, combined, city, highway, smog]`.
    pub(crate) fn fixed_models(feature_names: &[String], outputs: [Option<f64>; 5]) -> ModelSet {
        let [co2, combined, city, highway, smog] = outputs.map(|value| -> Box<dyn Regressor> {
            Box::new(FixedRegressor {
                name: "fixed".to_string(),
                feature_names: feature_names.to_vec(),
                value,
            })
        });
        ModelSet::new(co2, combined, city, highway, smog)
    }
}
