//! Loading the five model artifacts from a models directory.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tracing::info;

use super::gbdt::TreeEnsemble;
use super::inference::ModelSet;
use crate::artifact;
use crate::encoding::FeatureSchema;

/// The five prediction targets, one model artifact each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTarget {
    Co2,
    CombinedFuel,
    CityFuel,
    HighwayFuel,
    SmogRating,
}

impl ModelTarget {
    pub const ALL: [ModelTarget; 5] = [
        ModelTarget::Co2,
        ModelTarget::CombinedFuel,
        ModelTarget::CityFuel,
        ModelTarget::HighwayFuel,
        ModelTarget::SmogRating,
    ];

    /// Artifact file name without extension.
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            ModelTarget::Co2 => "xgboost_model_CO2_emissions_(g_km)",
            ModelTarget::CombinedFuel => "xgboost_model_Combined_(L_100_km)",
            ModelTarget::CityFuel => "xgboost_model_City_(L_100_km)",
            ModelTarget::HighwayFuel => "xgboost_model_Highway_(L_100_km)",
            ModelTarget::SmogRating => "xgboost_model_Smog_rating",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelTarget::Co2 => "co2",
            ModelTarget::CombinedFuel => "combined_fuel",
            ModelTarget::CityFuel => "city_fuel",
            ModelTarget::HighwayFuel => "highway_fuel",
            ModelTarget::SmogRating => "smog_rating",
        }
    }
}

impl fmt::Display for ModelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reads one JSON ensemble (optionally `.gz`) and validates it against `schema`.
pub fn load_ensemble(path: &Path, schema: &FeatureSchema) -> Result<TreeEnsemble> {
    let reader = artifact::open(path)?;
    let model: TreeEnsemble = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse model artifact '{}'", path.display()))?;

    model
        .validate(schema)
        .with_context(|| format!("model artifact '{}' is invalid", path.display()))?;

    Ok(model)
}

/// Loads all five models from `dir`. Any missing or invalid artifact fails the load.
#[tracing::instrument(skip(schema), fields(dir = %dir.display()))]
pub fn load_models(dir: &Path, schema: &FeatureSchema) -> Result<ModelSet> {
    let load = |target: ModelTarget| -> Result<Box<TreeEnsemble>> {
        let path = artifact::resolve(dir, target.artifact_stem(), "json");
        let model = load_ensemble(&path, schema)
            .with_context(|| format!("failed to load {target} model"))?;
        info!(
            model = %target,
            path = %path.display(),
            trees = model.trees.len(),
            "Model loaded"
        );
        Ok(Box::new(model))
    };

    let models = ModelSet::new(
        load(ModelTarget::Co2)?,
        load(ModelTarget::CombinedFuel)?,
        load(ModelTarget::CityFuel)?,
        load(ModelTarget::HighwayFuel)?,
        load(ModelTarget::SmogRating)?,
    );

    info!("All models loaded successfully");
    Ok(models)
}
