//! The assembled prediction engine: every startup artifact, built once and
//! shared read-only across requests.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::dataset::ReferenceDataset;
use crate::dataset::insights::EmissionInsights;
use crate::dataset::stats::ReferenceStats;
use crate::encoding::{AlignedFeatures, EncoderState, FeatureAligner, FeatureSchema};
use crate::error::PredictError;
use crate::metrics::{DerivedMetrics, MetricConstants, derive_metrics};
use crate::models::{ModelOutputBundle, ModelSet, load_models};
use crate::request::{FuelType, ValidOptions, VehicleRequest, YEAR_MAX, YEAR_MIN};
use crate::taxonomy::Taxonomy;

/// Where the startup artifacts live.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub dataset: PathBuf,
    pub models_dir: PathBuf,
    pub pricing: Option<PathBuf>,
    pub strict_taxonomy: bool,
}

/// The flat response payload for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// CO2 emissions, g/km
    pub prediction: f64,
    pub combined_fuel: f64,
    pub city_fuel: f64,
    pub highway_fuel: f64,
    pub combined_mpg: i64,
    pub smog_rating: i64,
    pub annual_fuel_cost: i64,
    pub vehicle_class_range: String,
    pub co2_rating: f64,
    pub eco_score: f64,
    pub co2_tax: f64,
    pub fuel_efficiency_score: f64,
    pub cost_per_passenger_km: f64,
}

impl PredictionReport {
    pub fn new(bundle: &ModelOutputBundle, metrics: DerivedMetrics) -> Self {
        Self {
            prediction: bundle.co2,
            combined_fuel: bundle.combined_fuel,
            city_fuel: bundle.city_fuel,
            highway_fuel: bundle.highway_fuel,
            combined_mpg: bundle.combined_mpg,
            smog_rating: bundle.smog_rating,
            annual_fuel_cost: metrics.annual_fuel_cost,
            vehicle_class_range: metrics.vehicle_class_range,
            co2_rating: metrics.co2_rating,
            eco_score: metrics.eco_score,
            co2_tax: metrics.co2_tax,
            fuel_efficiency_score: metrics.fuel_efficiency_score,
            cost_per_passenger_km: metrics.cost_per_passenger_km,
        }
    }
}

#[derive(Debug)]
pub struct Predictor {
    taxonomy: Taxonomy,
    dataset: ReferenceDataset,
    stats: ReferenceStats,
    encoder: EncoderState,
    models: ModelSet,
    constants: MetricConstants,
    insights: EmissionInsights,
}

impl Predictor {
    /// Fits the encoder and statistics over `dataset` and checks that every
    /// model was trained on the resulting schema.
    pub fn new(
        taxonomy: Taxonomy,
        dataset: ReferenceDataset,
        models: ModelSet,
        constants: MetricConstants,
    ) -> Result<Self> {
        let encoder = EncoderState::fit(&dataset).context("failed to fit categorical encoder")?;
        Self::assemble(taxonomy, dataset, encoder, models, constants)
    }

    /// Loads the dataset, models and pricing named by `config`. Any failure
    /// here is fatal: no partially built predictor is ever returned.
    #[tracing::instrument(skip_all, fields(dataset = %config.dataset.display(), models_dir = %config.models_dir.display()))]
    pub fn load(config: &PredictorConfig) -> Result<Self> {
        let taxonomy = Taxonomy::standard();
        let dataset = ReferenceDataset::load(&config.dataset, &taxonomy, config.strict_taxonomy)?;
        let encoder = EncoderState::fit(&dataset).context("failed to fit categorical encoder")?;
        let models = load_models(&config.models_dir, encoder.schema())?;
        let constants = match &config.pricing {
            Some(path) => MetricConstants::load(path)?,
            None => MetricConstants::default(),
        };

        Self::assemble(taxonomy, dataset, encoder, models, constants)
    }

    fn assemble(
        taxonomy: Taxonomy,
        dataset: ReferenceDataset,
        encoder: EncoderState,
        models: ModelSet,
        constants: MetricConstants,
    ) -> Result<Self> {
        models
            .check_schema(encoder.schema())
            .context("model feature names disagree with the encoder")?;

        let stats = ReferenceStats::build(&dataset);
        let insights = EmissionInsights::from_records(dataset.records());

        info!(
            records = dataset.len(),
            excluded = dataset.excluded_count(),
            columns = encoder.schema().len(),
            "Predictor ready"
        );

        Ok(Self {
            taxonomy,
            dataset,
            stats,
            encoder,
            models,
            constants,
            insights,
        })
    }

    /// Runs only the alignment stage.
    pub fn align(&self, request: &VehicleRequest) -> Result<AlignedFeatures<'_>, PredictError> {
        FeatureAligner::new(&self.taxonomy, &self.stats, &self.encoder).align(request)
    }

    /// align, infer, derive.
    #[tracing::instrument(
        skip_all,
        fields(year = request.year, make = %request.make, transmission = %request.transmission, fuel_type = %request.fuel_type)
    )]
    pub fn predict(&self, request: &VehicleRequest) -> Result<PredictionReport, PredictError> {
        let aligned = self.align(request)?;
        let bundle = self.models.infer(&aligned.vector)?;
        let metrics = derive_metrics(&bundle, request, &self.stats, &self.constants)?;

        debug!(
            vehicle_class = %metrics.vehicle_class,
            co2 = bundle.co2,
            fallback = aligned.means.used_fallback(),
            "Prediction complete"
        );

        Ok(PredictionReport::new(&bundle, metrics))
    }

    pub fn options(&self) -> ValidOptions {
        ValidOptions {
            makes: self.taxonomy.brand.categories(),
            transmissions: self.taxonomy.transmission.categories(),
            fuel_types: FuelType::codes(),
            year_min: YEAR_MIN,
            year_max: YEAR_MAX,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.encoder.schema()
    }

    pub fn insights(&self) -> &EmissionInsights {
        &self.insights
    }

    pub fn constants(&self) -> &MetricConstants {
        &self.constants
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }
}
