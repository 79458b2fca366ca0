//! Turns a raw [`VehicleRequest`] into a schema-exact [`FeatureVector`].

use tracing::debug;

use super::EncoderState;
use super::schema::{CYLINDERS_COLUMN, ENGINE_SIZE_COLUMN, FeatureVector, YEAR_COLUMN};
use crate::dataset::stats::{NumericMeans, ReferenceStats};
use crate::error::{EncodeError, PredictError, ValidationError};
use crate::request::{FuelType, VehicleRequest};
use crate::taxonomy::{Taxonomy, TaxonomyField};

/// A feature row plus what went into it.
#[derive(Debug, Clone)]
pub struct AlignedFeatures<'s> {
    pub vector: FeatureVector<'s>,
    pub make: String,
    pub transmission: String,
    pub fuel_type: FuelType,
    pub means: NumericMeans,
}

/// Borrows the startup state needed to align requests.
#[derive(Debug, Clone, Copy)]
pub struct FeatureAligner<'a> {
    taxonomy: &'a Taxonomy,
    stats: &'a ReferenceStats,
    encoder: &'a EncoderState,
}

impl<'a> FeatureAligner<'a> {
    pub fn new(taxonomy: &'a Taxonomy, stats: &'a ReferenceStats, encoder: &'a EncoderState) -> Self {
        Self {
            taxonomy,
            stats,
            encoder,
        }
    }

    /// Validates the request, one-hot encodes the categories, imputes engine
    /// size and cylinders and assembles the row in schema order.
    pub fn align(&self, request: &VehicleRequest) -> Result<AlignedFeatures<'a>, PredictError> {
        request.validate_year()?;

        let make = self.canonicalize(TaxonomyField::Make, &request.make)?;
        let transmission = self.canonicalize(TaxonomyField::Transmission, &request.transmission)?;
        let fuel_type: FuelType = request.fuel_type.parse()?;

        let one_hot = self
            .encoder
            .encode(&make, &transmission, fuel_type.code())
            .map_err(rejected_category)?;

        // After encoding, so rejected requests never report a fallback.
        let means = self.stats.lookup_numeric_means(
            request.year,
            &make,
            &transmission,
            fuel_type.code(),
        );

        let numeric = [
            (YEAR_COLUMN.to_string(), f64::from(request.year)),
            (ENGINE_SIZE_COLUMN.to_string(), means.engine_size),
            (CYLINDERS_COLUMN.to_string(), means.cylinders),
        ];

        let vector = self
            .encoder
            .schema()
            .reindex(numeric.into_iter().chain(one_hot))?;

        debug!(features = %vector, "Input preprocessing completed");

        Ok(AlignedFeatures {
            vector,
            make,
            transmission,
            fuel_type,
            means,
        })
    }

    fn canonicalize(&self, field: TaxonomyField, raw: &str) -> Result<String, ValidationError> {
        let table = self.taxonomy.table(field);
        table
            .canonicalize(raw)
            .map(str::to_string)
            .map_err(|_| ValidationError::InvalidInput {
                field: field.as_str().to_string(),
                value: raw.to_string(),
                valid: table.categories(),
            })
    }
}

/// A canonical category the encoder never saw is a bad request, not a zero row.
fn rejected_category(err: EncodeError) -> PredictError {
    match err {
        EncodeError::InvalidCategory {
            field,
            category,
            valid,
        } => ValidationError::InvalidInput {
            field: field.to_lowercase(),
            value: category,
            valid,
        }
        .into(),
        other => PredictError::Encoding(other),
    }
}
