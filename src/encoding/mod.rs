//! Feature encoding: the fitted categorical encoder, the feature schema it
//! fixes, and the alignment pipeline that turns a request into a model row.

pub mod align;
pub mod encoder;
pub mod schema;

pub use align::{AlignedFeatures, FeatureAligner};
pub use encoder::{CategoricalEncoder, CategoricalField};
pub use schema::{FeatureSchema, FeatureVector, NUMERIC_COLUMNS};

use tracing::info;

use crate::dataset::ReferenceDataset;
use crate::error::EncodeError;
use encoder::{FUEL_TYPE_FIELD, MAKE_FIELD, TRANSMISSION_FIELD};

/// The fitted encoder together with the feature schema derived from it.
///
/// Built once at startup and passed by reference into alignment.
#[derive(Debug, Clone)]
pub struct EncoderState {
    encoder: CategoricalEncoder,
    schema: FeatureSchema,
}

impl EncoderState {
    /// Fits make, transmission and fuel type over the canonically labelled records.
    pub fn fit(dataset: &ReferenceDataset) -> Result<Self, EncodeError> {
        let rows: Vec<_> = dataset.canonical_records().collect();

        let encoder = CategoricalEncoder::fit(vec![
            (
                MAKE_FIELD.to_string(),
                rows.iter().map(|(_, c)| c.make.clone()).collect::<Vec<_>>(),
            ),
            (
                TRANSMISSION_FIELD.to_string(),
                rows.iter()
                    .map(|(_, c)| c.transmission.clone())
                    .collect::<Vec<_>>(),
            ),
            (
                FUEL_TYPE_FIELD.to_string(),
                rows.iter()
                    .map(|(r, _)| r.fuel_type.clone())
                    .collect::<Vec<_>>(),
            ),
        ])?;

        Self::from_encoder(encoder)
    }

    /// Wraps an already fitted encoder, deriving the schema: numeric columns
    /// first, then one-hot columns in fit order.
    pub fn from_encoder(encoder: CategoricalEncoder) -> Result<Self, EncodeError> {
        let columns = NUMERIC_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(encoder.feature_names())
            .collect();

        let schema = FeatureSchema::new(columns)?;

        info!(
            columns = schema.len(),
            one_hot = encoder.width(),
            "Categorical encoder fitted"
        );

        Ok(Self { encoder, schema })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoder(&self) -> &CategoricalEncoder {
        &self.encoder
    }

    /// One-hot cells for the three categorical inputs.
    pub fn encode(
        &self,
        make: &str,
        transmission: &str,
        fuel_type: &str,
    ) -> Result<Vec<(String, f64)>, EncodeError> {
        self.encoder.encode(&[make, transmission, fuel_type])
    }

    /// Recovers `[make, transmission, fuel type]` from a full feature row.
    pub fn decode(&self, vector: &FeatureVector<'_>) -> Result<Vec<String>, EncodeError> {
        self.encoder.decode(&vector.values()[NUMERIC_COLUMNS.len()..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_records;
    use crate::taxonomy::Taxonomy;

    fn sample_state() -> EncoderState {
        let dataset = ReferenceDataset::new(sample_records(), &Taxonomy::standard());
        EncoderState::fit(&dataset).unwrap()
    }

    #[test]
    fn test_schema_layout() {
        let state = sample_state();
        assert_eq!(
            state.schema().columns(),
            &[
                "Model year",
                "Engine size (L)",
                "Cylinders",
                "Make_Ford Motor Company",
                "Make_General Motors",
                "Make_Honda",
                "Make_Toyota",
                "Transmission_Automatic",
                "Transmission_CVT",
                "Transmission_Manual",
                "Fuel type_X",
                "Fuel type_Z",
            ]
        );
    }

    #[test]
    fn test_reference_categories() {
        let state = sample_state();
        let encoder = state.encoder();
        assert_eq!(encoder.field("Make").unwrap().reference_category(), "BMW Group");
        assert_eq!(
            encoder.field("Transmission").unwrap().reference_category(),
            "Automated Manual"
        );
        assert_eq!(encoder.field("Fuel type").unwrap().reference_category(), "D");
    }

    #[test]
    fn test_unmapped_records_do_not_add_categories() {
        let state = sample_state();
        let makes = state.encoder().field("Make").unwrap().categories();
        assert!(!makes.iter().any(|m| m == "Lotus"));
    }
}
