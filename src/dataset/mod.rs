//! Reference dataset: loading, canonical labelling and derived statistics.
//!
//! The dataset is read once at startup. [`ReferenceDataset`] pairs each raw
//! record with its canonical labels; [`stats::ReferenceStats`] and
//! [`insights::EmissionInsights`] are computed from it and never change.

pub mod insights;
pub mod record;
pub mod stats;

pub use record::{CanonicalLabels, ReferenceRecord};

use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::artifact;
use crate::taxonomy::{Taxonomy, TaxonomyField};

/// Raw labels found in the dataset that the taxonomy tables cannot map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnmappedLabels {
    pub makes: BTreeSet<String>,
    pub transmissions: BTreeSet<String>,
}

impl UnmappedLabels {
    pub fn is_empty(&self) -> bool {
        self.makes.is_empty() && self.transmissions.is_empty()
    }
}

/// Immutable historical records plus their canonical labels.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    records: Vec<ReferenceRecord>,
    canonical: Vec<Option<CanonicalLabels>>,
    unmapped: UnmappedLabels,
}

impl ReferenceDataset {
    /// Labels every record through `taxonomy`. Records with an unmapped make or
    /// transmission keep `None` canonical labels.
    pub fn new(records: Vec<ReferenceRecord>, taxonomy: &Taxonomy) -> Self {
        let mut unmapped = UnmappedLabels::default();

        let canonical = records
            .iter()
            .map(|r| {
                let make = taxonomy.canonicalize(TaxonomyField::Make, &r.make);
                let transmission =
                    taxonomy.canonicalize(TaxonomyField::Transmission, &r.transmission);

                if make.is_err() {
                    unmapped.makes.insert(r.make.clone());
                }
                if transmission.is_err() {
                    unmapped.transmissions.insert(r.transmission.clone());
                }

                match (make, transmission) {
                    (Ok(make), Ok(transmission)) => Some(CanonicalLabels {
                        make: make.to_string(),
                        transmission: transmission.to_string(),
                    }),
                    _ => None,
                }
            })
            .collect();

        Self {
            records,
            canonical,
            unmapped,
        }
    }

    /// Loads the dataset CSV (optionally `.gz`) from disk.
    ///
    /// With `strict` set, any raw label missing from the taxonomy is a load error.
    #[tracing::instrument(skip(taxonomy), fields(path = %path.display()))]
    pub fn load(path: &Path, taxonomy: &Taxonomy, strict: bool) -> Result<Self> {
        let reader = artifact::open(path)?;
        let records = read_records(reader)
            .with_context(|| format!("failed to parse dataset '{}'", path.display()))?;

        if records.is_empty() {
            bail!("dataset '{}' contains no records", path.display());
        }

        let dataset = Self::new(records, taxonomy);

        if !dataset.unmapped.is_empty() {
            let makes: Vec<_> = dataset.unmapped.makes.iter().cloned().collect();
            let transmissions: Vec<_> = dataset.unmapped.transmissions.iter().cloned().collect();

            if strict {
                bail!(
                    "taxonomy is incomplete for dataset: unmapped makes [{}], unmapped transmissions [{}]",
                    makes.join(", "),
                    transmissions.join(", ")
                );
            }

            warn!(
                unmapped_makes = %makes.join(", "),
                unmapped_transmissions = %transmissions.join(", "),
                excluded_records = dataset.excluded_count(),
                "Dataset contains labels missing from the taxonomy"
            );
        }

        info!(records = dataset.len(), "Dataset loaded");
        Ok(dataset)
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    /// Records with canonical labels, skipping those the taxonomy cannot map.
    pub fn canonical_records(&self) -> impl Iterator<Item = (&ReferenceRecord, &CanonicalLabels)> {
        self.records
            .iter()
            .zip(&self.canonical)
            .filter_map(|(r, c)| c.as_ref().map(|c| (r, c)))
    }

    pub fn unmapped(&self) -> &UnmappedLabels {
        &self.unmapped
    }

    pub fn excluded_count(&self) -> usize {
        self.canonical.iter().filter(|c| c.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Deserializes reference records from CSV with a header row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ReferenceRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let record: ReferenceRecord = result?;
        records.push(record);
    }

    Ok(records)
}
