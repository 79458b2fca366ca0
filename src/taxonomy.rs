//! Static taxonomy tables mapping raw brand and transmission labels to the
//! canonical categories the models were trained on.
//!
//! The tables are plain data built once at startup and handed to whoever
//! needs them; nothing here is global state.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::TaxonomyError;

/// Brand → manufacturer group.
static BRAND_ENTRIES: &[(&str, &str)] = &[
    ("Toyota", "Toyota"),
    ("Lexus", "Toyota"),
    ("Mazda", "Toyota"),
    ("Subaru", "Toyota"),
    ("Volkswagen", "Volkswagen Group"),
    ("Audi", "Volkswagen Group"),
    ("Porsche", "Volkswagen Group"),
    ("Bentley", "Volkswagen Group"),
    ("Bugatti", "Volkswagen Group"),
    ("Lamborghini", "Volkswagen Group"),
    ("Chevrolet", "General Motors"),
    ("GMC", "General Motors"),
    ("Cadillac", "General Motors"),
    ("Buick", "General Motors"),
    ("Ford", "Ford Motor Company"),
    ("Lincoln", "Ford Motor Company"),
    ("Chrysler", "Stellantis"),
    ("Dodge", "Stellantis"),
    ("Jeep", "Stellantis"),
    ("Ram", "Stellantis"),
    ("FIAT", "Stellantis"),
    ("Maserati", "Stellantis"),
    ("Alfa Romeo", "Stellantis"),
    ("Honda", "Honda"),
    ("Acura", "Honda"),
    ("Hyundai", "Hyundai Motor Group"),
    ("Kia", "Hyundai Motor Group"),
    ("Genesis", "Hyundai Motor Group"),
    ("BMW", "BMW Group"),
    ("MINI", "BMW Group"),
    ("Rolls-Royce", "BMW Group"),
    ("Mercedes-Benz", "Mercedes-Benz Group"),
    ("Aston Martin", "Mercedes-Benz Group"),
    ("Nissan", "Nissan-Renault Alliance"),
    ("Infiniti", "Nissan-Renault Alliance"),
    ("Mitsubishi", "Nissan-Renault Alliance"),
    ("Ferrari", "Ferrari"),
    ("Land Rover", "Tata"),
    ("Jaguar", "Tata"),
    ("Volvo", "Volvo"),
];

/// Transmission code → transmission type.
static TRANSMISSION_ENTRIES: &[(&str, &str)] = &[
    ("M5", "Manual"),
    ("M6", "Manual"),
    ("M7", "Manual"),
    ("A4", "Automatic"),
    ("A5", "Automatic"),
    ("A6", "Automatic"),
    ("A7", "Automatic"),
    ("A8", "Automatic"),
    ("A9", "Automatic"),
    ("A10", "Automatic"),
    ("AS5", "Automated Manual"),
    ("AS6", "Automated Manual"),
    ("AS7", "Automated Manual"),
    ("AS8", "Automated Manual"),
    ("AS9", "Automated Manual"),
    ("AS10", "Automated Manual"),
    ("AM6", "Dual-Clutch"),
    ("AM7", "Dual-Clutch"),
    ("AM8", "Dual-Clutch"),
    ("AM9", "Dual-Clutch"),
    ("AV", "CVT"),
    ("AV1", "CVT"),
    ("AV6", "CVT"),
    ("AV7", "CVT"),
    ("AV8", "CVT"),
    ("AV10", "CVT"),
];

/// The two independent taxonomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyField {
    Make,
    Transmission,
}

impl TaxonomyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyField::Make => "make",
            TaxonomyField::Transmission => "transmission",
        }
    }
}

impl fmt::Display for TaxonomyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single raw label → canonical category table.
#[derive(Debug, Clone)]
pub struct TaxonomyTable {
    field: TaxonomyField,
    entries: HashMap<String, String>,
    categories: BTreeSet<String>,
}

impl TaxonomyTable {
    /// Builds a table from `(raw, canonical)` pairs. A repeated raw label keeps
    /// its last mapping.
    pub fn new<'a>(field: TaxonomyField, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries: HashMap<String, String> = pairs
            .into_iter()
            .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
            .collect();
        let categories = entries.values().cloned().collect();

        Self {
            field,
            entries,
            categories,
        }
    }

    pub fn field(&self) -> TaxonomyField {
        self.field
    }

    /// Maps a raw label to its canonical category.
    ///
    /// A label that already is a canonical category maps to itself, so
    /// canonicalization is idempotent.
    pub fn canonicalize<'a>(&'a self, raw: &'a str) -> Result<&'a str, TaxonomyError> {
        if let Some(canonical) = self.entries.get(raw) {
            return Ok(canonical.as_str());
        }
        if self.categories.contains(raw) {
            return Ok(raw);
        }
        Err(TaxonomyError::UnknownLabel {
            field: self.field.as_str(),
            label: raw.to_string(),
        })
    }

    /// Canonical categories in sorted order.
    pub fn categories(&self) -> Vec<String> {
        self.categories.iter().cloned().collect()
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}

/// Brand and transmission tables, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub brand: TaxonomyTable,
    pub transmission: TaxonomyTable,
}

impl Taxonomy {
    /// The built-in brand and transmission tables.
    pub fn standard() -> Self {
        Self {
            brand: TaxonomyTable::new(TaxonomyField::Make, BRAND_ENTRIES.iter().copied()),
            transmission: TaxonomyTable::new(
                TaxonomyField::Transmission,
                TRANSMISSION_ENTRIES.iter().copied(),
            ),
        }
    }

    pub fn table(&self, field: TaxonomyField) -> &TaxonomyTable {
        match field {
            TaxonomyField::Make => &self.brand,
            TaxonomyField::Transmission => &self.transmission,
        }
    }

    pub fn canonicalize<'a>(
        &'a self,
        field: TaxonomyField,
        raw: &'a str,
    ) -> Result<&'a str, TaxonomyError> {
        self.table(field).canonicalize(raw)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}
