//! Statistics derived once from the reference dataset: grouped numeric means
//! for imputation, per-class fuel consumption ranges and the most common
//! vehicle class per raw make.

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use super::ReferenceDataset;
use crate::error::StatsError;
use crate::utility::mean;

/// Grouping key for numeric imputation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileKey {
    pub year: i32,
    pub make: String,
    pub transmission: String,
    pub fuel_type: String,
}

/// Where an imputed pair of numeric attributes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imputation {
    /// Mean over `records` historical rows with the exact profile.
    Exact { records: usize },
    /// No exact match; dataset-wide means were used.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericMeans {
    pub engine_size: f64,
    pub cylinders: f64,
    pub source: Imputation,
}

impl NumericMeans {
    pub fn used_fallback(&self) -> bool {
        self.source == Imputation::Fallback
    }
}

/// Observed combined fuel consumption bounds for one vehicle class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassRange {
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for ClassRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} – {:.1}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy)]
struct GroupMeans {
    engine_size: f64,
    cylinders: f64,
    records: usize,
}

/// Read-only statistics shared across all requests.
#[derive(Debug, Clone)]
pub struct ReferenceStats {
    groups: HashMap<ProfileKey, GroupMeans>,
    global_engine_size: f64,
    global_cylinders: f64,
    class_ranges: HashMap<String, ClassRange>,
    class_by_make: HashMap<String, String>,
}

impl ReferenceStats {
    /// Computes every statistic in one pass over the dataset.
    ///
    /// Grouped means use only records with canonical labels. Global means,
    /// class ranges and the per-make class mode use every record.
    pub fn build(dataset: &ReferenceDataset) -> Self {
        let mut series: HashMap<ProfileKey, (Vec<f64>, Vec<f64>)> = HashMap::new();

        for (record, labels) in dataset.canonical_records() {
            let key = ProfileKey {
                year: record.year,
                make: labels.make.clone(),
                transmission: labels.transmission.clone(),
                fuel_type: record.fuel_type.clone(),
            };
            let (engines, cylinders) = series.entry(key).or_default();
            engines.push(record.engine_size);
            cylinders.push(record.cylinders);
        }

        let groups = series
            .into_iter()
            .map(|(key, (engines, cylinders))| {
                let means = GroupMeans {
                    engine_size: mean(&engines),
                    cylinders: mean(&cylinders),
                    records: engines.len(),
                };
                (key, means)
            })
            .collect();

        let records = dataset.records();
        let engines: Vec<f64> = records.iter().map(|r| r.engine_size).collect();
        let cylinders: Vec<f64> = records.iter().map(|r| r.cylinders).collect();

        let mut class_ranges: HashMap<String, ClassRange> = HashMap::new();
        let mut class_counts: HashMap<&str, HashMap<&str, usize>> = HashMap::new();

        for record in records {
            class_ranges
                .entry(record.vehicle_class.clone())
                .and_modify(|range| {
                    range.min = range.min.min(record.combined);
                    range.max = range.max.max(record.combined);
                })
                .or_insert(ClassRange {
                    min: record.combined,
                    max: record.combined,
                });

            *class_counts
                .entry(record.make.as_str())
                .or_default()
                .entry(record.vehicle_class.as_str())
                .or_default() += 1;
        }

        let class_by_make = class_counts
            .into_iter()
            .filter_map(|(make, counts)| mode(&counts).map(|class| (make.to_string(), class.to_string())))
            .collect();

        let stats = Self {
            groups,
            global_engine_size: mean(&engines),
            global_cylinders: mean(&cylinders),
            class_ranges,
            class_by_make,
        };

        debug!(
            groups = stats.groups.len(),
            classes = stats.class_ranges.len(),
            global_engine_size = stats.global_engine_size,
            global_cylinders = stats.global_cylinders,
            "Reference statistics built"
        );

        stats
    }

    /// Mean engine size and cylinder count for the exact profile, or the
    /// dataset-wide means when no historical record matches.
    pub fn lookup_numeric_means(
        &self,
        year: i32,
        make: &str,
        transmission: &str,
        fuel_type: &str,
    ) -> NumericMeans {
        let key = ProfileKey {
            year,
            make: make.to_string(),
            transmission: transmission.to_string(),
            fuel_type: fuel_type.to_string(),
        };

        match self.groups.get(&key) {
            Some(group) => NumericMeans {
                engine_size: group.engine_size,
                cylinders: group.cylinders,
                source: Imputation::Exact {
                    records: group.records,
                },
            },
            None => {
                warn!(
                    year,
                    make,
                    transmission,
                    fuel_type,
                    "No similar vehicles found, using overall means"
                );
                self.global_means()
            }
        }
    }

    pub fn global_means(&self) -> NumericMeans {
        NumericMeans {
            engine_size: self.global_engine_size,
            cylinders: self.global_cylinders,
            source: Imputation::Fallback,
        }
    }

    pub fn lookup_class_range(&self, vehicle_class: &str) -> Result<ClassRange, StatsError> {
        self.class_ranges
            .get(vehicle_class)
            .copied()
            .ok_or_else(|| StatsError::UnknownVehicleClass(vehicle_class.to_string()))
    }

    /// Most common vehicle class among records with this raw make.
    pub fn vehicle_class_for_make(&self, raw_make: &str) -> Option<&str> {
        self.class_by_make.get(raw_make).map(String::as_str)
    }
}

/// Highest count wins; ties go to the alphabetically first label.
fn mode<'a>(counts: &HashMap<&'a str, usize>) -> Option<&'a str> {
    counts
        .iter()
        .max_by(|(a_label, a_count), (b_label, b_count)| {
            a_count.cmp(b_count).then_with(|| b_label.cmp(a_label))
        })
        .map(|(label, _)| *label)
}
