//! The ordered column schema every model input must match, and the feature
//! rows built against it.

use std::collections::HashMap;
use std::fmt;

use crate::error::SchemaError;

pub const YEAR_COLUMN: &str = "Model year";
pub const ENGINE_SIZE_COLUMN: &str = "Engine size (L)";
pub const CYLINDERS_COLUMN: &str = "Cylinders";

/// Numeric columns, always first and in this order.
pub const NUMERIC_COLUMNS: [&str; 3] = [YEAR_COLUMN, ENGINE_SIZE_COLUMN, CYLINDERS_COLUMN];

/// An ordered, duplicate-free list of column names fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), i).is_some() {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self { columns, index })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Places named cells into schema order.
    ///
    /// Every schema column absent from `cells` is set to 0. A cell naming a
    /// column outside the schema is rejected.
    pub fn reindex<'s, I, S>(&'s self, cells: I) -> Result<FeatureVector<'s>, SchemaError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut values = vec![0.0; self.columns.len()];
        for (column, value) in cells {
            let column = column.as_ref();
            let i = self
                .position(column)
                .ok_or_else(|| SchemaError::UnknownColumn(column.to_string()))?;
            values[i] = value;
        }
        Ok(FeatureVector {
            schema: self,
            values,
        })
    }
}

/// A single model input row conforming to a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'s> {
    schema: &'s FeatureSchema,
    values: Vec<f64>,
}

impl<'s> FeatureVector<'s> {
    pub fn schema(&self) -> &'s FeatureSchema {
        self.schema
    }

    pub fn columns(&self) -> &'s [String] {
        self.schema.columns()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.values[i])
    }
}

impl fmt::Display for FeatureVector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.columns().iter().zip(&self.values).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            YEAR_COLUMN.to_string(),
            ENGINE_SIZE_COLUMN.to_string(),
            CYLINDERS_COLUMN.to_string(),
            "Make_Toyota".to_string(),
            "Fuel type_Z".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_reindex_orders_and_zero_fills() {
        let schema = schema();
        let row = schema
            .reindex([
                ("Make_Toyota", 1.0),
                (CYLINDERS_COLUMN, 4.0),
                (YEAR_COLUMN, 2022.0),
                (ENGINE_SIZE_COLUMN, 2.0),
            ])
            .unwrap();

        assert_eq!(row.columns(), schema.columns());
        assert_eq!(row.values(), &[2022.0, 2.0, 4.0, 1.0, 0.0]);
        assert_eq!(row.get("Fuel type_Z"), Some(0.0));
    }

    #[test]
    fn test_reindex_rejects_foreign_column() {
        let schema = schema();
        let err = schema.reindex([("Make_Tesla", 1.0)]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownColumn("Make_Tesla".to_string()));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = FeatureSchema::new(vec!["a".to_string(), "a".to_string()]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn test_display_lists_cells() {
        let schema = FeatureSchema::new(vec!["a".to_string(), "b".to_string()]).unwrap();
        let row = schema.reindex([("b", 1.5)]).unwrap();
        assert_eq!(row.to_string(), "a=0, b=1.5");
    }
}
