//! Drop-first one-hot encoding fitted on the canonical categories of the
//! reference dataset.

use std::collections::BTreeSet;

use crate::error::EncodeError;

pub const MAKE_FIELD: &str = "Make";
pub const TRANSMISSION_FIELD: &str = "Transmission";
pub const FUEL_TYPE_FIELD: &str = "Fuel type";

/// One categorical input with its fitted categories in sorted order.
///
/// `categories[0]` is the reference category: it has no column and is
/// represented by every column of the field being zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalField {
    name: String,
    categories: Vec<String>,
}

impl CategoricalField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn reference_category(&self) -> &str {
        &self.categories[0]
    }

    /// Column names for the non-reference categories, `<field>_<category>`.
    pub fn columns(&self) -> impl Iterator<Item = String> + '_ {
        self.categories[1..]
            .iter()
            .map(move |c| format!("{}_{}", self.name, c))
    }

    pub fn width(&self) -> usize {
        self.categories.len() - 1
    }

    /// Index of `category` among the fitted categories, or an error listing
    /// what was observed at fit time.
    pub fn category_index(&self, category: &str) -> Result<usize, EncodeError> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .map_err(|_| EncodeError::InvalidCategory {
                field: self.name.clone(),
                category: category.to_string(),
                valid: self.categories.clone(),
            })
    }
}

/// Fitted encoder over an ordered list of categorical fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalEncoder {
    fields: Vec<CategoricalField>,
}

impl CategoricalEncoder {
    /// Fits one field per `(name, observed values)` pair, keeping field order.
    pub fn fit<I, V, S>(fields: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, values)| {
                let categories: BTreeSet<String> = values.into_iter().map(Into::into).collect();
                if categories.is_empty() {
                    return Err(EncodeError::EmptyField(name));
                }
                Ok(CategoricalField {
                    name,
                    categories: categories.into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[CategoricalField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CategoricalField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All one-hot column names in fit order.
    pub fn feature_names(&self) -> Vec<String> {
        self.fields.iter().flat_map(|f| f.columns()).collect()
    }

    pub fn width(&self) -> usize {
        self.fields.iter().map(CategoricalField::width).sum()
    }

    /// Encodes one value per field into `(column, 0|1)` cells covering every
    /// one-hot column.
    pub fn encode(&self, values: &[&str]) -> Result<Vec<(String, f64)>, EncodeError> {
        if values.len() != self.fields.len() {
            return Err(EncodeError::WidthMismatch {
                expected: self.fields.len(),
                found: values.len(),
            });
        }

        let mut cells = Vec::with_capacity(self.width());
        for (field, value) in self.fields.iter().zip(values) {
            let hot = field.category_index(value)?;
            for (i, column) in field.columns().enumerate() {
                let bit = if i + 1 == hot { 1.0 } else { 0.0 };
                cells.push((column, bit));
            }
        }

        Ok(cells)
    }

    /// Recovers one category per field from the one-hot portion of a row.
    /// An all-zero field decodes to its reference category.
    pub fn decode(&self, row: &[f64]) -> Result<Vec<String>, EncodeError> {
        if row.len() != self.width() {
            return Err(EncodeError::WidthMismatch {
                expected: self.width(),
                found: row.len(),
            });
        }

        let mut offset = 0;
        let mut decoded = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let slice = &row[offset..offset + field.width()];
            offset += field.width();

            let hot: Vec<usize> = slice
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0.0)
                .map(|(i, _)| i)
                .collect();

            let category = match hot.as_slice() {
                [] => field.reference_category(),
                [i] => field.categories[i + 1].as_str(),
                _ => {
                    return Err(EncodeError::AmbiguousRow {
                        field: field.name.clone(),
                        hot: hot.len(),
                    });
                }
            };
            decoded.push(category.to_string());
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> CategoricalEncoder {
        CategoricalEncoder::fit(vec![
            (
                MAKE_FIELD.to_string(),
                vec!["Toyota", "Honda", "BMW Group", "Toyota"],
            ),
            (FUEL_TYPE_FIELD.to_string(), vec!["X", "Z", "D"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fit_drops_first_sorted_category() {
        let encoder = encoder();
        assert_eq!(
            encoder.feature_names(),
            vec!["Make_Honda", "Make_Toyota", "Fuel type_X", "Fuel type_Z"]
        );
        assert_eq!(encoder.field(MAKE_FIELD).unwrap().reference_category(), "BMW Group");
    }

    #[test]
    fn test_encode_sets_one_bit_per_field() {
        let cells = encoder().encode(&["Toyota", "X"]).unwrap();
        let bits: Vec<f64> = cells.iter().map(|(_, v)| *v).collect();
        assert_eq!(bits, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_encode_reference_category_is_all_zero() {
        let cells = encoder().encode(&["BMW Group", "D"]).unwrap();
        assert!(cells.iter().all(|(_, v)| *v == 0.0));
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_encode_unseen_category() {
        let err = encoder().encode(&["Volvo", "X"]).unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidCategory {
                field: "Make".to_string(),
                category: "Volvo".to_string(),
                valid: vec!["BMW Group".into(), "Honda".into(), "Toyota".into()],
            }
        );
    }

    #[test]
    fn test_decode_recovers_categories() {
        let encoder = encoder();
        for (make, fuel) in [("Toyota", "Z"), ("BMW Group", "X"), ("Honda", "D")] {
            let row: Vec<f64> = encoder
                .encode(&[make, fuel])
                .unwrap()
                .into_iter()
                .map(|(_, v)| v)
                .collect();
            assert_eq!(encoder.decode(&row).unwrap(), vec![make, fuel]);
        }
    }

    #[test]
    fn test_decode_rejects_two_hot_columns() {
        let err = encoder().decode(&[1.0, 1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            EncodeError::AmbiguousRow {
                field: "Make".to_string(),
                hot: 2
            }
        );
    }

    #[test]
    fn test_fit_empty_field() {
        let err = CategoricalEncoder::fit(vec![(MAKE_FIELD.to_string(), Vec::<String>::new())])
            .unwrap_err();
        assert_eq!(err, EncodeError::EmptyField("Make".to_string()));
    }
}
