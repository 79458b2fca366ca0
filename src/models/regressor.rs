use crate::error::InferenceError;

/// A pre-trained single-output regression model.
///
/// Implementations are immutable after load and shared across requests.
pub trait Regressor: Send + Sync {
    /// Identity used in logs and error messages.
    fn name(&self) -> &str;

    /// Column names the model was trained on, in input order.
    fn feature_names(&self) -> &[String];

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;
}
