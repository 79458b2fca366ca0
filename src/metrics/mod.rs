pub mod constants;
pub mod derive;

pub use constants::MetricConstants;
pub use derive::{DerivedMetrics, co2_rating, derive_metrics};
