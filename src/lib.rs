pub mod artifact;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod metrics;
pub mod models;
pub mod output;
pub mod predictor;
pub mod request;
pub mod server;
pub mod taxonomy;
pub mod utility;
