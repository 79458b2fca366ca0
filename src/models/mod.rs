//! Pre-trained regression models: the [`Regressor`] seam, the JSON tree
//! ensemble format, artifact loading and five-model inference.

pub mod gbdt;
pub mod inference;
pub mod loader;
pub mod regressor;

pub use gbdt::TreeEnsemble;
pub use inference::{ModelOutputBundle, ModelSet};
pub use loader::{ModelTarget, load_models};
pub use regressor::Regressor;
