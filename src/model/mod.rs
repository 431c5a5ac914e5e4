//! Prediction model capability and the linear model behind it

pub mod linear;

pub use linear::*;

use serde::{Deserialize, Serialize};

/// Default model file written by `train` and read by `serve`.
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// How much a feature contributes to the model's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// A fitted model that scores one row of feature values.
///
/// `predict` receives values in `feature_names()` order and has no side
/// effects.
pub trait Predictor: Send + Sync {
    fn feature_names(&self) -> &[String];

    fn predict(&self, row: &[f64]) -> f64;

    /// Importance of each input, sorted by descending importance.
    fn importances(&self) -> Vec<FeatureImportance>;
}
