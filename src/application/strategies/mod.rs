mod fusion;
mod neural_lite;
mod pattern;
mod statistical;
mod trend;

pub use fusion::{FusionEngine, FusionOutput, FusionPolicy, MIN_HISTORY};
pub use neural_lite::NeuralLiteStrategy;
pub use pattern::PatternStrategy;
pub use statistical::StatisticalStrategy;
pub use trend::TrendStrategy;

use crate::application::features::FeatureVector;
use crate::domain::types::Category;

/// Everything a sub-model may look at for one cycle: the raw history slice
/// (newest first) and the features derived from it.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub recent: Vec<Category>,
    pub features: FeatureVector,
}

impl AnalysisContext {
    pub fn from_history(recent: Vec<Category>) -> Self {
        let features = FeatureVector::from_history(&recent);
        Self { recent, features }
    }
}

/// A directional call from a single sub-model.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub category: Category,
    pub confidence: f64,
    pub reason: String,
}

impl Call {
    pub fn new(category: Category, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            category,
            confidence,
            reason: reason.into(),
        }
    }
}

/// One heuristic sub-model. Implementations are pure functions of the
/// context - no internal state, no randomness.
pub trait PredictionStrategy: Send + Sync {
    fn analyze(&self, ctx: &AnalysisContext) -> Call;

    fn name(&self) -> &'static str;
}
