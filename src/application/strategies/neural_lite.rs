use super::{AnalysisContext, Call, PredictionStrategy};
use crate::application::features::FeatureVector;
use crate::domain::types::Category;

/// Fixed weights over the eight normalized feature fields, in the order
/// big5, small5, big10, small10, streak, volatility, pattern, trend.
/// Hand-tuned constants, not a learned model.
const WEIGHTS: [f64; 8] = [1.6, -1.6, 0.8, -0.8, 0.3, -0.4, 0.5, 0.9];
const BIAS: f64 = -0.75;

const STREAK_CAP: f64 = 10.0;

/// Neural-lite Strategy
///
/// A single logistic unit: the feature vector is normalized into [0, 1]
/// inputs, passed through a fixed linear layer and squashed into a
/// probability of Big.
#[derive(Debug, Clone, Default)]
pub struct NeuralLiteStrategy;

impl NeuralLiteStrategy {
    /// Probability of the next result being Big, in (0, 1).
    pub fn probability_of_big(features: &FeatureVector) -> f64 {
        let inputs = [
            f64::from(features.big_count_5) / 5.0,
            f64::from(features.small_count_5) / 5.0,
            f64::from(features.big_count_10) / 10.0,
            f64::from(features.small_count_10) / 10.0,
            (f64::from(features.current_streak)).min(STREAK_CAP) / STREAK_CAP,
            features.volatility,
            features.pattern_score,
            features.trend_strength,
        ];

        let z: f64 = inputs
            .iter()
            .zip(WEIGHTS.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + BIAS;

        logistic(z)
    }
}

fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl PredictionStrategy for NeuralLiteStrategy {
    fn analyze(&self, ctx: &AnalysisContext) -> Call {
        let p_big = Self::probability_of_big(&ctx.features);
        let (category, confidence) = if p_big >= 0.5 {
            (Category::Big, p_big)
        } else {
            (Category::Small, 1.0 - p_big)
        };
        Call::new(category, confidence, format!("p(Big) = {p_big:.3}"))
    }

    fn name(&self) -> &'static str {
        "neural"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Category::{Big, Small};

    #[test]
    fn test_probability_is_bounded() {
        for recent in [vec![Big; 30], vec![Small; 30], vec![]] {
            let features = FeatureVector::from_history(&recent);
            let p = NeuralLiteStrategy::probability_of_big(&features);
            assert!(p > 0.0 && p < 1.0, "p = {p}");
        }
    }

    #[test]
    fn test_big_history_leans_big() {
        let big_run = FeatureVector::from_history(&[Big; 20]);
        let small_run = FeatureVector::from_history(&[Small; 20]);
        let p_big = NeuralLiteStrategy::probability_of_big(&big_run);
        let p_small = NeuralLiteStrategy::probability_of_big(&small_run);
        assert!(p_big > 0.5);
        assert!(p_small < 0.5);
    }

    #[test]
    fn test_deterministic() {
        let features = FeatureVector::from_history(&[Big, Small, Big, Big, Small, Big]);
        let a = NeuralLiteStrategy::probability_of_big(&features);
        let b = NeuralLiteStrategy::probability_of_big(&features);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_call_confidence_at_least_half() {
        let ctx = AnalysisContext::from_history(vec![Big, Small, Big, Small, Big, Small]);
        let call = NeuralLiteStrategy.analyze(&ctx);
        assert!(call.confidence >= 0.5);
    }
}
