use super::{
    AnalysisContext, Call, NeuralLiteStrategy, PatternStrategy, PredictionStrategy,
    StatisticalStrategy, TrendStrategy,
};
use crate::domain::types::Category;
use std::str::FromStr;

/// Below this many historical samples the fallback call is returned
/// unconditionally and fusion is bypassed.
pub const MIN_HISTORY: usize = 10;

const BASE_NEURAL_WEIGHT: f64 = 0.35;
const BASE_STATISTICAL_WEIGHT: f64 = 0.25;
const BASE_PATTERN_WEIGHT: f64 = 0.25;
const BASE_TREND_WEIGHT: f64 = 0.15;

/// Adaptive shift applied between the weight pairs when volatility leaves
/// the middle band.
const WEIGHT_SHIFT: f64 = 0.1;
const HIGH_VOLATILITY: f64 = 0.7;
const LOW_VOLATILITY: f64 = 0.3;

/// How sub-model outputs are combined into the final call.
///
/// Two blending rules ship in the wild for this predictor with no stated
/// reconciliation; both are kept behind this switch and `ArgMax` is the
/// default. Either one is a pure function of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FusionPolicy {
    /// Category from the more confident of trend/pattern, confidence from
    /// the best of trend/pattern/statistical.
    #[default]
    ArgMax,
    /// Volatility-adjusted weighted sum of all four sub-model probabilities.
    Weighted,
}

impl FromStr for FusionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "argmax" => Ok(FusionPolicy::ArgMax),
            "weighted" => Ok(FusionPolicy::Weighted),
            _ => anyhow::bail!("Invalid FUSION_POLICY: {}. Must be 'argmax' or 'weighted'", s),
        }
    }
}

/// The fused result handed to the scheduler.
#[derive(Debug, Clone)]
pub struct FusionOutput {
    pub category: Category,
    /// In `[0.5, 1.0]`.
    pub confidence: f64,
    /// Sub-model name -> weight, summing to 1.
    pub weights: Vec<(String, f64)>,
    pub reasoning: String,
    pub strategy_label: String,
}

/// Blends the heuristic sub-models into one call. Owns no state; given the
/// same context the output is bit-for-bit reproducible.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    policy: FusionPolicy,
    trend: TrendStrategy,
    pattern: PatternStrategy,
    statistical: StatisticalStrategy,
    neural: NeuralLiteStrategy,
}

impl FusionEngine {
    pub fn new(policy: FusionPolicy) -> Self {
        Self {
            policy,
            trend: TrendStrategy,
            pattern: PatternStrategy,
            statistical: StatisticalStrategy,
            neural: NeuralLiteStrategy,
        }
    }

    pub fn policy(&self) -> FusionPolicy {
        self.policy
    }

    pub fn predict(&self, ctx: &AnalysisContext) -> FusionOutput {
        if ctx.recent.len() < MIN_HISTORY {
            return Self::fallback(ctx.recent.len());
        }
        match self.policy {
            FusionPolicy::ArgMax => self.arg_max(ctx),
            FusionPolicy::Weighted => self.weighted(ctx),
        }
    }

    /// Always `(Small, 0.5)` - there is not enough history to say anything.
    fn fallback(samples: usize) -> FusionOutput {
        FusionOutput {
            category: Category::Small,
            confidence: 0.5,
            weights: vec![("fallback".to_string(), 1.0)],
            reasoning: format!("Insufficient data ({samples}/{MIN_HISTORY} samples)"),
            strategy_label: "fallback".to_string(),
        }
    }

    fn arg_max(&self, ctx: &AnalysisContext) -> FusionOutput {
        let trend = self.trend.analyze(ctx);
        let pattern = self.pattern.analyze(ctx);
        let statistical = self.statistical.analyze(ctx);

        let category = if trend.confidence > pattern.confidence {
            trend.category
        } else {
            pattern.category
        };
        let confidence = trend
            .confidence
            .max(pattern.confidence)
            .max(statistical.confidence);

        let total = trend.confidence + pattern.confidence + statistical.confidence;
        let weights = vec![
            (self.trend.name().to_string(), trend.confidence / total),
            (self.pattern.name().to_string(), pattern.confidence / total),
            (
                self.statistical.name().to_string(),
                statistical.confidence / total,
            ),
        ];

        let reasoning = format!(
            "Trend: {}({:.2}), Pattern: {}({:.2}), Statistical: {}({:.2})",
            trend.category,
            trend.confidence,
            pattern.category,
            pattern.confidence,
            statistical.category,
            statistical.confidence,
        );

        FusionOutput {
            category,
            confidence,
            weights,
            reasoning,
            strategy_label: "adaptive_argmax".to_string(),
        }
    }

    fn weighted(&self, ctx: &AnalysisContext) -> FusionOutput {
        let volatility = ctx.features.volatility;
        let (w_neural, w_statistical, w_pattern, w_trend, regime) =
            adaptive_weights(volatility);

        let p_neural = NeuralLiteStrategy::probability_of_big(&ctx.features);
        let p_statistical = directional_probability(&self.statistical.analyze(ctx));
        // Pattern and trend contribute their direction scaled by the
        // corresponding feature magnitude rather than their fixed confidence.
        let p_pattern = scaled_probability(
            self.pattern.analyze(ctx).category,
            ctx.features.pattern_score,
        );
        let p_trend = scaled_probability(
            self.trend.analyze(ctx).category,
            ctx.features.trend_strength,
        );

        let p_big = w_neural * p_neural
            + w_statistical * p_statistical
            + w_pattern * p_pattern
            + w_trend * p_trend;

        let category = if p_big >= 0.5 {
            Category::Big
        } else {
            Category::Small
        };
        let confidence = p_big.max(1.0 - p_big).clamp(0.5, 1.0);

        let weights = vec![
            (self.neural.name().to_string(), w_neural),
            (self.statistical.name().to_string(), w_statistical),
            (self.pattern.name().to_string(), w_pattern),
            (self.trend.name().to_string(), w_trend),
        ];

        let reasoning = format!(
            "p(Big) = {p_big:.3} (neural {p_neural:.2}, statistical {p_statistical:.2}, \
             pattern {p_pattern:.2}, trend {p_trend:.2}; volatility {volatility:.2}, {regime})",
        );

        FusionOutput {
            category,
            confidence,
            weights,
            reasoning,
            strategy_label: "adaptive_weighted".to_string(),
        }
    }
}

/// Base weights shifted toward pattern/trend in choppy markets and toward
/// neural/statistical in quiet ones. The shift keeps the sum at 1.
fn adaptive_weights(volatility: f64) -> (f64, f64, f64, f64, &'static str) {
    if volatility > HIGH_VOLATILITY {
        (
            BASE_NEURAL_WEIGHT - WEIGHT_SHIFT,
            BASE_STATISTICAL_WEIGHT - WEIGHT_SHIFT,
            BASE_PATTERN_WEIGHT + WEIGHT_SHIFT,
            BASE_TREND_WEIGHT + WEIGHT_SHIFT,
            "high volatility",
        )
    } else if volatility < LOW_VOLATILITY {
        (
            BASE_NEURAL_WEIGHT + WEIGHT_SHIFT,
            BASE_STATISTICAL_WEIGHT + WEIGHT_SHIFT,
            BASE_PATTERN_WEIGHT - WEIGHT_SHIFT,
            BASE_TREND_WEIGHT - WEIGHT_SHIFT,
            "low volatility",
        )
    } else {
        (
            BASE_NEURAL_WEIGHT,
            BASE_STATISTICAL_WEIGHT,
            BASE_PATTERN_WEIGHT,
            BASE_TREND_WEIGHT,
            "mid volatility",
        )
    }
}

/// Map a call to a probability of Big at its own confidence.
fn directional_probability(call: &Call) -> f64 {
    match call.category {
        Category::Big => call.confidence,
        Category::Small => 1.0 - call.confidence,
    }
}

/// Map a direction plus a `[0, 1]` magnitude to a probability of Big.
fn scaled_probability(category: Category, magnitude: f64) -> f64 {
    match category {
        Category::Big => 0.5 + magnitude / 2.0,
        Category::Small => 0.5 - magnitude / 2.0,
    }
}
