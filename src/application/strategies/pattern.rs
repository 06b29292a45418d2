use super::{AnalysisContext, Call, PredictionStrategy};
use crate::application::features::current_streak;
use crate::domain::types::Category;

const REVERSAL_STREAK: u32 = 3;

/// Pattern Strategy
///
/// Mean-reversion on the current run: three or more identical results in a
/// row predicts the opposite category at 0.70; a shorter run follows the
/// most recent result at 0.60.
#[derive(Debug, Clone, Default)]
pub struct PatternStrategy;

impl PredictionStrategy for PatternStrategy {
    fn analyze(&self, ctx: &AnalysisContext) -> Call {
        if ctx.recent.len() < 3 {
            return Call::new(Category::Small, 0.5, "fewer than 3 samples");
        }

        let streak = current_streak(&ctx.recent);
        let latest = ctx.recent[0];

        if streak >= REVERSAL_STREAK {
            Call::new(
                latest.opposite(),
                0.70,
                format!("reversal after {streak}-long {latest} run"),
            )
        } else {
            Call::new(latest, 0.60, format!("following {latest} (streak {streak})"))
        }
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Category::{Big, Small};

    #[test]
    fn test_reversal_on_long_streak() {
        let ctx = AnalysisContext::from_history(vec![Big, Big, Big, Small]);
        let call = PatternStrategy.analyze(&ctx);
        assert_eq!(call.category, Small);
        assert!((call.confidence - 0.70).abs() < 1e-9);
    }

    #[test]
    fn test_follows_latest_on_short_streak() {
        let ctx = AnalysisContext::from_history(vec![Small, Big, Small, Big]);
        let call = PatternStrategy.analyze(&ctx);
        assert_eq!(call.category, Small);
        assert!((call.confidence - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_too_little_history() {
        let ctx = AnalysisContext::from_history(vec![Big, Big]);
        let call = PatternStrategy.analyze(&ctx);
        assert_eq!(call.category, Small);
        assert!((call.confidence - 0.5).abs() < 1e-9);
    }
}
