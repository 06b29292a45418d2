use super::{AnalysisContext, Call, PredictionStrategy};
use crate::domain::types::Category;

const STAT_LOOKBACK: usize = 20;

/// Statistical Strategy
///
/// Plain majority vote: Big when at least half the window is Big, Small
/// otherwise, always at 0.65.
#[derive(Debug, Clone, Default)]
pub struct StatisticalStrategy;

impl PredictionStrategy for StatisticalStrategy {
    fn analyze(&self, ctx: &AnalysisContext) -> Call {
        let window = &ctx.recent[..ctx.recent.len().min(STAT_LOOKBACK)];
        let big = window.iter().filter(|c| **c == Category::Big).count();

        let category = if big as f64 >= window.len() as f64 / 2.0 {
            Category::Big
        } else {
            Category::Small
        };

        Call::new(
            category,
            0.65,
            format!("{big}/{} Big in window", window.len()),
        )
    }

    fn name(&self) -> &'static str {
        "statistical"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Category::{Big, Small};

    #[test]
    fn test_majority_big() {
        let mut recent = vec![Big; 12];
        recent.extend([Small; 8]);
        let call = StatisticalStrategy.analyze(&AnalysisContext::from_history(recent));
        assert_eq!(call.category, Big);
        assert!((call.confidence - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_majority_small() {
        let mut recent = vec![Small; 12];
        recent.extend([Big; 8]);
        let call = StatisticalStrategy.analyze(&AnalysisContext::from_history(recent));
        assert_eq!(call.category, Small);
    }

    #[test]
    fn test_exact_half_goes_big() {
        let mut recent = vec![Big; 10];
        recent.extend([Small; 10]);
        let call = StatisticalStrategy.analyze(&AnalysisContext::from_history(recent));
        assert_eq!(call.category, Big);
    }
}
