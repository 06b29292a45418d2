use super::{AnalysisContext, Call, PredictionStrategy};
use crate::domain::types::Category;

const TREND_LOOKBACK: usize = 20;

/// Trend Strategy
///
/// Follows the Big/Small ratio over the last 20 results: a clear skew
/// (ratio above 0.6 or below 0.4) is called at 0.75, anything in between is
/// a weak call at 0.65 toward whichever side the ratio favors.
#[derive(Debug, Clone, Default)]
pub struct TrendStrategy;

impl PredictionStrategy for TrendStrategy {
    fn analyze(&self, ctx: &AnalysisContext) -> Call {
        let window = &ctx.recent[..ctx.recent.len().min(TREND_LOOKBACK)];
        let ratio = if window.is_empty() {
            0.5
        } else {
            let big = window.iter().filter(|c| **c == Category::Big).count();
            big as f64 / window.len() as f64
        };

        let (category, confidence) = if ratio > 0.6 {
            (Category::Big, 0.75)
        } else if ratio < 0.4 {
            (Category::Small, 0.75)
        } else if ratio >= 0.5 {
            (Category::Big, 0.65)
        } else {
            (Category::Small, 0.65)
        };

        Call::new(
            category,
            confidence,
            format!("Big ratio {ratio:.2} over last {}", window.len()),
        )
    }

    fn name(&self) -> &'static str {
        "trend"
    }
}
