//! Statistical features over recent outcome history.
//!
//! Every function takes a newest-first slice of categories (the order the
//! outcome repository returns) and is pure: the scheduler recomputes the
//! vector from scratch each cycle.

use crate::domain::types::Category;

const TREND_WINDOW: usize = 5;
const PATTERN_WINDOW: usize = 10;

/// Derived per-cycle signals. Transient - never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub big_count_5: u32,
    pub small_count_5: u32,
    pub big_count_10: u32,
    pub small_count_10: u32,
    pub current_streak: u32,
    pub volatility: f64,
    pub pattern_score: f64,
    pub trend_strength: f64,
}

impl FeatureVector {
    pub fn from_history(recent: &[Category]) -> Self {
        let (big_count_5, small_count_5) = window_counts(recent, TREND_WINDOW);
        let (big_count_10, small_count_10) = window_counts(recent, PATTERN_WINDOW);
        Self {
            big_count_5,
            small_count_5,
            big_count_10,
            small_count_10,
            current_streak: current_streak(recent),
            volatility: volatility(&recent[..recent.len().min(PATTERN_WINDOW)]),
            pattern_score: pattern_score(recent),
            trend_strength: trend_strength(recent),
        }
    }
}

fn window_counts(recent: &[Category], window: usize) -> (u32, u32) {
    let slice = &recent[..recent.len().min(window)];
    let big = slice.iter().filter(|c| **c == Category::Big).count() as u32;
    (big, slice.len() as u32 - big)
}

/// Length of the run of identical categories ending at the most recent
/// observation (the head of a newest-first slice).
pub fn current_streak(recent: &[Category]) -> u32 {
    match recent.first() {
        Some(head) => recent.iter().take_while(|c| *c == head).count() as u32,
        None => 0,
    }
}

/// Fraction of adjacent pairs that differ; 0 with fewer than 2 samples.
pub fn volatility(window: &[Category]) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let changes = window.windows(2).filter(|pair| pair[0] != pair[1]).count();
    changes as f64 / (window.len() - 1) as f64
}

/// Alternation/streak blend over the last 10 results, capped at 1.0.
/// Neutral 0.5 with fewer than 10 samples.
pub fn pattern_score(recent: &[Category]) -> f64 {
    if recent.len() < PATTERN_WINDOW {
        return 0.5;
    }
    let window = &recent[..PATTERN_WINDOW];
    let alternations = window.windows(2).filter(|pair| pair[0] != pair[1]).count();
    let mut score = 0.3 * (alternations as f64 / (PATTERN_WINDOW - 1) as f64);
    if current_streak(window) >= 3 {
        score += 0.4;
    }
    score.min(1.0)
}

/// Big/Small imbalance over the last 5 results. Neutral 0.5 with fewer
/// than 5 samples.
pub fn trend_strength(recent: &[Category]) -> f64 {
    if recent.len() < TREND_WINDOW {
        return 0.5;
    }
    let (big, small) = window_counts(recent, TREND_WINDOW);
    (big as f64 - small as f64).abs() / TREND_WINDOW as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use Category::{Big, Small};

    #[test]
    fn test_streak_counts_trailing_run() {
        // Most recent observation first: history Big,Big,Big,Small,Big
        // (newest last) is [Big, Small, Big, Big, Big] newest first.
        assert_eq!(current_streak(&[Big, Small, Big, Big, Big]), 1);
        assert_eq!(current_streak(&[Small, Small, Small]), 3);
        assert_eq!(current_streak(&[]), 0);
    }

    #[test]
    fn test_volatility_extremes() {
        assert_eq!(volatility(&[Big, Small, Big, Small]), 1.0);
        assert_eq!(volatility(&[Big, Big, Big, Big]), 0.0);
        assert_eq!(volatility(&[Big]), 0.0);
    }

    #[test]
    fn test_pattern_score_needs_ten_samples() {
        assert_eq!(pattern_score(&[Big; 9]), 0.5);
        // Ten identical results: no alternations, streak >= 3.
        let score = pattern_score(&[Big; 10]);
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_score_full_alternation() {
        let window = [Big, Small, Big, Small, Big, Small, Big, Small, Big, Small];
        // 9/9 alternations, streak 1: score = 0.3.
        assert!((pattern_score(&window) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_trend_strength() {
        assert_eq!(trend_strength(&[Big, Big]), 0.5);
        assert!((trend_strength(&[Big, Big, Big, Big, Small]) - 0.6).abs() < 1e-9);
        assert!((trend_strength(&[Big, Small, Big, Small, Big]) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_feature_vector_counts() {
        let recent = [Big, Big, Small, Big, Small, Small, Small, Big, Big, Big, Small];
        let features = FeatureVector::from_history(&recent);
        assert_eq!(features.big_count_5, 3);
        assert_eq!(features.small_count_5, 2);
        assert_eq!(features.big_count_10, 6);
        assert_eq!(features.small_count_10, 4);
        assert_eq!(features.current_streak, 2);
    }
}
