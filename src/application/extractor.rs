//! Result extraction from rendered page text.
//!
//! The results table renders as interleaved lines of period ids, draw digits
//! and category labels, surrounded by arbitrary UI chrome. A 3-line sliding
//! window re-synchronizes on noise: an accepted triple advances by 3, a
//! rejected one by 1.

use crate::domain::types::{Category, GameVariant, Outcome, PERIOD_LEN};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Strip the separators the page injects into period ids.
fn normalize_digits(line: &str) -> String {
    line.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

fn is_period(candidate: &str) -> bool {
    candidate.len() == PERIOD_LEN && candidate.chars().all(|c| c.is_ascii_digit())
}

fn parse_draw(candidate: &str) -> Option<u8> {
    if candidate.len() == 1 && candidate.chars().all(|c| c.is_ascii_digit()) {
        candidate.parse().ok()
    } else {
        None
    }
}

/// Parse every `(period, draw, category)` triple visible in `text`.
///
/// One pass over the same text is duplicate-free: a period seen twice (the
/// page repeats rows while animating) is emitted once.
pub fn extract_outcomes(
    text: &str,
    variant: GameVariant,
    observed_at: DateTime<Utc>,
) -> Vec<Outcome> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut outcomes = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut i = 0;
    while i + 2 < lines.len() {
        let period = normalize_digits(lines[i]);
        let draw = normalize_digits(lines[i + 1]);
        let label = lines[i + 2];

        let accepted = is_period(&period)
            && parse_draw(&draw).is_some()
            && (label == "Big" || label == "Small");

        if accepted {
            let draw_value = parse_draw(&draw).unwrap_or(0);
            let category = if label == "Big" {
                Category::Big
            } else {
                Category::Small
            };
            if seen.insert(period.clone()) {
                outcomes.push(Outcome::new(
                    period,
                    draw_value,
                    category,
                    variant,
                    observed_at,
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    outcomes
}

/// First period id visible on the page: the round currently running.
pub fn leading_period(text: &str) -> Option<String> {
    text.lines()
        .map(|l| normalize_digits(l.trim()))
        .find(|candidate| is_period(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Color;

    const SAMPLE_PAGE: &str = "\
WinGo 1M
Period
Number
Big Small
20240101000000123
7
Big
20240101000000122
0
Small
How to play
20240101000000121
4
Big
";

    #[test]
    fn test_extracts_all_triples() {
        let outcomes = extract_outcomes(SAMPLE_PAGE, GameVariant::OneMinute, Utc::now());
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].period, "20240101000000123");
        assert_eq!(outcomes[0].draw_value, 7);
        assert_eq!(outcomes[0].category, Category::Big);
        assert_eq!(outcomes[0].color, Color::Red);
        assert_eq!(outcomes[1].draw_value, 0);
        assert_eq!(outcomes[1].color, Color::Green);
        assert_eq!(outcomes[2].color, Color::Violet);
    }

    #[test]
    fn test_resynchronizes_on_noise() {
        // A draw digit with no category label after it must not eat the
        // following valid triple.
        let text = "20240101000000124\n9\nLottery\n20240101000000123\n2\nSmall\n";
        let outcomes = extract_outcomes(text, GameVariant::OneMinute, Utc::now());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].period, "20240101000000123");
    }

    #[test]
    fn test_period_separators_stripped() {
        let text = "2024 0101-000000123\n5\nBig\n\n\n";
        let outcomes = extract_outcomes(text, GameVariant::OneMinute, Utc::now());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].period, "20240101000000123");
    }

    #[test]
    fn test_rejects_bad_candidates() {
        // Wrong period length, multi-digit draw, unknown label.
        let text = "1234\n5\nBig\n20240101000000123\n55\nBig\n20240101000000123\n5\nbig\n";
        assert!(extract_outcomes(text, GameVariant::OneMinute, Utc::now()).is_empty());
    }

    #[test]
    fn test_idempotent_and_duplicate_free() {
        let doubled = format!("{SAMPLE_PAGE}{SAMPLE_PAGE}");
        let once = extract_outcomes(SAMPLE_PAGE, GameVariant::OneMinute, Utc::now());
        let twice = extract_outcomes(&doubled, GameVariant::OneMinute, Utc::now());
        let periods_once: Vec<_> = once.iter().map(|o| o.period.clone()).collect();
        let periods_twice: Vec<_> = twice.iter().map(|o| o.period.clone()).collect();
        assert_eq!(periods_once, periods_twice);
    }

    #[test]
    fn test_leading_period() {
        assert_eq!(
            leading_period(SAMPLE_PAGE).as_deref(),
            Some("20240101000000123")
        );
        assert_eq!(leading_period("no digits here\n"), None);
    }
}
