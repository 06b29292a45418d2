use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed length of a WinGo period identifier as rendered on the page.
pub const PERIOD_LEN: usize = 17;

/// Binary classification of a draw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Big,
    Small,
}

impl Category {
    pub fn opposite(self) -> Self {
        match self {
            Category::Big => Category::Small,
            Category::Small => Category::Big,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Big => "Big",
            Category::Small => "Small",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Big" => Ok(Category::Big),
            "Small" => Ok(Category::Small),
            _ => anyhow::bail!("Invalid category: {}. Must be 'Big' or 'Small'", s),
        }
    }
}

/// Result color shown next to each draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Green,
    Red,
    Violet,
}

impl Color {
    /// The single derivation point for colors. Zero is green, odd draws are
    /// red, the remaining (nonzero even) draws are violet.
    pub fn from_draw(draw_value: u8) -> Self {
        if draw_value == 0 {
            Color::Green
        } else if draw_value % 2 == 1 {
            Color::Red
        } else {
            Color::Violet
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Violet => "violet",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(Color::Green),
            "red" => Ok(Color::Red),
            "violet" => Ok(Color::Violet),
            _ => anyhow::bail!("Invalid color: {}", s),
        }
    }
}

/// Which WinGo round length we are watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameVariant {
    #[default]
    OneMinute,
    ThirtySeconds,
}

impl GameVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            GameVariant::OneMinute => "1M",
            GameVariant::ThirtySeconds => "30S",
        }
    }

    /// Tab label rendered in the game-variant switcher.
    pub fn tab_label(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1M" => Ok(GameVariant::OneMinute),
            "30S" => Ok(GameVariant::ThirtySeconds),
            _ => anyhow::bail!("Invalid GAME_VARIANT: {}. Must be '1M' or '30S'", s),
        }
    }
}

/// One realized round scraped from the results table. Immutable once built;
/// uniqueness on `period` is enforced at the persistence boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub period: String,
    pub draw_value: u8,
    pub category: Category,
    pub color: Color,
    pub variant: GameVariant,
    pub observed_at: DateTime<Utc>,
}

impl Outcome {
    pub fn new(
        period: String,
        draw_value: u8,
        category: Category,
        variant: GameVariant,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            period,
            draw_value,
            category,
            color: Color::from_draw(draw_value),
            variant,
            observed_at,
        }
    }
}

/// A confidence-scored call for the next undecided period. Immutable once
/// emitted; later reconciled against the realized outcome for accuracy
/// tracking.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub period: String,
    pub category: Category,
    /// Always in `[0.5, 1.0]` - 0.5 means a coin flip.
    pub confidence: f64,
    pub strategy_label: String,
    /// Sub-model name -> blend weight, summing to 1.
    pub weights: Vec<(String, f64)>,
    pub reasoning: String,
    pub predicted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_derivation_all_draws() {
        assert_eq!(Color::from_draw(0), Color::Green);
        for v in [1u8, 3, 5, 7, 9] {
            assert_eq!(Color::from_draw(v), Color::Red, "draw {v}");
        }
        for v in [2u8, 4, 6, 8] {
            assert_eq!(Color::from_draw(v), Color::Violet, "draw {v}");
        }
    }

    #[test]
    fn test_category_round_trip() {
        assert_eq!("Big".parse::<Category>().unwrap(), Category::Big);
        assert_eq!("Small".parse::<Category>().unwrap(), Category::Small);
        assert_eq!(Category::Big.to_string(), "Big");
        assert!("big".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_opposite() {
        assert_eq!(Category::Big.opposite(), Category::Small);
        assert_eq!(Category::Small.opposite(), Category::Big);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("1m".parse::<GameVariant>().unwrap(), GameVariant::OneMinute);
        assert_eq!(
            "30S".parse::<GameVariant>().unwrap(),
            GameVariant::ThirtySeconds
        );
        assert!("5M".parse::<GameVariant>().is_err());
    }

    #[test]
    fn test_outcome_derives_color() {
        let o = Outcome::new(
            "20240101000000001".to_string(),
            4,
            Category::Small,
            GameVariant::OneMinute,
            Utc::now(),
        );
        assert_eq!(o.color, Color::Violet);
    }
}
