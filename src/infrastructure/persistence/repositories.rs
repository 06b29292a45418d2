use crate::domain::repositories::{OutcomeRepository, PredictionRepository};
use crate::domain::types::{Category, GameVariant, Outcome, Prediction};
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::str::FromStr;

pub struct SqliteOutcomeRepository {
    database: Database,
}

impl SqliteOutcomeRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl OutcomeRepository for SqliteOutcomeRepository {
    async fn insert_if_absent(&self, outcome: &Outcome) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO outcomes
                (period, draw_value, category, color, game_variant, observed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&outcome.period)
        .bind(i64::from(outcome.draw_value))
        .bind(outcome.category.as_str())
        .bind(outcome.color.as_str())
        .bind(outcome.variant.as_str())
        .bind(outcome.observed_at)
        .execute(&self.database.pool)
        .await
        .context("Failed to insert outcome")?;

        Ok(result.rows_affected() > 0)
    }

    async fn recent(&self, variant: GameVariant, limit: usize) -> Result<Vec<Outcome>> {
        let rows = sqlx::query_as::<_, (String, i64, String, DateTime<Utc>)>(
            r#"
            SELECT period, draw_value, category, observed_at
            FROM outcomes
            WHERE game_variant = $1
            ORDER BY period DESC
            LIMIT $2
            "#,
        )
        .bind(variant.as_str())
        .bind(limit as i64)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to load recent outcomes")?;

        rows.into_iter()
            .map(|(period, draw_value, category, observed_at)| {
                let category = Category::from_str(&category)
                    .with_context(|| format!("Corrupt category for period {period}"))?;
                Ok(Outcome::new(
                    period,
                    draw_value as u8,
                    category,
                    variant,
                    observed_at,
                ))
            })
            .collect()
    }

    async fn count(&self, variant: GameVariant) -> Result<usize> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM outcomes WHERE game_variant = $1")
                .bind(variant.as_str())
                .fetch_one(&self.database.pool)
                .await
                .context("Failed to count outcomes")?;
        Ok(count as usize)
    }
}

pub struct SqlitePredictionRepository {
    database: Database,
}

impl SqlitePredictionRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Lifetime accuracy over reconciled predictions: `(correct, total)`.
    pub async fn accuracy(&self) -> Result<(usize, usize)> {
        let (correct, total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(correct), 0),
                COUNT(*)
            FROM predictions
            WHERE realized_category IS NOT NULL
            "#,
        )
        .fetch_one(&self.database.pool)
        .await
        .context("Failed to compute accuracy")?;
        Ok((correct as usize, total as usize))
    }
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn insert_if_absent(&self, prediction: &Prediction) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO predictions
                (period, category, confidence, strategy_label, predicted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&prediction.period)
        .bind(prediction.category.as_str())
        .bind(prediction.confidence)
        .bind(&prediction.strategy_label)
        .bind(prediction.predicted_at)
        .execute(&self.database.pool)
        .await
        .context("Failed to insert prediction")?;

        Ok(result.rows_affected() > 0)
    }

    async fn reconcile(&self, period: &str, realized: Category) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE predictions
            SET realized_category = $1,
                correct = CASE WHEN category = $1 THEN 1 ELSE 0 END
            WHERE period = $2 AND realized_category IS NULL
            "#,
        )
        .bind(realized.as_str())
        .bind(period)
        .execute(&self.database.pool)
        .await
        .context("Failed to reconcile prediction")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Color;

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:")
            .await
            .expect("in-memory database")
    }

    fn outcome(period: &str, draw_value: u8) -> Outcome {
        let category = if draw_value >= 5 {
            Category::Big
        } else {
            Category::Small
        };
        Outcome::new(
            period.to_string(),
            draw_value,
            category,
            GameVariant::OneMinute,
            Utc::now(),
        )
    }

    fn prediction(period: &str, category: Category) -> Prediction {
        Prediction {
            period: period.to_string(),
            category,
            confidence: 0.7,
            strategy_label: "adaptive_argmax".to_string(),
            weights: vec![("trend".to_string(), 1.0)],
            reasoning: "test".to_string(),
            predicted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_outcome_insert_dedup() {
        let repo = SqliteOutcomeRepository::new(memory_db().await);
        let o = outcome("20240101000000100", 7);

        assert!(repo.insert_if_absent(&o).await.unwrap());
        assert!(!repo.insert_if_absent(&o).await.unwrap());
        assert_eq!(repo.count(GameVariant::OneMinute).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let repo = SqliteOutcomeRepository::new(memory_db().await);
        for (period, draw) in [
            ("20240101000000100", 1),
            ("20240101000000102", 8),
            ("20240101000000101", 3),
        ] {
            repo.insert_if_absent(&outcome(period, draw)).await.unwrap();
        }

        let recent = repo.recent(GameVariant::OneMinute, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].period, "20240101000000102");
        assert_eq!(recent[1].period, "20240101000000101");
        assert_eq!(recent[0].category, Category::Big);
        assert_eq!(recent[0].color, Color::Violet);
    }

    #[tokio::test]
    async fn test_recent_filters_by_variant() {
        let repo = SqliteOutcomeRepository::new(memory_db().await);
        repo.insert_if_absent(&outcome("20240101000000100", 2))
            .await
            .unwrap();
        let other = repo.recent(GameVariant::ThirtySeconds, 10).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_prediction_dedup_and_reconcile() {
        let repo = SqlitePredictionRepository::new(memory_db().await);
        let p = prediction("20240101000000200", Category::Big);

        assert!(repo.insert_if_absent(&p).await.unwrap());
        assert!(!repo.insert_if_absent(&p).await.unwrap());

        repo.reconcile("20240101000000200", Category::Big)
            .await
            .unwrap();
        assert_eq!(repo.accuracy().await.unwrap(), (1, 1));

        // Already reconciled: a contradicting late reconcile is a no-op.
        repo.reconcile("20240101000000200", Category::Small)
            .await
            .unwrap();
        assert_eq!(repo.accuracy().await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_reconcile_unknown_period_is_noop() {
        let repo = SqlitePredictionRepository::new(memory_db().await);
        repo.reconcile("20240101000000999", Category::Big)
            .await
            .unwrap();
        assert_eq!(repo.accuracy().await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn test_incorrect_prediction_counted() {
        let repo = SqlitePredictionRepository::new(memory_db().await);
        repo.insert_if_absent(&prediction("20240101000000201", Category::Small))
            .await
            .unwrap();
        repo.reconcile("20240101000000201", Category::Big)
            .await
            .unwrap();
        assert_eq!(repo.accuracy().await.unwrap(), (0, 1));
    }
}
