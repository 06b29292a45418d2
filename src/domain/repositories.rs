//! Repository traits for durable outcome and prediction records.
//!
//! Inserts are idempotent on `period`: replaying a page that was already
//! scraped is a no-op, not a conflict. The SQLite implementations live in
//! `infrastructure::persistence`.

use crate::domain::types::{Category, GameVariant, Outcome, Prediction};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait OutcomeRepository: Send + Sync {
    /// Insert the outcome unless its period is already stored.
    /// Returns `true` when a new row was written.
    async fn insert_if_absent(&self, outcome: &Outcome) -> Result<bool>;

    /// The most recent outcomes for a variant, newest first.
    async fn recent(&self, variant: GameVariant, limit: usize) -> Result<Vec<Outcome>>;

    async fn count(&self, variant: GameVariant) -> Result<usize>;
}

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Insert the prediction unless its period was already predicted.
    /// Returns `true` when a new row was written.
    async fn insert_if_absent(&self, prediction: &Prediction) -> Result<bool>;

    /// Record the realized category for a period's prediction and mark it
    /// correct or not. A period that was never predicted, or was already
    /// reconciled, is left untouched.
    async fn reconcile(&self, period: &str, realized: Category) -> Result<()>;
}
