//! The outer acquire -> extract -> predict -> notify loop.
//!
//! Strictly sequential: one cycle at a time over a single browser session.
//! A failing cycle is logged and followed by the shorter backoff sleep; only
//! session establishment (done before this loop starts) can abort a run.

use crate::application::extractor::{extract_outcomes, leading_period};
use crate::application::strategies::{AnalysisContext, FusionEngine};
use crate::domain::ports::{GamePageService, NotificationService};
use crate::domain::repositories::{OutcomeRepository, PredictionRepository};
use crate::domain::types::{GameVariant, Prediction};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub variant: GameVariant,
    /// `None` runs until the process is terminated.
    pub max_cycles: Option<u32>,
    pub cycle_interval: Duration,
    pub error_backoff: Duration,
    /// How much history feeds the feature window each cycle.
    pub history_limit: usize,
}

/// What one cycle did; returned for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub extracted: usize,
    pub newly_stored: usize,
    /// Period a notification went out for, when the leading period changed.
    pub notified_period: Option<String>,
}

pub struct CycleScheduler {
    page: Arc<dyn GamePageService>,
    outcomes: Arc<dyn OutcomeRepository>,
    predictions: Arc<dyn PredictionRepository>,
    notifier: Arc<dyn NotificationService>,
    engine: FusionEngine,
    config: SchedulerConfig,
    last_notified_period: Option<String>,
}

impl CycleScheduler {
    pub fn new(
        page: Arc<dyn GamePageService>,
        outcomes: Arc<dyn OutcomeRepository>,
        predictions: Arc<dyn PredictionRepository>,
        notifier: Arc<dyn NotificationService>,
        engine: FusionEngine,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            page,
            outcomes,
            predictions,
            notifier,
            engine,
            config,
            last_notified_period: None,
        }
    }

    pub async fn run(&mut self) {
        let mut cycle: u32 = 0;
        loop {
            cycle += 1;
            if let Some(max) = self.config.max_cycles {
                if cycle > max {
                    info!("Completed {} cycles, stopping.", max);
                    return;
                }
                info!("Cycle {}/{}", cycle, max);
            } else {
                info!("Cycle {}", cycle);
            }

            match self.run_cycle().await {
                Ok(report) => {
                    info!(
                        "Cycle done: {} extracted, {} new, notified: {:?}",
                        report.extracted, report.newly_stored, report.notified_period
                    );
                    tokio::time::sleep(self.config.cycle_interval).await;
                }
                Err(e) => {
                    error!("Cycle failed: {:#}", e);
                    tokio::time::sleep(self.config.error_backoff).await;
                }
            }
        }
    }

    /// One full pass: scrape, persist, reconcile, predict, notify.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let text = self
            .page
            .visible_text()
            .await
            .context("Failed to read page text")?;

        let scraped = extract_outcomes(&text, self.config.variant, Utc::now());
        let extracted = scraped.len();

        let mut newly_stored = 0;
        for outcome in &scraped {
            if self
                .outcomes
                .insert_if_absent(outcome)
                .await
                .context("Failed to store outcome")?
            {
                newly_stored += 1;
                // A freshly realized outcome settles any standing prediction
                // for that period.
                if let Err(e) = self
                    .predictions
                    .reconcile(&outcome.period, outcome.category)
                    .await
                {
                    warn!("Reconcile failed for {}: {:#}", outcome.period, e);
                }
            }
        }
        debug!("Stored {}/{} scraped outcomes", newly_stored, extracted);

        let history = self
            .outcomes
            .recent(self.config.variant, self.config.history_limit)
            .await
            .context("Failed to load history")?;
        let categories = history.iter().map(|o| o.category).collect();
        let ctx = AnalysisContext::from_history(categories);
        let fused = self.engine.predict(&ctx);
        debug!(
            "Fused {} ({:.2}) weights {}",
            fused.category,
            fused.confidence,
            serde_json::to_string(&fused.weights).unwrap_or_default()
        );

        let notified_period = match leading_period(&text) {
            Some(period) if self.last_notified_period.as_deref() != Some(period.as_str()) => {
                let prediction = Prediction {
                    period: period.clone(),
                    category: fused.category,
                    confidence: fused.confidence,
                    strategy_label: fused.strategy_label.clone(),
                    weights: fused.weights.clone(),
                    reasoning: fused.reasoning.clone(),
                    predicted_at: Utc::now(),
                };

                if let Err(e) = self.predictions.insert_if_absent(&prediction).await {
                    warn!("Failed to store prediction for {}: {:#}", period, e);
                }

                let message = format_prediction_message(&prediction);
                match self.notifier.send(&message).await {
                    Ok(true) => debug!("Notification sent for period {}", period),
                    Ok(false) => warn!("Notification not delivered for period {}", period),
                    Err(e) => warn!("Notification error for period {}: {:#}", period, e),
                }

                self.last_notified_period = Some(period.clone());
                Some(period)
            }
            Some(period) => {
                debug!("Period {} already notified, skipping", period);
                None
            }
            None => {
                debug!("No running period visible on page");
                None
            }
        };

        Ok(CycleReport {
            extracted,
            newly_stored,
            notified_period,
        })
    }
}

/// Rich-text card sent to the channel for each new period.
pub fn format_prediction_message(prediction: &Prediction) -> String {
    let emoji = match prediction.category {
        crate::domain::types::Category::Big => "🔴",
        crate::domain::types::Category::Small => "🔵",
    };
    let confidence_marker = if prediction.confidence > 0.7 {
        "🟢"
    } else if prediction.confidence > 0.6 {
        "🟡"
    } else {
        "🟠"
    };

    format!(
        "{emoji} <b>WINGO PREDICTION</b> {emoji}\n\
         \n\
         🎯 <b>Prediction:</b> <code>{}</code>\n\
         📊 <b>Confidence:</b> <code>{:.1}%</code> {confidence_marker}\n\
         🎮 <b>Period:</b> <code>{}</code>\n\
         🤖 <b>Strategy:</b> <code>{}</code>\n\
         \n\
         💡 <b>Analysis:</b>\n\
         {}\n\
         \n\
         ⏰ <i>Generated: {}</i>",
        prediction.category,
        prediction.confidence * 100.0,
        prediction.period,
        prediction.strategy_label,
        prediction.reasoning,
        prediction.predicted_at.format("%H:%M:%S"),
    )
}
