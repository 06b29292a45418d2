//! Port interfaces between the cycle loop and the outside world.
//!
//! The scheduler only ever sees these traits; the browser session and the
//! Telegram client implement them in the infrastructure layer, and the tests
//! substitute mocks.

use anyhow::Result;
use async_trait::async_trait;

/// Source of the rendered game page's visible text.
#[async_trait]
pub trait GamePageService: Send + Sync {
    /// Full visible text of the current page, one rendered line per `\n`.
    async fn visible_text(&self) -> Result<String>;
}

/// Outbound message channel. Failure is a return value, never an error:
/// callers treat an undelivered message as non-fatal and log it.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Returns `true` when the message was accepted by the channel,
    /// `false` when delivery is disabled or failed.
    async fn send(&self, message: &str) -> Result<bool>;
}
