use thiserror::Error;

/// Errors raised while driving the browser session.
///
/// Everything touching the live page is assumed flaky: a missing element or
/// an unsolved challenge is handled in place with a fallback and only logged.
/// The sole fatal condition for a run is `SessionUnreachable` - the controller
/// could not bring the session to `Ready` at all.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("No candidate selector matched for {target} ({candidates} tried)")]
    ElementNotFound { target: String, candidates: usize },

    #[error("Verification challenge unsolved: {reason}")]
    ChallengeUnsolved { reason: String },

    #[error("Session unreachable: {reason}")]
    SessionUnreachable { reason: String },
}

impl AutomationError {
    /// Whether the run must abort. Element misses and unsolved challenges are
    /// skipped by the controller; only an unreachable session ends the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AutomationError::SessionUnreachable { .. })
    }
}
