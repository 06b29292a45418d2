//! The login-to-game state machine.
//!
//! Drives a fresh session through login, the drag-to-verify challenge, any
//! stack of confirmation screens, and navigation to the WinGo view. Every
//! element lookup goes through the ordered-fallback locator and a missing
//! non-essential element is skipped, not fatal: the only fatal outcome is
//! failing to reach `Ready` at all.

use crate::domain::errors::AutomationError;
use crate::domain::types::GameVariant;
use anyhow::Result;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

use super::locator::ElementLocator;
use super::session::BrowserSession;

/// Horizontal slack left at the end of the drag gesture. A tunable constant
/// carried over from the production flow, not derived from pixel analysis.
const DRAG_EDGE_OFFSET: f64 = 10.0;

/// Upper bound on confirmation screens dismissed after login.
const MAX_CONFIRMATION_SCREENS: usize = 6;

/// Bounded polling for the game-view indicators.
const INDICATOR_RETRIES: usize = 5;
const INDICATOR_POLL: Duration = Duration::from_secs(3);

const PAGE_SETTLE: Duration = Duration::from_secs(8);
const LOGIN_SETTLE: Duration = Duration::from_secs(5);
const CONFIRM_SETTLE: Duration = Duration::from_secs(2);
const CHALLENGE_SETTLE: Duration = Duration::from_secs(3);
const TAB_SETTLE: Duration = Duration::from_secs(5);

const USERNAME_SELECTORS: &[&str] = &[
    "input[type='text']",
    "input[name='username']",
    "input[placeholder*='phone']",
    "input[placeholder*='email']",
];

const PASSWORD_SELECTORS: &[&str] = &["input[type='password']", "input[name='password']"];

const SUBMIT_SELECTORS: &[&str] = &["button[type='submit']"];
const SUBMIT_LABELS: &[&str] = &["Login", "Sign In"];

const CHALLENGE_SELECTORS: &[&str] = &[
    ".verify-bar",
    ".slider",
    ".drag-handle",
    "[class*='verify']",
    "[class*='slider']",
];

const CONFIRMATION_SELECTORS: &[&str] = &[".confirm-btn", ".ok-button", ".btn-confirm"];
const CONFIRMATION_LABELS: &[&str] = &["Confirm", "OK", "Yes", "Agree", "Receive"];

const GAME_INDICATORS: &[&str] = &["Period", "Number", "Big", "Small", "WinGo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    ChallengePending,
    ConfirmationPending,
    Navigating,
    Ready,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::ChallengePending => "challenge-pending",
            SessionState::ConfirmationPending => "confirmation-pending",
            SessionState::Navigating => "navigating",
            SessionState::Ready => "ready",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub game_url: String,
    pub username: String,
    pub password: String,
    pub variant: GameVariant,
}

pub struct SessionController<'a> {
    session: &'a BrowserSession,
    site: SiteConfig,
    state: SessionState,
}

impl<'a> SessionController<'a> {
    pub fn new(session: &'a BrowserSession, site: SiteConfig) -> Self {
        Self {
            session,
            site,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        info!("Session state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Drive the session to `Ready`. On any unrecoverable error the state is
    /// left at `Failed` and `SessionUnreachable` is returned; the caller
    /// decides whether to abort or start a fresh session.
    pub async fn establish(&mut self) -> Result<(), AutomationError> {
        match self.try_establish().await {
            Ok(()) => {
                self.transition(SessionState::Ready);
                Ok(())
            }
            Err(e) => {
                self.transition(SessionState::Failed);
                Err(AutomationError::SessionUnreachable {
                    reason: format!("{e:#}"),
                })
            }
        }
    }

    async fn try_establish(&mut self) -> Result<()> {
        let driver = self.session.driver();

        driver.goto(&self.site.base_url).await?;
        tokio::time::sleep(PAGE_SETTLE).await;

        let url = driver.current_url().await?;
        let logged_in = looks_logged_in(url.as_str());
        if logged_in {
            info!("Already logged in, skipping to navigation");
        }
        for phase in pre_navigation_phases(logged_in) {
            self.transition(*phase);
            match phase {
                SessionState::Authenticating => self.submit_credentials().await?,
                SessionState::ChallengePending => {
                    self.solve_drag_challenge().await;
                }
                SessionState::ConfirmationPending => {
                    self.dismiss_confirmations().await;
                }
                _ => {}
            }
        }

        self.transition(SessionState::Navigating);
        self.open_game_view().await?;
        self.select_variant_tab().await;

        Ok(())
    }

    /// Best-effort form fill: each field lookup is independent and a missing
    /// field is logged, not fatal.
    async fn submit_credentials(&self) -> Result<()> {
        let locator = ElementLocator::new(self.session.driver());

        match locator
            .first_present("username field", USERNAME_SELECTORS)
            .await
        {
            Some(field) => {
                field.clear().await?;
                field.send_keys(&self.site.username).await?;
            }
            None => warn!("Username field not found, continuing"),
        }

        match locator
            .first_present("password field", PASSWORD_SELECTORS)
            .await
        {
            Some(field) => {
                field.clear().await?;
                field.send_keys(&self.site.password).await?;
            }
            None => warn!("Password field not found, continuing"),
        }

        match locator
            .first_visible_or_labeled("login button", SUBMIT_SELECTORS, |text| {
                SUBMIT_LABELS.iter().any(|label| text.contains(label))
            })
            .await
        {
            Some(button) => {
                button.click().await?;
                tokio::time::sleep(LOGIN_SETTLE).await;
            }
            None => warn!("Login button not found, continuing"),
        }

        Ok(())
    }

    /// Solve the drag-to-verify challenge if one is shown. Absence of the
    /// challenge, or a failed gesture, is not-applicable rather than fatal.
    async fn solve_drag_challenge(&self) -> bool {
        let locator = ElementLocator::new(self.session.driver());
        let Some(handle) = locator
            .first_present("challenge handle", CHALLENGE_SELECTORS)
            .await
        else {
            info!("No verification challenge shown");
            return false;
        };

        let result: Result<()> = async {
            let rect = handle.rect().await?;
            let distance = drag_distance(rect.width);
            self.session
                .driver()
                .action_chain()
                .click_and_hold_element(&handle)
                .move_by_offset(distance, 0)
                .release()
                .perform()
                .await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("Verification challenge solved");
                tokio::time::sleep(CHALLENGE_SETTLE).await;
                true
            }
            Err(e) => {
                warn!("Challenge gesture failed, continuing: {:#}", e);
                false
            }
        }
    }

    /// Click through stacked confirmation screens. Idempotent and
    /// monotonically terminating: each sweep either clicks one visible
    /// confirmation control or stops the loop.
    async fn dismiss_confirmations(&self) -> usize {
        let locator = ElementLocator::new(self.session.driver());
        let mut dismissed = 0;

        for _ in 0..MAX_CONFIRMATION_SCREENS {
            let Some(button) = locator
                .first_visible_or_labeled("confirmation button", CONFIRMATION_SELECTORS, |text| {
                    is_confirmation_label(text)
                })
                .await
            else {
                break;
            };

            match button.click().await {
                Ok(()) => {
                    dismissed += 1;
                    tokio::time::sleep(CONFIRM_SETTLE).await;
                }
                Err(e) => {
                    warn!("Confirmation click failed, stopping sweep: {}", e);
                    break;
                }
            }
        }

        info!("Dismissed {} confirmation screens", dismissed);
        dismissed
    }

    /// Load the game view and poll for its text indicators.
    async fn open_game_view(&self) -> Result<()> {
        let driver = self.session.driver();
        driver.goto(&self.site.game_url).await?;
        tokio::time::sleep(PAGE_SETTLE).await;

        for _ in 0..INDICATOR_RETRIES {
            let text = self.session.body_text().await.unwrap_or_default();
            if has_game_indicators(&text) {
                info!("Game view loaded");
                return Ok(());
            }
            tokio::time::sleep(INDICATOR_POLL).await;
        }

        anyhow::bail!("Game view indicators never appeared at {}", self.site.game_url)
    }

    /// Switch to the configured variant tab. Non-fatal: the flow proceeds
    /// on whatever variant is currently active.
    async fn select_variant_tab(&self) -> bool {
        let label = self.site.variant.tab_label();
        let selectors = variant_tab_selectors(self.site.variant);
        let candidates: Vec<&str> = selectors.iter().map(String::as_str).collect();

        let locator = ElementLocator::new(self.session.driver());
        let Some(tab) = locator
            .first_visible_or_labeled("variant tab", &candidates, |text| text.contains(label))
            .await
        else {
            warn!("Variant tab '{}' not found, staying on current game", label);
            return false;
        };

        match tab.click().await {
            Ok(()) => {
                info!("Switched to {} game", label);
                tokio::time::sleep(TAB_SETTLE).await;
                true
            }
            Err(e) => {
                warn!("Variant tab click failed, staying on current game: {}", e);
                false
            }
        }
    }
}

/// Phases between landing and navigation. An already-authenticated session
/// skips login, the challenge and the confirmation sweep entirely.
fn pre_navigation_phases(already_logged_in: bool) -> &'static [SessionState] {
    if already_logged_in {
        &[]
    } else {
        &[
            SessionState::Authenticating,
            SessionState::ChallengePending,
            SessionState::ConfirmationPending,
        ]
    }
}

/// The login page keeps "login" in its address; anything else is treated as
/// an authenticated session.
fn looks_logged_in(url: &str) -> bool {
    !url.to_lowercase().contains("login")
}

fn is_confirmation_label(text: &str) -> bool {
    CONFIRMATION_LABELS.iter().any(|label| text.contains(label))
}

fn has_game_indicators(text: &str) -> bool {
    GAME_INDICATORS.iter().any(|marker| text.contains(marker))
}

/// Gesture length for a challenge handle of the given rendered width.
fn drag_distance(width: f64) -> i64 {
    (width - DRAG_EDGE_OFFSET).max(0.0) as i64
}

fn variant_tab_selectors(variant: GameVariant) -> Vec<String> {
    let label = variant.tab_label();
    let mut selectors = vec![
        format!("a[href*='{label}']"),
        format!("[class*='{}']", label.to_lowercase()),
    ];
    if variant == GameVariant::OneMinute {
        selectors.push("[class*='one']".to_string());
    }
    selectors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_distance_leaves_edge_slack() {
        assert_eq!(drag_distance(300.0), 290);
        assert_eq!(drag_distance(10.0), 0);
        // Never negative, even for degenerate widths.
        assert_eq!(drag_distance(4.0), 0);
    }

    #[test]
    fn test_logged_in_url_inspection() {
        assert!(!looks_logged_in("https://55club.game/#/Login"));
        assert!(!looks_logged_in("https://55club.game/login?next=home"));
        assert!(looks_logged_in("https://55club.game/#/home"));
    }

    #[test]
    fn test_confirmation_labels() {
        for label in ["Confirm", "OK", "Yes", "Agree", "Receive"] {
            assert!(is_confirmation_label(label), "{label}");
        }
        assert!(is_confirmation_label("Confirm withdrawal"));
        assert!(!is_confirmation_label("Cancel"));
    }

    #[test]
    fn test_game_indicators() {
        assert!(has_game_indicators("Period Number Big Small"));
        assert!(has_game_indicators("WinGo 1M lobby"));
        assert!(!has_game_indicators("404 not found"));
    }

    #[test]
    fn test_variant_tab_selectors() {
        let selectors = variant_tab_selectors(GameVariant::OneMinute);
        assert!(selectors.iter().any(|s| s.contains("1M")));
        assert!(selectors.iter().any(|s| s.contains("1m")));
    }

    #[test]
    fn test_logged_in_session_skips_pre_navigation_phases() {
        assert!(pre_navigation_phases(true).is_empty());
        assert_eq!(
            pre_navigation_phases(false),
            &[
                SessionState::Authenticating,
                SessionState::ChallengePending,
                SessionState::ConfirmationPending,
            ]
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::ChallengePending.to_string(), "challenge-pending");
        assert_eq!(SessionState::Ready.to_string(), "ready");
    }
}
