//! Ordered-fallback element resolution.
//!
//! The target page's markup drifts, so nothing is looked up by a single
//! selector. Each UI target carries a prioritized candidate list; the first
//! candidate that resolves wins and the absence of all of them is an
//! `Option`, never an error - callers decide whether the element was
//! essential.

use thirtyfour::prelude::*;
use tracing::debug;

pub struct ElementLocator<'a> {
    driver: &'a WebDriver,
}

impl<'a> ElementLocator<'a> {
    pub fn new(driver: &'a WebDriver) -> Self {
        Self { driver }
    }

    /// First candidate selector that resolves to an element.
    pub async fn first_present(&self, target: &str, candidates: &[&str]) -> Option<WebElement> {
        for selector in candidates {
            match self.driver.find(By::Css(*selector)).await {
                Ok(element) => {
                    debug!("Located {} via '{}'", target, selector);
                    return Some(element);
                }
                Err(_) => continue,
            }
        }
        debug!(
            "No candidate matched for {} ({} tried)",
            target,
            candidates.len()
        );
        None
    }

    /// First candidate selector that resolves to a *displayed* element.
    pub async fn first_visible(&self, target: &str, candidates: &[&str]) -> Option<WebElement> {
        for selector in candidates {
            let Ok(elements) = self.driver.find_all(By::Css(*selector)).await else {
                continue;
            };
            for element in elements {
                if element.is_displayed().await.unwrap_or(false) {
                    debug!("Located visible {} via '{}'", target, selector);
                    return Some(element);
                }
            }
        }
        None
    }

    /// First displayed `<button>` whose text matches `predicate`.
    pub async fn first_visible_button_matching<F>(&self, predicate: F) -> Option<WebElement>
    where
        F: Fn(&str) -> bool,
    {
        let Ok(buttons) = self.driver.find_all(By::Tag("button")).await else {
            return None;
        };
        for button in buttons {
            if !button.is_displayed().await.unwrap_or(false) {
                continue;
            }
            let Ok(text) = button.text().await else {
                continue;
            };
            if predicate(text.trim()) {
                return Some(button);
            }
        }
        None
    }

    /// First displayed element matching either a candidate selector or a
    /// button-label predicate. Selector candidates are tried first.
    pub async fn first_visible_or_labeled<F>(
        &self,
        target: &str,
        candidates: &[&str],
        predicate: F,
    ) -> Option<WebElement>
    where
        F: Fn(&str) -> bool,
    {
        if let Some(element) = self.first_visible(target, candidates).await {
            return Some(element);
        }
        self.first_visible_button_matching(predicate).await
    }
}
