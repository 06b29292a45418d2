//! Exclusive ownership of the WebDriver session.
//!
//! One `BrowserSession` exists per run; every exit path goes through
//! `close()` so the underlying browser process is released even after a
//! fatal controller error.

use crate::domain::ports::GamePageService;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub implicit_wait_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            implicit_wait_secs: 3,
        }
    }
}

pub struct BrowserSession {
    driver: WebDriver,
}

impl BrowserSession {
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.add_arg("--headless=new")?;
        }
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--window-size=1920,1080")?;
        caps.add_arg("--ignore-certificate-errors")?;

        let driver = WebDriver::new(&config.webdriver_url, caps)
            .await
            .context("Failed to start WebDriver session")?;
        driver
            .set_implicit_wait_timeout(Duration::from_secs(config.implicit_wait_secs))
            .await
            .context("Failed to set implicit wait")?;

        info!("Browser session started via {}", config.webdriver_url);
        Ok(Self { driver })
    }

    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    /// Full visible text of the current page.
    pub async fn body_text(&self) -> Result<String> {
        let body = self
            .driver
            .find(By::Tag("body"))
            .await
            .context("Page has no body element")?;
        body.text().await.context("Failed to read body text")
    }

    /// Quit the driver, releasing the browser process. Errors are logged,
    /// not propagated - there is nothing useful a caller can do with them.
    pub async fn close(self) {
        if let Err(e) = self.driver.quit().await {
            warn!("Browser session did not quit cleanly: {}", e);
        } else {
            info!("Browser session closed");
        }
    }
}

#[async_trait]
impl GamePageService for BrowserSession {
    async fn visible_text(&self) -> Result<String> {
        self.body_text().await
    }
}
