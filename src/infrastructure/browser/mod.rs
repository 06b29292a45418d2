pub mod controller;
pub mod locator;
pub mod session;

pub use controller::{SessionController, SessionState, SiteConfig};
pub use locator::ElementLocator;
pub use session::{BrowserConfig, BrowserSession};
