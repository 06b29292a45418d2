pub mod browser;
pub mod persistence;
pub mod telegram;

pub use persistence::{Database, SqliteOutcomeRepository, SqlitePredictionRepository};
pub use telegram::{TelegramConfig, TelegramNotificationService};
