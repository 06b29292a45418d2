//! WinGo watcher binary.
//!
//! Establishes one browser session, then runs the sequential
//! scrape -> persist -> predict -> notify loop. Exit code is zero for a
//! graceful run (handled per-cycle errors included); only failure to
//! establish a session at all is fatal.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::prelude::*;

use wingo_oracle::application::scheduler::CycleScheduler;
use wingo_oracle::application::strategies::{FusionEngine, FusionPolicy};
use wingo_oracle::config::Config;
use wingo_oracle::domain::ports::NotificationService;
use wingo_oracle::infrastructure::browser::{BrowserSession, SessionController};
use wingo_oracle::infrastructure::{
    Database, SqliteOutcomeRepository, SqlitePredictionRepository, TelegramNotificationService,
};

#[derive(Debug, Parser)]
#[command(name = "wingo-oracle", version)]
#[command(about = "Watch the WinGo results page and post Big/Small predictions")]
struct Args {
    /// Number of cycles to run (0 = until terminated); overrides CYCLES
    #[arg(long)]
    cycles: Option<u32>,

    /// Fusion policy: argmax or weighted; overrides FUSION_POLICY
    #[arg(long)]
    policy: Option<FusionPolicyArg>,

    /// Run the browser with a visible window
    #[arg(long)]
    windowed: bool,

    /// SQLite database URL; overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FusionPolicyArg {
    Argmax,
    Weighted,
}

impl From<FusionPolicyArg> for FusionPolicy {
    fn from(value: FusionPolicyArg) -> Self {
        match value {
            FusionPolicyArg::Argmax => FusionPolicy::ArgMax,
            FusionPolicyArg::Weighted => FusionPolicy::Weighted,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("wingo-oracle {} starting...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(cycles) = args.cycles {
        config.scheduler.max_cycles = (cycles > 0).then_some(cycles);
    }
    if let Some(policy) = args.policy {
        config.fusion_policy = policy.into();
    }
    if args.windowed {
        config.browser.headless = false;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!(
        "Watching {} (variant {}, policy {:?}, cycles {:?})",
        config.site.game_url,
        config.site.variant,
        config.fusion_policy,
        config.scheduler.max_cycles,
    );

    let database = Database::new(&config.database_url).await?;
    let outcomes = Arc::new(SqliteOutcomeRepository::new(database.clone()));
    let predictions = Arc::new(SqlitePredictionRepository::new(database.clone()));
    let notifier: Arc<dyn NotificationService> =
        Arc::new(TelegramNotificationService::new(config.telegram.clone()));

    let session = BrowserSession::connect(&config.browser).await?;

    let mut controller = SessionController::new(&session, config.site.clone());
    if let Err(e) = controller.establish().await {
        error!("Could not establish a game session: {}", e);
        let _ = notifier
            .send("❌ <b>Session Failed</b>\n🔐 Check credentials and site availability")
            .await;
        session.close().await;
        anyhow::bail!("session unreachable");
    }

    let _ = notifier
        .send(&format!(
            "🔮 <b>WinGo Oracle Started</b>\n🎯 Monitoring WinGo {}\n🤖 Predictions active",
            config.site.variant
        ))
        .await;

    let session = Arc::new(session);
    let engine = FusionEngine::new(config.fusion_policy);
    let mut scheduler = CycleScheduler::new(
        session.clone(),
        outcomes,
        predictions,
        notifier.clone(),
        engine,
        config.scheduler.clone(),
    );
    scheduler.run().await;

    let _ = notifier
        .send("✅ <b>WinGo Oracle Completed</b>\n📊 Run finished cleanly")
        .await;

    // The scheduler holds the last clone of the session handle; it must be
    // gone before exclusive ownership can be reclaimed for teardown.
    drop(scheduler);
    match Arc::try_unwrap(session) {
        Ok(session) => session.close().await,
        Err(_) => error!("Browser session still shared at shutdown"),
    }

    info!("Shutdown complete.");
    Ok(())
}
