//! odelia-server: HTTP API for Project Odelia.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use odelia_engine::{Clock, SystemClock};
use odelia_server::{create_router, notify, AppState, Config, ResponseStore, SqliteResponseStore};

#[derive(Parser)]
#[command(name = "odelia-server")]
#[command(about = "Records valentine responses and forwards notifications")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "odelia-server.toml")]
    config: PathBuf,

    /// Listen address (overrides config file)
    #[arg(long, env = "ODELIA_BIND")]
    bind: Option<String>,

    /// SQLite database path (overrides config file)
    #[arg(long, env = "ODELIA_DATABASE")]
    database: Option<PathBuf>,

    /// Do not record responses
    #[arg(long)]
    no_database: bool,

    /// Mail webhook URL
    #[arg(long, env = "ODELIA_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Notification recipient
    #[arg(long, env = "ODELIA_NOTIFY_TO")]
    notify_to: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("odelia_server=info".parse()?)
                .add_directive("odelia_engine=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    if cli.no_database {
        config.database.enabled = false;
    }
    if cli.webhook_url.is_some() {
        config.notify.webhook_url = cli.webhook_url;
    }
    if cli.notify_to.is_some() {
        config.notify.to = cli.notify_to;
    }

    let store: Option<Arc<dyn ResponseStore>> = if config.database.enabled {
        match SqliteResponseStore::open(&config.database.path) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "Could not open response store, responses will not be recorded");
                None
            }
        }
    } else {
        info!("Response recording disabled");
        None
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState {
        store,
        notifier: notify::from_config(&config.notify, clock.clone()),
        clock,
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Listening on {}", config.server.bind);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
