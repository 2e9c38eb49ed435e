use aiprio::{
    api::BackendClient,
    config::Config,
    report::export::SystemClipboard,
    storage::{KeyValueStore, LocalStore, MemoryStore},
    tui,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "aiprio")]
#[command(version, about = "Terminal front-end for AiPrio request prioritization", long_about = None)]
struct Cli {
    /// Base URL of the prioritization backend
    #[arg(long, env = "AIPRIO_BACKEND_URL", value_name = "URL")]
    backend_url: Option<String>,

    /// Directory for the theme, chat history and logs
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Directory where downloaded PDF reports are written
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Keep theme and chat history in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log filter, e.g. "aiprio=debug"
    #[arg(long, default_value = "aiprio=info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_panic_hook();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.backend_url {
        config.backend.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(dir) = cli.export_dir {
        config.export.directory = dir;
    }

    // Logs go to a file so they never draw over the terminal UI
    std::fs::create_dir_all(config.storage.log_dir())?;
    let appender = tracing_appender::rolling::daily(config.storage.log_dir(), "aiprio.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.clone().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    info!("Configuration loaded: backend {}", config.backend.base_url);
    if config.backend.api_key.is_none() {
        info!("No API key configured; clear and email actions are disabled");
    }

    let backend = Arc::new(BackendClient::new(&config.backend)?);
    let store: Box<dyn KeyValueStore> = if cli.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(LocalStore::open(&config.storage.data_dir))
    };

    tui::run(config, backend, store, Box::new(SystemClipboard)).await
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::execute!(std::io::stderr(), crossterm::terminal::LeaveAlternateScreen);
        let _ = crossterm::terminal::disable_raw_mode();
        original_hook(panic_info);
    }));
}
