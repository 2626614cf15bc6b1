use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use bot_host::bot::TelegramBotFactory;
use bot_host::config::load_config;
use bot_host::database::ConnectivityProbe;
use bot_host::lifecycle::{host, signals, Checkpoints, FAILURE_EXIT_CODE};
use bot_host::observability::{logging, metrics};
use bot_host::{HttpServer, Lifecycle, RunOutcome, Shutdown};

#[derive(Parser)]
#[command(name = "bot-host")]
#[command(about = "Runs the bot session and its status endpoint", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "BOT_HOST_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(FAILURE_EXIT_CODE);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "bot-host starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let mut lifecycle = Lifecycle::new(
        Box::new(ConnectivityProbe::new(config.database.uri.clone())),
        Box::new(TelegramBotFactory::new(config.bot.clone())),
        Checkpoints::stdout(),
    )
    .with_stop_timeout(config.lifecycle.stop_timeout_secs.map(Duration::from_secs));

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_listener(&shutdown);

    let server = HttpServer::new(&config.server);
    let outcome = host::run(
        &mut lifecycle,
        server,
        &config.server.bind_address,
        server_shutdown,
    )
    .await;

    match &outcome {
        RunOutcome::Stopped(_) => tracing::info!("Shutdown complete"),
        RunOutcome::StartupFailed { failure, .. } => {
            tracing::error!(
                step = failure.step.map_or("none", |step| step.name()),
                "Exiting after failed startup"
            )
        }
        RunOutcome::ServerFailed { error, .. } => {
            tracing::error!(error = %error, "Exiting after server failure")
        }
    }

    std::process::exit(outcome.exit_code());
}
