use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use alert_analyzer::{
    analyzer::AlertAnalyzer,
    config::Config,
    metrics,
    server::Server,
    sinks::{create_notifier, NotificationQueue},
    Error, Result,
};

#[derive(Debug, Parser)]
#[command(name = "alert-analyzer", version, about = "Multi-agent alert investigation service")]
struct Cli {
    /// Log level filter, overridden by RUST_LOG
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Listen address, defaults to SERVER_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// Investigate one alert description and print the JSON result
    Investigate {
        #[arg(long)]
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads LOG_LEVEL
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;

    info!(
        "Loaded configuration: provider={} model={} iteration_limit={} sink={:?}",
        config.llm.provider,
        config.llm.model,
        config.workflow.iteration_limit,
        config.notification.sink
    );

    metrics::register_metrics()?;
    let analyzer = AlertAnalyzer::from_config(&config);

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => {
            let notifier = create_notifier(&config.notification)
                .map_err(|e| Error::Notification(format!("{:#}", e)))?;
            let (queue, _worker) = NotificationQueue::start(notifier, config.notification.queue_size);

            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            info!("Starting server on {}", addr);
            Server::new(analyzer, queue).start(&addr).await?;
        }
        Command::Investigate { description } => {
            let response = analyzer.analyze(&description).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
