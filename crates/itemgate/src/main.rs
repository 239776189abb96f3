mod config;
mod dispatcher;
mod lambda;
mod server;
mod storage;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use itemgate_core::storage::ItemStore;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{config::Config, dispatcher::Dispatcher, server::create_app};

/// Itemgate - CRUD gateway over a single key-value table
#[derive(Parser, Debug)]
#[command(name = "itemgate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Item store backend
    #[arg(long, global = true, value_enum, default_value_t = StoreKind::Dynamodb, env = "ITEMGATE_STORE")]
    store: StoreKind,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve API Gateway proxy events from the Lambda runtime (default)
    Lambda,
    /// Serve plain HTTP locally
    Serve {
        /// Host address to bind the server to
        #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
        host: String,

        /// Port to listen on
        #[arg(long, short, default_value = "3000", env = "PORT")]
        port: u16,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Dynamodb,
    Memory,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Lambda);

    init_tracing(matches!(command, Command::Lambda));

    let config = Config::from_env();
    let store = build_store(cli.store, &config).await?;
    let dispatcher = Arc::new(Dispatcher::new(store, &config));

    tracing::info!(
        table = %config.table_name,
        store = ?cli.store,
        base_path = %config.base_path,
        "Dispatcher ready"
    );

    match command {
        Command::Lambda => lambda::run(dispatcher)
            .await
            .map_err(|e| anyhow!("Lambda runtime failed: {e}")),
        Command::Serve { host, port } => serve(dispatcher, &host, port).await,
    }
}

/// Lambda logs go to CloudWatch as JSON; local runs get the human-readable format.
fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "itemgate=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .without_time(),
            )
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Builds the item store shared by every request.
async fn build_store(kind: StoreKind, config: &Config) -> Result<Arc<dyn ItemStore>> {
    match kind {
        StoreKind::Memory => Ok(Arc::new(
            storage::InMemoryRepository::new(&config.key_attribute)
                .with_page_size(config.scan_page_size),
        )),
        #[cfg(feature = "dynamodb")]
        StoreKind::Dynamodb => Ok(Arc::new(
            storage::DynamoDbRepository::from_env(&config.table_name, &config.key_attribute)
                .await,
        )),
        #[cfg(not(feature = "dynamodb"))]
        StoreKind::Dynamodb => anyhow::bail!(
            "itemgate was built without the `dynamodb` feature; use --store memory"
        ),
    }
}

async fn serve(dispatcher: Arc<Dispatcher>, host: &str, port: u16) -> Result<()> {
    let app = create_app(dispatcher);

    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
