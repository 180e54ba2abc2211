// peekblock — developer CLI
//
// Runs the mock ESP scan service and the WebSocket echo server used while
// building the mobile app, and probes scan endpoints.

mod config;
mod echo;
mod probe;
mod server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use peekblock_core::ScanFixture;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "peekblock")]
#[command(about = "PeekBlock — mock scan peripheral and dev tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mock scan service (GET /scan)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(short, long)]
        bind: Option<String>,
        /// JSON array of {"mac", "rssi"} objects to serve instead of the built-in list
        #[arg(short, long)]
        fixture: Option<String>,
    },
    /// Run the WebSocket echo server
    Echo {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Fetch and print scan results from an endpoint
    Probe {
        #[arg(short, long, default_value = probe::DEFAULT_URL)]
        url: String,
    },
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;
    let _log_guard = init_tracing(config.log_dir.as_deref());

    match cli.command {
        Commands::Serve {
            port,
            bind,
            fixture,
        } => cmd_serve(config, port, bind, fixture).await,
        Commands::Echo { port, bind } => cmd_echo(config, port, bind).await,
        Commands::Probe { url } => cmd_probe(url).await,
        Commands::Config { action } => cmd_config(config, action),
    }
}

fn init_tracing(log_dir: Option<&str>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "peekblock.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

async fn cmd_serve(
    config: config::Config,
    port: Option<u16>,
    bind: Option<String>,
    fixture: Option<String>,
) -> Result<()> {
    let env_port = std::env::var(config::SCAN_PORT_ENV).ok();
    let port = config::pick_port(port, env_port.as_deref(), config.scan_port)?;
    let addr = config.socket_addr(bind.as_deref(), port)?;

    let fixture = match fixture.or_else(|| config.fixture_path.clone()) {
        Some(path) => ScanFixture::from_json_file(&path)
            .with_context(|| format!("Failed to load fixture from {}", path))?,
        None => ScanFixture::default(),
    };

    tokio::select! {
        res = server::run(addr, fixture) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down scan server");
            Ok(())
        }
    }
}

async fn cmd_echo(config: config::Config, port: Option<u16>, bind: Option<String>) -> Result<()> {
    let addr = config.socket_addr(bind.as_deref(), port.unwrap_or(config.echo_port))?;

    tokio::select! {
        res = echo::run(addr) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down echo server");
            Ok(())
        }
    }
}

async fn cmd_probe(url: String) -> Result<()> {
    let entries = probe::fetch_scan(&url).await?;
    probe::print_entries(&url, &entries);
    Ok(())
}

fn cmd_config(mut config: config::Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} {} = {}", "✓".green(), key.bright_cyan(), value);
        }
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{}", value),
            None => println!("{}", "(not set)".dimmed()),
        },
        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            for (key, value) in config.list() {
                println!("  {:<14} {}", key.bright_cyan(), value);
            }
        }
        ConfigAction::Path => {
            println!("{}", config::Config::config_file()?.display());
        }
    }
    Ok(())
}
