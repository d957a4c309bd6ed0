//! SPA development server
//!
//! Serves a compiled single-page application (JS bundle, styles and a WASM
//! binary) and falls back to the application shell for client-side routes.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                    DEV SERVER                         │
//!                        │                                                      │
//!     Client Request     │  ┌────────────┐   ┌──────────┐   ┌───────────────┐   │
//!     ───────────────────┼─▶│ host check │──▶│  http    │──▶│   routing     │   │
//!                        │  │ request id │   │ handler  │   │   resolver    │   │
//!                        │  └────────────┘   └──────────┘   └───────┬───────┘   │
//!                        │                                          │           │
//!                        │                          Serve(path) / Fallback(shell)
//!                        │                                          ▼           │
//!     Client Response    │                   ┌──────────┐   ┌───────────────┐   │
//!     ◀──────────────────┼───────────────────│ServeFile │◀──│ asset root    │   │
//!                        │                   └──────────┘   └───────────────┘   │
//!                        │                                                      │
//!                        │  config · observability · lifecycle · admin          │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use spa_devserver::config::loader::{load_config, prepare, ConfigError};
use spa_devserver::config::DevServerConfig;
use spa_devserver::lifecycle::startup;
use spa_devserver::observability::logging;
use spa_devserver::routing::Resolver;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "devserver.toml";

#[derive(Parser)]
#[command(name = "spa-devserver", version)]
#[command(
    about = "Development server for a single-page WebAssembly application",
    long_about = None
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Environment overrides to apply
    #[arg(short, long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the application (default)
    Serve,
    /// Validate the configuration and print the compiled rules
    Check,
    /// Classify paths without starting the server
    Resolve {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref(), cli.env.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Check => check(&config),
        Commands::Resolve { paths } => resolve(&config, &paths),
    }
}

fn load(path: Option<&Path>, environment: Option<&str>) -> Result<DevServerConfig, ConfigError> {
    match path {
        Some(path) => load_config(path, environment),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            load_config(Path::new(DEFAULT_CONFIG_FILE), environment)
        }
        None => prepare(DevServerConfig::default(), environment),
    }
}

async fn serve(config: DevServerConfig) -> ExitCode {
    if let Err(e) = logging::init(&config.observability.log_level) {
        eprintln!("error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        directory = %config.assets.directory.display(),
        preset = %config.rewrites.preset,
        "spa-devserver starting"
    );

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

fn check(config: &DevServerConfig) -> ExitCode {
    let resolver = match Resolver::from_config(config) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "configuration ok: {} rule(s), public path {}, fallback {}",
        resolver.rules().len(),
        resolver.base_path().as_public_path(),
        resolver.fallback()
    );
    for (index, rule) in resolver.rules().iter().enumerate() {
        println!(
            "  #{:<2} {:<16} {:<6} {:<7} {} -> {}",
            index,
            rule.name(),
            rule.matcher().kind(),
            rule.action().kind(),
            rule.matcher().source(),
            rule.action().target().unwrap_or("(unchanged)")
        );
    }
    ExitCode::SUCCESS
}

fn resolve(config: &DevServerConfig, paths: &[String]) -> ExitCode {
    let resolver = match Resolver::from_config(config) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for path in paths {
        let decision = resolver.classify(path);
        println!(
            "{}\t{}\t{}\t{}",
            path,
            decision.resolution.outcome(),
            decision.resolution.target(),
            decision.rule.unwrap_or("-")
        );
    }
    ExitCode::SUCCESS
}
