//! Inspection tool for Pion configurations.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use pion::config::{load_config, ConfigError, PionConfig};
use pion::{ControllerRegistry, DispatchError, Pion};

#[derive(Parser)]
#[command(name = "pion-cli")]
#[command(about = "Inspect routes and negotiation for a Pion application", long_about = None)]
struct Cli {
    /// Configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration
    Check,
    /// Print the route table in evaluation order
    Routes,
    /// Run the router for one request and print the match as JSON
    Match { method: String, path: String },
    /// Print the extension preferences derived from an Accept header,
    /// using the configured content types
    Negotiate { accept: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check => {
            let config = load(cli.config.as_ref())?;
            println!(
                "ok: {} routes, base_uri '{}', view_dir '{}'",
                config.routes.len(),
                config.app.base_uri,
                config.app.view_dir
            );
        }
        Commands::Routes => {
            let app = build(cli.config.as_ref())?;
            for route in app.routes().iter() {
                println!(
                    "{:<7} {}{}  →  {}",
                    route.method.as_str(),
                    app.base_uri(),
                    route.pattern.as_str(),
                    route.action.describe()
                );
            }
            if let Some(action) = app.routes().not_found() {
                println!("{:<7} (not found)  →  {}", "*", action.describe());
            }
        }
        Commands::Match { method, path } => {
            let app = build(cli.config.as_ref())?;
            match app.resolve(&method, &path) {
                Ok((route, args)) => {
                    let named: serde_json::Map<_, _> = args
                        .named()
                        .map(|(k, v)| (k.to_string(), json!(v)))
                        .collect();
                    let output = json!({
                        "method": route.method.as_str(),
                        "pattern": route.pattern.as_str(),
                        "action": route.action.describe(),
                        "args": named,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                Err(DispatchError::RouteNotFound { .. }) => println!("no match"),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Negotiate { accept } => {
            let table = load(cli.config.as_ref())?.content_type_table();
            let preferences = table.negotiate(Some(&accept));
            println!("{}", serde_json::to_string_pretty(&preferences)?);
        }
    }
    Ok(())
}

fn load(path: Option<&PathBuf>) -> Result<PionConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(PionConfig::default()),
    }
}

/// Routes only; controllers are not needed to inspect matching.
fn build(path: Option<&PathBuf>) -> Result<Pion, ConfigError> {
    let config = load(path)?;
    Ok(Pion::from_config(&config, ControllerRegistry::new()))
}
