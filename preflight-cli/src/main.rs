//! Preflight CLI - Configure build targets from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use preflight_core::config::ProjectConfig;
use preflight_core::orchestrator::{ConfigureReport, Orchestrator};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "preflight")]
#[command(about = "Build configuration for embedded C/C++ projects", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the project configuration file
    #[arg(long, global = true, default_value = "preflight.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configuration phase for one target, or for every target
    Configure {
        /// Target to configure (defaults to all targets)
        #[arg(short, long)]
        target: Option<String>,

        /// Emit reports as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List the configured targets
    Targets,
    /// Version information
    Version,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Configure { target, json } => {
            let config = load_config(&cli.config)?;
            let orchestrator = Orchestrator::new(config, project_root(&cli.config));

            let reports = match target {
                Some(name) => vec![orchestrator.configure_target(&name)?],
                None => orchestrator.configure_all()?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_summary(report);
                }
            }
        }
        Commands::Targets => {
            let config = load_config(&cli.config)?;
            for (name, target) in &config.targets {
                println!(
                    "{} ({} source {})",
                    name,
                    target.src_dirs.len(),
                    if target.src_dirs.len() == 1 { "dir" } else { "dirs" }
                );
            }
        }
        Commands::Version => {
            println!("preflight {}", env!("CARGO_PKG_VERSION"));
            println!("preflight-core {}", preflight_core::VERSION);
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ProjectConfig> {
    ProjectConfig::from_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Relative source directories resolve against the configuration file's directory
fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn print_summary(report: &ConfigureReport) {
    println!("Target: {}", report.target);
    for (var, flags) in &report.flags {
        if !flags.is_empty() {
            println!("  {} = {}", var, flags);
        }
    }
    println!(
        "  {} sources, {} excluded ({}ms)",
        report.sources.len(),
        report.excluded.len(),
        report.duration_ms
    );
    for path in &report.excluded {
        println!("  excluded: {}", path.display());
    }
}
