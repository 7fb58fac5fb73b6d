#![forbid(unsafe_code)]
//! Tessera Command Line Interface

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tessera::commands::{
    execute_build, execute_init, execute_plan, BuildCommandOptions, InitOptions, PlanOptions,
};
use tessera::config::CONFIG_FILE;
use tessera::Config;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tessera - convention-driven bundle builder")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a tessera.json in the current folder
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Build units, skipping the ones whose output is current
    Build {
        /// Profiles to build (can specify multiple, default: all)
        #[arg(short, long)]
        profile: Vec<String>,

        /// Rebuild everything
        #[arg(long)]
        full: bool,
    },

    /// Show the build plan without building
    Plan {
        /// Profiles to show (can specify multiple, default: all)
        #[arg(short, long)]
        profile: Vec<String>,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("tessera=debug")
    } else if quiet {
        EnvFilter::new("tessera=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tessera=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();
}

/// Folder the config's `src`/`dest` are relative to
fn project_root(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init { force } = cli.command {
        return execute_init(InitOptions {
            config_path: cli.config,
            force,
        });
    }

    if !cli.config.exists() {
        anyhow::bail!(
            "No {} found. Run 'tessera init' to create one.",
            cli.config.display()
        );
    }
    let config = Config::load(&cli.config)?;
    let root = project_root(&cli.config);

    match cli.command {
        Commands::Init { .. } => Ok(()),

        Commands::Build { profile, full } => {
            let options = BuildCommandOptions {
                root,
                profiles: profile,
                full,
                quiet: cli.quiet,
            };
            execute_build(options, config).await
        }

        Commands::Plan { profile } => {
            let options = PlanOptions {
                root,
                profiles: profile,
            };
            execute_plan(options, config)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("✗").red(), e);
        std::process::exit(1);
    }
}
