//! CLI entry point for flux

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flux::{BuildOutcome, Flux};

#[derive(Parser)]
#[command(name = "flux")]
#[command(version)]
#[command(about = "A blog engine in flux.", long_about = None)]
struct Cli {
    /// Site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create new content
    #[command(subcommand)]
    Create(CreateCommands),

    /// Build the site in the working directory
    Build {
        /// Rebuild even if nothing changed
        #[arg(short, long)]
        force: bool,

        /// Keep running and rebuild when files change
        #[arg(short, long)]
        watch: bool,
    },

    /// Serve the site in the working directory
    Serve {
        /// Port to listen on (defaults to the `port` setting)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum CreateCommands {
    /// Create a new site directory
    Site {
        /// The name of the new site
        name: String,
    },

    /// Create a new post in the working site directory
    Post {
        /// The title of the new post
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug { "flux=debug,info" } else { "flux=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Could not read the working directory")?,
    };

    match cli.command {
        Commands::Create(CreateCommands::Site { name }) => {
            let site_dir = flux::commands::init::create_site(&base_dir, &name)?;
            println!("Created a site tree at {:?}.", site_dir);
        }

        Commands::Create(CreateCommands::Post { title }) => {
            let path = flux::commands::new::create_post(&base_dir, &title)?;
            println!("Created post titled '{}' at {:?}.", title, path);
        }

        Commands::Build { force, watch } => {
            let site = open_site(base_dir)?;
            match flux::commands::build::run(&site, force)? {
                BuildOutcome::UpToDate => println!("Site build already up to date."),
                BuildOutcome::Built { .. } => println!("Site built successfully."),
            }

            if watch {
                flux::commands::build::watch(&site).await?;
            }
        }

        Commands::Serve { port } => {
            let site = open_site(base_dir)?;
            flux::commands::build::run(&site, false)?;

            let port = port.unwrap_or_else(|| site.config.port());
            flux::server::start(&site, port).await?;
        }
    }

    Ok(())
}

fn open_site(base_dir: PathBuf) -> Result<Flux> {
    let base_dir = base_dir
        .canonicalize()
        .with_context(|| format!("Could not open {:?}", base_dir))?;
    Ok(Flux::open(base_dir)?)
}
