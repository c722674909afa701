//! CLI entry point for jekyll-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jekyll-rs")]
#[command(version)]
#[command(about = "A fast builder for Jekyll-style blogs", long_about = None)]
struct Cli {
    /// Site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    source: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the destination directory
    #[command(alias = "b")]
    Build {
        /// Rebuild when source files change
        #[arg(short, long)]
        watch: bool,
    },

    /// Remove the destination directory
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Show the posts related to a post
    Related {
        /// Title of the post
        title: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "jekyll_rs=debug,info"
    } else {
        "jekyll_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.source {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build { watch } => {
            let site = jekyll_rs::Jekyll::new(&base_dir)?;
            tracing::info!("Building site from {:?}", site.source_dir);
            site.build()?;
            println!("Built successfully!");

            if watch {
                jekyll_rs::commands::build::watch(&site).await?;
            }
        }

        Commands::Clean => {
            let site = jekyll_rs::Jekyll::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = jekyll_rs::Jekyll::new(&base_dir)?;
            jekyll_rs::commands::list::run(&site, &r#type)?;
        }

        Commands::Related { title } => {
            let site = jekyll_rs::Jekyll::new(&base_dir)?;
            jekyll_rs::commands::related::run(&site, &title)?;
        }

        Commands::Version => {
            println!("jekyll-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
