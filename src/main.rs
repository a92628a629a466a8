//! CLI entry point for blogfeed

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blogfeed")]
#[command(version)]
#[command(about = "RSS feed, sitemap and post listing for a markdown blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
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
    /// Write feed.xml and sitemap.xml into the public directory
    #[command(alias = "g")]
    Build {
        /// Rebuild when content or config changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Serve the feed, sitemap and post API over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List published posts, newest first
    List {
        /// Page to show (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Posts per page (defaults to `per_page` in the config)
        #[arg(long)]
        per_page: Option<usize>,

        /// Collection to list
        #[arg(long, default_value = "content")]
        collection: String,
    },

    /// Delete generated files from the public directory
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogfeed=debug,info"
    } else {
        "blogfeed=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Build { watch } => {
            let site = blogfeed::Site::new(&base_dir)?;
            let report = blogfeed::commands::build::run(&site)?;
            println!("Built from {} posts.", report.posts);

            if watch {
                tokio::task::spawn_blocking(move || blogfeed::commands::build::watch(&site))
                    .await??;
            }
        }

        Commands::Serve { port, ip } => {
            let site = blogfeed::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blogfeed::server::start(&site, &ip, port).await?;
        }

        Commands::List {
            page,
            per_page,
            collection,
        } => {
            let site = blogfeed::Site::new(&base_dir)?;
            blogfeed::commands::list::run(&site, &collection, page, per_page)?;
        }

        Commands::Clean => {
            let site = blogfeed::Site::new(&base_dir)?;
            tracing::info!("Cleaning generated files...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("blogfeed version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
