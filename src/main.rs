//! Sitemapper: incremental sitemap generation for a content discovery service

use anyhow::Result;
use clap::{Parser, Subcommand};
use sitemapper::config::Config;
use sitemapper::pipeline;
use sitemapper::sitemap::{Category, OutputLayout};
use sitemapper::watermark::Watermarks;
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sitemapper")]
#[command(about = "Incremental sitemap generator for a content discovery service")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one discovery-and-append pass
    Run {
        /// Maximum ID probes per category this run
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show watermarks and on-disk sitemap file counts
    Status,

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run { count, output } => {
            let mut config = load_config(&cli.config)?;
            if let Some(output) = output {
                config.sitemap.output_dir = output;
            }
            run(config, count).await
        }
        Commands::Status => {
            let config = load_config(&cli.config)?;
            show_status(config)
        }
        Commands::Init { path } => init_config(path),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        info!("no config file at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

async fn run(config: Config, count: Option<u64>) -> Result<()> {
    // Best-effort cron semantics: log and exit cleanly rather than leaving
    // a non-zero status for a state the next run recovers from anyway.
    match pipeline::run_once(&config, count).await {
        Ok(summary) => {
            info!(
                "done: {} new entries ({} tracks, {} collections, {} users)",
                summary.total(),
                summary.tracks_added,
                summary.collections_added,
                summary.users_added
            );
        }
        Err(e) => {
            error!("run failed, sitemap output may be corrupted: {e:#}");
        }
    }
    Ok(())
}

fn show_status(config: Config) -> Result<()> {
    let layout = OutputLayout::new(&config.sitemap.output_dir);
    let watermarks = Watermarks::load(&layout.watermark_file());

    println!("Sitemap status ({})", config.sitemap.output_dir.display());
    println!("===============");
    for category in Category::ALL {
        let files = count_numbered_files(&layout.category_root(category));
        println!(
            "{:<12} watermark {:>10}   {} sitemap file(s)",
            category,
            watermarks.get(category),
            files
        );
    }
    println!(
        "root index:  {}",
        if layout.root_index().exists() { "present" } else { "missing" }
    );
    Ok(())
}

/// Count `N.xml` files in a category directory.
fn count_numbered_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(".xml"))
                .is_some_and(|stem| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()))
        })
        .count()
}

fn init_config(path: PathBuf) -> Result<()> {
    let config_path = path.join("config.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(&path)?;
    let config = Config::default();
    std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;

    info!("wrote default configuration to {}", config_path.display());
    Ok(())
}
