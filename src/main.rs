use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glowfic_archiver::config::Config;
use glowfic_archiver::glowfic::{fetch_to_dir, GlowficClient, Site};
use glowfic_archiver::render::{
    render_to_dir, PlainTypography, Renderer, SmartPunctuation, Typographer, TypographyOptions,
};
use glowfic_archiver::story::Story;

#[derive(Parser)]
#[command(name = "glowfic-archiver", version, about = "Archive Glowfic threads as HTML")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download threads and save each as <title>.json
    Fetch {
        #[arg(required = true, value_parser = clap::value_parser!(u64).range(1..))]
        post_ids: Vec<u64>,
    },
    /// Render saved <title>.json files into <title>.html
    Render {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Fetch threads and render them in one go
    Archive {
        #[arg(required = true, value_parser = clap::value_parser!(u64).range(1..))]
        post_ids: Vec<u64>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(site = %config.site_url, output_dir = %config.output_dir.display(), "Configuration loaded");

    match cli.command {
        Command::Fetch { post_ids } => {
            let client = build_client(&config)?;
            for post_id in post_ids {
                fetch_to_dir(&client, post_id, &config.output_dir, report_progress).await?;
                clear_progress();
            }
        }
        Command::Render { files } => {
            let renderer = build_renderer(&config);
            for file in files {
                let story = Story::load(&file)
                    .await
                    .with_context(|| format!("Failed to load {}", file.display()))?;
                render_to_dir(&renderer, &story, &config.output_dir).await?;
            }
        }
        Command::Archive { post_ids } => {
            let client = build_client(&config)?;
            let renderer = build_renderer(&config);
            for post_id in post_ids {
                let json_path =
                    fetch_to_dir(&client, post_id, &config.output_dir, report_progress).await?;
                clear_progress();
                let story = Story::load(&json_path)
                    .await
                    .with_context(|| format!("Failed to reload {}", json_path.display()))?;
                render_to_dir(&renderer, &story, &config.output_dir).await?;
            }
        }
    }

    Ok(())
}

fn build_client(config: &Config) -> Result<GlowficClient> {
    GlowficClient::new(Site::new(&config.site_url), config.request_timeout)
        .context("Failed to build HTTP client")
}

fn build_renderer(config: &Config) -> Renderer {
    let (typographer, options): (Box<dyn Typographer>, _) = if config.smart_quotes {
        (Box::new(SmartPunctuation), TypographyOptions::quotes())
    } else {
        (Box::new(PlainTypography), TypographyOptions::none())
    };
    Renderer::new(typographer, options, config.images_subdir.clone())
}

fn report_progress(percent: u32) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r{percent:3} % ");
    let _ = stderr.flush();
}

fn clear_progress() {
    let _ = write!(std::io::stderr(), "\r       \r");
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glowfic_archiver=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
