mod commands;

use clap::{Parser, Subcommand};
use jobfill_engine::config::{ConfigLoader, JobfillConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jobfill", version, about = "Fill job application forms from an extraction backend")]
struct Args {
    /// Config file (default: ./jobfill.yaml, then ~/.jobfill/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override backend.base_url
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether a page is on a known recruiting platform
    Check {
        url: String,
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
    },
    /// Open a page, extract its fields and fill them in
    Fill {
        url: String,
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
        /// Leave the browser open until Ctrl-C
        #[arg(long, requires = "visible")]
        keep_open: bool,
    },
    /// Open a visible browser with the fill button; fill on every click
    Watch {
        /// Start page
        url: Option<String>,
    },
    /// Apply a saved extraction result to a saved page, without a browser
    Apply {
        /// Page markup
        #[arg(long)]
        html: PathBuf,
        /// Backend response (`{"fields": [...]}`)
        #[arg(long)]
        fields: PathBuf,
        /// URL the markup was captured from, used for relative data-urls
        #[arg(long, default_value = "http://localhost/")]
        url: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

async fn load_config(args: &Args) -> anyhow::Result<JobfillConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    if let Some(url) = &args.backend_url {
        config.backend.base_url = url.clone();
        ConfigLoader::validate(&config)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries reports.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobfill=info,jobfill_engine=info,jobfill_h=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args).await?;

    match args.command {
        Command::Check { url, visible } => commands::check(config, &url, visible).await,
        Command::Fill {
            url,
            visible,
            json,
            keep_open,
        } => commands::fill(config, &url, visible, json, keep_open).await,
        Command::Watch { url } => commands::watch(config, url.as_deref()).await,
        Command::Apply {
            html,
            fields,
            url,
            json,
        } => commands::apply(config, &html, &fields, &url, json).await,
    }
}
