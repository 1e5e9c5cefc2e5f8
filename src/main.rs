use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use sheetfolio::{config::Config, pipeline};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Render project cards from a published spreadsheet.
#[derive(Parser, Debug)]
#[command(author, version)]
struct Args {
    /// YAML config file (falls back to $SHEETFOLIO_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read this CSV file instead of fetching the sheet
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the page here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Emit only the loading and projects containers
    #[arg(long)]
    fragment: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sheetfolio=info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(csv) = args.csv {
        config.source.file = Some(csv);
    }
    if let Some(out) = args.out {
        config.output.path = Some(out);
    }
    config.output.fragment |= args.fragment;

    // ─── 3) one load cycle ───────────────────────────────────────────
    let client = Client::new();
    let page = pipeline::load_page(&client, &config).await;
    if page.is_failed() {
        warn!("load failed; writing error page");
    }

    // ─── 4) write output ─────────────────────────────────────────────
    let html = pipeline::compose_output(&page, &config.output)?;
    match &config.output.path {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = html.len(), "wrote page");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
