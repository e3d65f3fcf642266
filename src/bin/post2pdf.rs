//! CLI binary for blogify-pdf.
//!
//! A thin shim over the library crate that loads a post record from JSON,
//! maps CLI flags to `ExportConfig`, and writes the exported document to a
//! file or stdout.

use anyhow::{Context, Result};
use blogify_pdf::{
    attachment_filename, export_stream, export_to_file, DocumentRequest, ExportConfig, ExportError,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

/// Export a stored blog post as a paginated PDF document.
#[derive(Parser, Debug)]
#[command(name = "post2pdf", version, about)]
struct Cli {
    /// Path to the post record (JSON with title, body, coverImageRef, …)
    post: PathBuf,

    /// Output file. Defaults to the sanitized post title; `-` writes the
    /// document to stdout as it is produced.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Root directory for local cover-image references.
    #[arg(long, default_value = "./public", env = "BLOGIFY_ASSET_ROOT")]
    asset_root: PathBuf,

    /// Timeout for remote cover-image downloads, in seconds.
    #[arg(long, default_value_t = 10)]
    download_timeout: u64,

    /// Product name shown in the per-page stamp.
    #[arg(long, default_value = "Blogify")]
    product: String,

    /// Attribution shown in the per-page stamp.
    #[arg(long, default_value = "The Blogify Team")]
    attribution: String,

    /// Verbose logging (also honours RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blogify_pdf=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blogify_pdf=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let request = load_post(&cli.post)?;
    let config = ExportConfig::builder()
        .asset_root(&cli.asset_root)
        .download_timeout_secs(cli.download_timeout)
        .product_name(&cli.product)
        .attribution(&cli.attribution)
        .build()
        .context("invalid export configuration")?;

    match cli.output.as_deref() {
        Some(path) if path.as_os_str() == "-" => stream_to_stdout(&request, &config).await,
        other => {
            let path = other
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(attachment_filename(&request.title)));
            write_to_file(&request, &path, &config).await
        }
    }
}

/// Load and parse the post record, mapping a missing file to the library's
/// not-found error so exit messages match what a server would report.
fn load_post(path: &PathBuf) -> Result<DocumentRequest> {
    let raw = std::fs::read_to_string(path).map_err(|_| ExportError::PostNotFound {
        id: path.display().to_string(),
    })?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse post record '{}'", path.display()))
}

async fn write_to_file(
    request: &DocumentRequest,
    path: &PathBuf,
    config: &ExportConfig,
) -> Result<()> {
    let bar = spinner(&format!("Exporting \"{}\"…", request.title));
    let stats = export_to_file(request, path, config)
        .await
        .context("export failed")?;
    bar.finish_and_clear();

    println!(
        "{} {}  {}",
        green("✓"),
        bold(&path.display().to_string()),
        dim(&format!(
            "{} pages, {} bytes{}",
            stats.pages,
            stats.bytes_written,
            if stats.has_cover_image {
                ", cover image"
            } else {
                ""
            }
        )),
    );
    Ok(())
}

async fn stream_to_stdout(request: &DocumentRequest, config: &ExportConfig) -> Result<()> {
    let mut stream = export_stream(request, config)
        .await
        .context("export failed")?;
    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = stream.next().await {
        stdout
            .write_all(&chunk)
            .await
            .context("could not write to stdout")?;
    }
    stdout.flush().await.context("could not flush stdout")?;
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
