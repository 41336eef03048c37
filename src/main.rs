//! # llmstxt CLI Application
//!
//! This module implements the command-line interface for llmstxt.
//!
//! ## Subcommands
//!
//! - `generate`: Map, scrape and summarize a site, then write
//!   `<domain>-llms.txt` and `<domain>-llms-full.txt`
//! - `serve`: Run the streaming HTTP transport
//!
//! Credentials come from the environment: `OPENAI_API_KEY` for summaries and
//! `FIRECRAWL_API_KEY` (or `--firecrawl-api-key`) for the CLI's Firecrawl calls.
//! Server clients pass their own Firecrawl key with each request.

mod telemetry;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use llmstxt::firecrawl::DEFAULT_BASE_URL;
use llmstxt::generator::{
    DEFAULT_MAX_URLS, GenerationResult, GenerationStatus, Generator, GeneratorConfig,
    ProgressEvent,
};
use llmstxt::model::{Client, DEFAULT_MODEL, DEFAULT_REQUESTS_PER_MINUTE};
use llmstxt::server::{AppState, run_server};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Generate llms.txt files for websites", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Completion model used for page summaries
    #[arg(long, global = true, env = "LLMSTXT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Firecrawl API host
    #[arg(long, global = true, env = "FIRECRAWL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    firecrawl_base_url: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate llms.txt and llms-full.txt for a website
    Generate(GenerateArgs),

    /// Serve generation over HTTP with streamed progress
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Website URL
    #[arg(required = true)]
    url: String,

    /// Maximum number of URLs to process
    #[arg(short, long, default_value_t = DEFAULT_MAX_URLS)]
    max_urls: u32,

    /// Directory the files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Firecrawl API key
    #[arg(long, env = "FIRECRAWL_API_KEY", hide_env_values = true)]
    firecrawl_api_key: Option<String>,

    /// Only write llms.txt
    #[arg(long)]
    no_full_text: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// Skip assets, directory listings and near-empty pages
    #[arg(long)]
    filter_pages: bool,

    /// Normalize page markdown in llms-full.txt
    #[arg(long)]
    clean_markdown: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LLMSTXT_HTTP_ADDR", default_value = "127.0.0.1:8000")]
    addr: SocketAddr,

    /// Completion requests allowed per minute across all runs
    #[arg(long, env = "LLMSTXT_REQUESTS_PER_MINUTE", default_value_t = DEFAULT_REQUESTS_PER_MINUTE)]
    requests_per_minute: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Some(Commands::Generate(args)) if args.verbose);
    let _otel = telemetry::init_tracing_subscriber(verbose)?;

    match cli.command {
        Some(Commands::Generate(args)) => {
            generate_command(args, cli.global).await?;
        }
        Some(Commands::Serve(args)) => {
            serve_command(args, cli.global).await?;
        }
        None => {
            let _ = Cli::parse_from(["llmstxt", "--help"]);
        }
    }

    Ok(())
}

#[instrument(skip(args, global), fields(url = %args.url))]
async fn generate_command(args: GenerateArgs, global: GlobalArgs) -> anyhow::Result<()> {
    let firecrawl_api_key = args
        .firecrawl_api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "Firecrawl API key not provided. Use --firecrawl-api-key or set FIRECRAWL_API_KEY."
            )
        })?;
    let domain = site_domain(&args.url)?;

    let client = Client::new_openai_from_env(&global.model, DEFAULT_REQUESTS_PER_MINUTE)?;
    let config = GeneratorConfig::builder()
        .max_urls(args.max_urls)
        .include_full_text(!args.no_full_text)
        .filter_non_content(args.filter_pages)
        .clean_markdown(args.clean_markdown)
        .firecrawl_base_url(global.firecrawl_base_url)
        .build();
    let generator = Generator::new(&firecrawl_api_key, client.completion().clone(), config)?;

    println!("Generating llms.txt for {}...", args.url);

    // Create a channel for progress updates
    let (progress_sender, mut progress_receiver) = mpsc::unbounded_channel::<ProgressEvent>();

    let progress_bar = ProgressBar::new(u64::from(args.max_urls));
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Mapping website...");

    let start_time = std::time::Instant::now();

    // Spawn a task to process progress updates
    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(event) = progress_receiver.recv().await {
                if event.total_urls > 0 {
                    progress_bar.set_length(event.total_urls as u64);
                }
                progress_bar.set_position(event.processed_urls as u64);
                match event.status {
                    GenerationStatus::Scraping => {
                        let url = event.current_url.unwrap_or_default();
                        if event.errors.is_empty() {
                            progress_bar.set_message(format!("Processed {url}"));
                        } else {
                            progress_bar.println(format!("Failed to scrape {url}"));
                        }
                    }
                    GenerationStatus::Generating => {
                        progress_bar.set_message("Generating files...");
                    }
                    _ => {}
                }
            }
            progress_bar.finish_and_clear();
        }
    });

    let result = generator.generate(&args.url, Some(&progress_sender)).await;

    // The progress task ends once every sender is dropped
    drop(progress_sender);
    wait_for_progress(progress_handle).await;

    let result = result.context("Generation failed")?;
    let written = write_outputs(&args.output_dir, &domain, &result, !args.no_full_text).await?;

    println!(
        "Success! Processed {} out of {} URLs",
        result.num_urls_processed, result.num_urls_total
    );
    println!("Completed in {:.2?}", start_time.elapsed());
    for path in written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

#[instrument(skip(global))]
async fn serve_command(args: ServeArgs, global: GlobalArgs) -> anyhow::Result<()> {
    let client = Client::new_openai_from_env(&global.model, args.requests_per_minute)?;
    let config = GeneratorConfig::builder()
        .firecrawl_base_url(global.firecrawl_base_url)
        .build();

    println!("Serving on http://{}", args.addr);
    run_server(args.addr, AppState::new(client.completion().clone(), config)).await?;

    Ok(())
}

/// Wait for the progress bar task; its failure is logged, never fatal
async fn wait_for_progress(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Progress display task failed: {}", e);
            false
        }
    }
}

/// Host of `url` without a leading `www.`, used to name output files
fn site_domain(url: &str) -> anyhow::Result<String> {
    let parsed = url::Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("URL has no host: {}", url))?;
    Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Paths of the index and full documents for `domain`
fn output_paths(output_dir: &Path, domain: &str) -> (PathBuf, PathBuf) {
    (
        output_dir.join(format!("{domain}-llms.txt")),
        output_dir.join(format!("{domain}-llms-full.txt")),
    )
}

async fn write_outputs(
    output_dir: &Path,
    domain: &str,
    result: &GenerationResult,
    include_full_text: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let (index_path, full_path) = output_paths(output_dir, domain);
    tokio::fs::write(&index_path, &result.llms_txt).await?;
    let mut written = vec![index_path];

    if include_full_text {
        tokio::fs::write(&full_path, &result.llms_full_txt).await?;
        written.push(full_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> GenerationResult {
        GenerationResult {
            llms_txt: "# https://example.com llms.txt\n\n".to_string(),
            llms_full_txt: "# https://example.com llms-full.txt\n\n".to_string(),
            num_urls_processed: 0,
            num_urls_total: 0,
        }
    }

    #[test]
    fn test_site_domain_strips_www() {
        assert_eq!(site_domain("https://www.example.com/docs").unwrap(), "example.com");
        assert_eq!(site_domain("http://docs.example.com").unwrap(), "docs.example.com");
        assert!(site_domain("example.com").is_err());
    }

    #[tokio::test]
    async fn test_wait_for_progress_reports_panicked_task() {
        let finished = tokio::spawn(async {});
        assert!(wait_for_progress(finished).await);

        let panicked = tokio::spawn(async { panic!("progress bar failed") });
        assert!(!wait_for_progress(panicked).await);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["llmstxt", "generate", "https://example.com"]);
        let Some(Commands::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.max_urls, DEFAULT_MAX_URLS);
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert!(!args.no_full_text);
    }

    #[tokio::test]
    async fn test_write_outputs_names_files_by_domain() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let written = write_outputs(&out, "example.com", &result(), true)
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        let index = std::fs::read_to_string(out.join("example.com-llms.txt")).unwrap();
        assert_eq!(index, "# https://example.com llms.txt\n\n");
        assert!(out.join("example.com-llms-full.txt").exists());
    }

    #[tokio::test]
    async fn test_write_outputs_skips_full_text() {
        let dir = tempfile::tempdir().unwrap();

        let written = write_outputs(dir.path(), "example.com", &result(), false)
            .await
            .unwrap();

        assert_eq!(written, vec![dir.path().join("example.com-llms.txt")]);
        assert!(!dir.path().join("example.com-llms-full.txt").exists());
    }
}
