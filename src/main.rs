use clap::{Parser, Subcommand};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// The main entry point for the SojaMetrics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Etl(args) => handle_etl(args),
        Commands::Serve => handle_serve(&cli.config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Interactive analytics for the Brazilian soybean market: supply, demand,
/// exchange rate and prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reshape the per-indicator source extracts into the two normalized tables.
    Etl(EtlArgs),
    /// Load the normalized tables and serve the dashboard API.
    Serve,
}

#[derive(Parser)]
struct EtlArgs {
    /// Directory holding the per-indicator source extracts.
    #[arg(long, default_value = "extracao")]
    input_dir: PathBuf,

    /// Directory the normalized tables are written to.
    #[arg(long, default_value = "database")]
    output_dir: PathBuf,
}

// ==============================================================================
// ETL Command Logic
// ==============================================================================

/// Runs the reshape with a per-source progress bar and prints a summary of
/// the written tables.
fn handle_etl(args: EtlArgs) -> anyhow::Result<()> {
    let progress = ProgressBar::new(etl::SOURCE_FILES.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = etl::run_with_progress(&args.input_dir, &args.output_dir, |source| {
        progress.set_message(source.to_string());
        progress.inc(1);
    })?;

    progress.finish_with_message("Reshape complete!");

    let mut table = Table::new();
    table.set_header(vec!["Table", "Rows", "Path"]);
    table.add_row(vec![
        "soja_mensal".to_string(),
        summary.monthly_rows.to_string(),
        summary.monthly_path.display().to_string(),
    ]);
    table.add_row(vec![
        "soja_anual".to_string(),
        summary.annual_rows.to_string(),
        summary.annual_path.display().to_string(),
    ]);
    println!("{table}");

    Ok(())
}

// ==============================================================================
// Serve Command Logic
// ==============================================================================

/// Loads the configuration and the three flat tables, then hands the
/// read-only context to the web server.
async fn handle_serve(config_path: &Path) -> anyhow::Result<()> {
    let settings = configuration::load_config(config_path)?;

    let ctx = dataset::DataLoader::load(
        &settings.data.monthly,
        &settings.data.annual,
        &settings.data.fx,
        settings.dashboard.year_min,
        settings.dashboard.year_max,
    )?;

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    web_server::run_server(addr, ctx, settings).await
}
