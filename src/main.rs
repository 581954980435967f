use clap::Parser;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use repoexport::{Config, Storage, SyncPipeline};

#[derive(Parser, Debug)]
#[command(name = "repoexport")]
#[command(version = "0.1.0")]
#[command(about = "Export the GitHub repositories you own or belong to as CSV")]
struct Args {
    /// Address to serve the OAuth web flow on
    #[arg(short, long)]
    listen: Option<String>,

    /// SQLite database path
    #[arg(long)]
    database: Option<String>,

    /// Run one sync with the GITHUB_TOKEN environment variable and exit,
    /// instead of serving the web flow
    #[arg(long)]
    once: bool,

    /// CSV output path for --once
    #[arg(short, long, default_value = "repos.csv")]
    output: String,

    /// Page size for organization repository listing
    #[arg(long)]
    per_page: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("repoexport=info".parse()?)
                .add_directive("reqwest=warn".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(per_page) = args.per_page {
        config.per_page = per_page;
    }

    if args.once {
        run_once(config, &args.output).await?;
    } else {
        repoexport::web::serve(config).await?;
    }

    Ok(())
}

/// Headless sync: fetch with a pre-issued token, store, write the CSV.
async fn run_once(config: Config, output: &str) -> anyhow::Result<()> {
    let token = std::env::var("GITHUB_TOKEN")
        .map_err(|_| anyhow::anyhow!("GITHUB_TOKEN environment variable not set"))?;

    let storage = Arc::new(Mutex::new(Storage::new(&config.database_path)?));
    let pipeline = SyncPipeline::new(storage.clone(), Arc::new(config));

    let report = pipeline.run(&token).await?;
    tracing::info!(
        fetched = report.fetched,
        unique = report.unique_repos,
        owners = report.owners,
        "sync complete"
    );

    let rows = storage.lock().await.export_rows()?;
    repoexport::export::write_file(output, &rows)?;
    tracing::info!(rows = rows.len(), "wrote {}", output);

    Ok(())
}
