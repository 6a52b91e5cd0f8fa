use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::{PgPool, PgPoolOptions};

mod api;
mod config;
mod course_ref;
mod db;
mod models;
mod render;
mod snapshot;
mod source;
mod stats;
mod view;

use config::Settings;
use models::Collection;
use source::DataService;
use view::{teardown_signal, DashboardView, LoadOutcome};

#[derive(Parser)]
#[command(name = "course-dashboard")]
#[command(about = "Summary dashboard for courses, instructors, participants and registrations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import one collection from a CSV file
    Import {
        #[arg(long, value_enum)]
        collection: Collection,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the dashboard overview
    Overview {
        #[command(flatten)]
        source: SourceArgs,
        /// Emit the overview as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    Postgres,
    Api,
    Csv,
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, value_enum, default_value_t = SourceKind::Postgres)]
    source: SourceKind,
    /// Directory of CSV exports for the csv source
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(settings.database_url()?)
        .await
        .context("failed to connect to Postgres")
}

async fn open_source(
    settings: &Settings,
    args: &SourceArgs,
) -> anyhow::Result<Box<dyn DataService>> {
    Ok(match args.source {
        SourceKind::Postgres => Box::new(db::PgService::new(connect(settings).await?)),
        SourceKind::Api => Box::new(api::ApiClient::new(
            settings.api_url()?,
            settings.api_key.clone(),
        )?),
        SourceKind::Csv => {
            let dir = args
                .snapshot_dir
                .clone()
                .or_else(|| settings.snapshot_dir.clone())
                .context("--snapshot-dir or DASHBOARD_SNAPSHOT_DIR is required for the csv source")?;
            Box::new(snapshot::CsvSnapshot::new(dir))
        }
    })
}

/// Loads the dashboard once; Ctrl-C while the fetches are in flight abandons the load.
async fn load_view(service: &dyn DataService) -> (DashboardView, LoadOutcome) {
    let mut view = DashboardView::new();
    let teardown = teardown_signal(tokio::signal::ctrl_c());
    let outcome = view.refresh(service, teardown).await;
    (view, outcome)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&settings).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(&settings).await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { collection, csv } => {
            let pool = connect(&settings).await?;
            let inserted = db::import_csv(&pool, collection, &csv).await?;
            println!(
                "Inserted {inserted} {} from {}.",
                collection.name(),
                csv.display()
            );
        }
        Commands::Overview { source, json } => {
            let service = open_source(&settings, &source).await?;
            let (view, outcome) = load_view(service.as_ref()).await;
            if outcome == LoadOutcome::Abandoned {
                return Ok(());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&view.overview)?);
            } else {
                print!("{}", render::render_dashboard(&view));
            }
        }
        Commands::Report { source, out } => {
            let service = open_source(&settings, &source).await?;
            let (view, outcome) = load_view(service.as_ref()).await;
            if outcome != LoadOutcome::Applied {
                println!("Dashboard data could not be loaded; no report written.");
                return Ok(());
            }

            let today = chrono::Local::now().date_naive();
            let report = render::build_report(&view.overview, today);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
