use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use salary_projection::adjust::ProjectionModel;
use salary_projection::config::{FallbackPolicy, Settings};
use salary_projection::extract::{extract, KeywordTagger};
use salary_projection::provider::{DatasetProvider, HttpProvider, StaticProvider};
use salary_projection::{defaults, pipeline, report};

#[derive(Parser)]
#[command(name = "salary_projection", about = "Project next-year salary bands per role")]
struct Cli {
    /// Settings file (TOML); defaults to ./salary_projection.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch inputs, join by role and print the projected table (default)
    Project(ProjectArgs),
    /// Extract role, level and salary range from job postings
    Extract {
        /// Posting texts (default: the configured postings)
        texts: Vec<String>,
    },
    /// Print the built-in fallback datasets as JSON
    Defaults,
}

/// CLI names for the projection models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelArg {
    Chain,
    Regression,
    HistoricalGrowth,
}

impl From<ModelArg> for ProjectionModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Chain => ProjectionModel::Chain,
            ModelArg::Regression => ProjectionModel::Regression,
            ModelArg::HistoricalGrowth => ProjectionModel::HistoricalGrowth,
        }
    }
}

#[derive(Args, Default)]
struct ProjectArgs {
    /// Override the inflation rate (e.g. 0.025)
    #[arg(long)]
    inflation_rate: Option<f64>,
    /// Abort on the first failed source and rerun on built-in data only
    #[arg(long)]
    fail_fast: bool,
    /// Projection model (default: the configured one)
    #[arg(long, value_enum)]
    model: Option<ModelArg>,
    /// Skip the network; every source uses its built-in dataset
    #[arg(long)]
    offline: bool,
    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Also run extraction over the configured postings
    #[arg(long)]
    extract: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    info!(settings_loaded = ?settings, msg = "Starting salary projection");

    match cli.command.unwrap_or(Commands::Project(ProjectArgs::default())) {
        Commands::Project(args) => project(settings, args),
        Commands::Extract { texts } => {
            let texts = if texts.is_empty() {
                settings.extraction.postings
            } else {
                texts
            };
            print_extractions(&texts);
            Ok(())
        }
        Commands::Defaults => {
            let value = serde_json::json!({
                "salary": defaults::salary_bands(),
                "demand": defaults::demand_factors(),
                "geographic": defaults::geographic_factors(),
                "skills": defaults::skills_premiums(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

fn project(mut settings: Settings, args: ProjectArgs) -> Result<()> {
    if let Some(rate) = args.inflation_rate {
        settings.inflation_rate = rate;
    }
    if args.fail_fast {
        settings.fallback_policy = FallbackPolicy::FailFast;
    }
    if let Some(model) = args.model {
        settings.model = model.into();
    }
    if args.extract {
        settings.extraction.enabled = true;
    }

    let t0 = Instant::now();
    let provider: Box<dyn DatasetProvider> = if args.offline {
        Box::new(StaticProvider::offline())
    } else {
        Box::new(
            HttpProvider::new(settings.sources.clone(), &settings.http)
                .context("Failed to build HTTP client")?,
        )
    };

    if settings.extraction.enabled {
        print_extractions(&settings.extraction.postings);
        println!();
    }

    let table = pipeline::run(&settings, provider.as_ref())?;
    if args.json {
        println!("{}", report::render_json(&table, chrono::Utc::now())?);
    } else {
        print!("{}", report::render_table(&table));
    }

    info!(
        rows = table.rows.len(),
        fallbacks = table.fallbacks.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Done"
    );
    Ok(())
}

fn print_extractions(texts: &[String]) {
    let tagger = KeywordTagger::default();
    let rows: Vec<_> = texts.iter().map(|t| extract(&tagger, t)).collect();
    print!("{}", report::render_extractions(&rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_flag_maps_onto_library_model() {
        let argv = ["salary_projection", "project", "--model", "historical-growth"];
        let cli = Cli::try_parse_from(argv).unwrap();
        let Some(Commands::Project(args)) = cli.command else {
            panic!("expected the project subcommand");
        };
        let model: ProjectionModel = args.model.unwrap().into();
        assert_eq!(model, ProjectionModel::HistoricalGrowth);
        assert_eq!(model.as_str(), "historical-growth");
    }

    #[test]
    fn no_subcommand_means_project() {
        let cli = Cli::try_parse_from(["salary_projection"]).unwrap();
        assert!(cli.command.is_none());
    }
}
