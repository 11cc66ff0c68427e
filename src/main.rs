use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use csv_etl::config::EtlConfig;
use csv_etl::logging;
use csv_etl::pipeline::{self, extract_and_transform};
use csv_etl::schema::infer_schema;

#[derive(Parser)]
#[command(name = "csv_etl")]
#[command(about = "Load a CSV export into a PostgreSQL table")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file; defaults apply when the default path is absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Input CSV file (overrides the config file)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Destination table (overrides the config file)
    #[arg(long, global = true)]
    table: Option<String>,

    /// Directory for the JSON log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, clean and write the file into the destination table
    Run,
    /// Load and clean the file, then print the table it would create
    Inspect,
}

const DEFAULT_CONFIG_PATH: &str = "etl.toml";

fn load_config(cli: &Cli) -> anyhow::Result<EtlConfig> {
    let mut config = match &cli.config {
        Some(path) => EtlConfig::load(path)?,
        None => EtlConfig::load_or_default(&PathBuf::from(DEFAULT_CONFIG_PATH))?,
    };
    config.apply_env_overrides();

    if let Some(input) = &cli.input {
        config.input.path = input.clone();
    }
    if let Some(table) = &cli.table {
        config.output.table = table.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log_dir)?;

    let config = load_config(&cli)?;
    info!("Configuration: {:?}", config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            println!("🚀 Loading {} into {}...", config.input.path.display(), config.output.table);
            match pipeline::run(&config) {
                Ok(Some(report)) if report.succeeded() => {
                    println!("✅ {} rows written to {}", report.rows_written, report.table);
                }
                Ok(Some(report)) => {
                    warn!("Table {} was created but no rows were written", report.table);
                    println!("⚠️  Table {} created, rows not written", report.table);
                }
                Ok(None) => {
                    println!("⚠️  Nothing loaded; see the log for the input error");
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Inspect => match extract_and_transform(&config) {
            Some(dataset) => {
                println!(
                    "📋 {} rows; table {} would be created as:",
                    dataset.row_count(),
                    config.output.table
                );
                for column in infer_schema(&dataset).columns {
                    println!("   {} {}", column.name, column.data_type);
                }
            }
            None => {
                println!("⚠️  Nothing loaded; see the log for the input error");
            }
        },
    }
    Ok(())
}
