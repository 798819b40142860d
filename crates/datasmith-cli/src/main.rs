use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use datasmith_core::TableSchema;
use datasmith_generate::{
    output, GenerateError, Pipeline, PipelineOptions, RunOutcome, RunRequest, TableOutcome,
};
use datasmith_introspect::{PostgresSource, SchemaSource};
use datasmith_llm::{LlmConfig, LlmError, OpenAiClient};

const SAMPLE_ROW_LIMIT: i64 = 10;

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] datasmith_core::Error),
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "datasmith", version, about = "Datasmith CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List candidate tables in the connected database.
    Tables(TablesArgs),
    /// Generate synthetic records for selected tables.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct TablesArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "sample_file")]
    conn: Option<String>,
    /// Generate from a single uploaded CSV sample instead of a database.
    #[arg(long, value_name = "PATH")]
    sample_file: Option<PathBuf>,
    /// Table(s) to generate. With --sample-file, names the one target table
    /// (defaults to the file stem).
    #[arg(long = "table", value_name = "TABLE")]
    tables: Vec<String>,
    /// Number of records per table (1-1000).
    #[arg(long, default_value_t = 5)]
    records: u32,
    /// Output file format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Output directory.
    #[arg(long, default_value = "out")]
    out: PathBuf,
    /// Fetch sample rows from the source to steer generation style.
    #[arg(long, default_value_t = false)]
    with_samples: bool,
    /// Seconds to wait for a single completion.
    #[arg(long, default_value_t = 120)]
    llm_timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tables(args) => run_tables(args).await,
        Command::Generate(args) => run_generate(args).await,
    }
}

async fn run_tables(args: TablesArgs) -> Result<(), CliError> {
    let source = connect(&args.conn).await?;
    for table in source.list_tables().await? {
        println!("{table}");
    }
    Ok(())
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut config = LlmConfig::from_env()?;
    config.timeout = Duration::from_secs(args.llm_timeout);
    let llm = Arc::new(OpenAiClient::new(config)?);

    let options = PipelineOptions {
        llm_timeout: Duration::from_secs(args.llm_timeout),
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(llm, options);

    let request = match (&args.conn, &args.sample_file) {
        (Some(conn), None) => build_db_request(conn, &args).await?,
        (None, Some(path)) => build_sample_request(path, &args)?,
        (None, None) => {
            return Err(CliError::InvalidConfig(
                "either --conn or --sample-file is required".to_string(),
            ));
        }
        (Some(_), Some(_)) => {
            return Err(CliError::InvalidConfig(
                "use either --conn or --sample-file, not both".to_string(),
            ));
        }
    };

    let outcome = pipeline.run(&request).await?;
    write_outputs(&outcome, &args.out, args.format)?;

    for report in &outcome.report.tables {
        match &report.failure {
            None => tracing::info!(
                table = %report.table,
                rows = report.rows_generated,
                skipped = report.rows_skipped,
                "table complete"
            ),
            Some(reason) => eprintln!("table '{}' failed: {reason}", report.table),
        }
    }
    println!(
        "generated {} rows across {} tables ({} failed)",
        outcome.report.rows_generated,
        outcome.order.len(),
        outcome.report.failures
    );
    Ok(())
}

async fn connect(conn: &str) -> Result<PostgresSource, CliError> {
    if !conn.starts_with("postgres://") && !conn.starts_with("postgresql://") {
        return Err(CliError::InvalidConfig(format!(
            "unsupported connection string '{conn}'"
        )));
    }
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    Ok(PostgresSource::new(pool))
}

async fn build_db_request(conn: &str, args: &GenerateArgs) -> Result<RunRequest, CliError> {
    if args.tables.is_empty() {
        return Err(CliError::InvalidConfig(
            "select at least one table with --table".to_string(),
        ));
    }
    let source = connect(conn).await?;

    let mut schemas = BTreeMap::new();
    let mut samples = BTreeMap::new();
    for table in &args.tables {
        schemas.insert(table.clone(), source.table_schema(table).await?);
        if args.with_samples {
            let sample = source.sample_rows(table, SAMPLE_ROW_LIMIT).await?;
            if !sample.is_empty() {
                samples.insert(table.clone(), sample);
            }
        }
    }
    let edges = source.foreign_keys(&args.tables).await?;

    Ok(RunRequest {
        tables: args.tables.clone(),
        schemas,
        edges,
        record_count: args.records,
        samples,
    })
}

fn build_sample_request(path: &Path, args: &GenerateArgs) -> Result<RunRequest, CliError> {
    let table = match args.tables.as_slice() {
        [] => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                CliError::InvalidConfig("cannot derive a table name from the file".to_string())
            })?,
        [name] => name.clone(),
        _ => {
            return Err(CliError::InvalidConfig(
                "--sample-file targets exactly one table".to_string(),
            ));
        }
    };

    // A local file is real CSV, so quoted fields must survive; the lenient
    // completion parser is only for LLM output.
    let sample = output::read_csv(path)?;
    if sample.columns.is_empty() {
        return Err(CliError::InvalidConfig(format!(
            "sample file '{}' has no header row",
            path.display()
        )));
    }
    let schema = TableSchema::from_text_columns(&table, &sample.columns);

    let mut schemas = BTreeMap::new();
    schemas.insert(table.clone(), schema);
    let mut samples = BTreeMap::new();
    samples.insert(table.clone(), sample);

    Ok(RunRequest {
        tables: vec![table],
        schemas,
        edges: Vec::new(),
        record_count: args.records,
        samples,
    })
}

fn write_outputs(
    outcome: &RunOutcome,
    out_dir: &Path,
    format: OutputFormat,
) -> Result<(), CliError> {
    std::fs::create_dir_all(out_dir)?;
    for table in &outcome.order {
        if let Some(TableOutcome::Generated(records)) = outcome.tables.get(table) {
            let path = match format {
                OutputFormat::Csv => {
                    let path = out_dir.join(format!("{table}.csv"));
                    output::write_csv(&path, records)?;
                    path
                }
                OutputFormat::Json => {
                    let path = out_dir.join(format!("{table}.json"));
                    output::write_json(&path, records)?;
                    path
                }
            };
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
