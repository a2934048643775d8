//! Asset report command-line tool.
//!
//! Reads an export input document (a JSON array of records, or an object
//! with records plus columns, title, report type and table view state),
//! infers a column schema for it and exports it as spreadsheet or printable
//! reports.

use anyhow::{Context, Result};
use assetreport_core::{
    ExportConfig, ExportCoordinator, ExportKind, ReportType, SchemaInferrer, infer_columns,
    init_logging, parse_input_document, validation::InputDocument,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "assetreport")]
#[command(about = "Schema inference and report export for asset-management data")]
#[command(version)]
#[command(long_about = "
assetreport - schema inference and tabular report export

Derives a stable column schema from heterogeneous asset records and exports
them as Excel-compatible CSV or print-ready HTML reports.

INPUT:
  A JSON array of records, or an object:
  {\"records\": [...], \"columns\": [...], \"title\": \"...\",
   \"reportType\": \"asset-register\", \"filters\": {...}, \"sorter\": {...}}

EXAMPLES:
  assetreport infer --input assets.json
  assetreport infer --input assets.json --report-type asset-register --all-fields
  assetreport export --input assets.json --kind excel --kind pdf --output-dir out/
  assetreport schema > input.schema.json
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Infer the column schema of an input document
    Infer(InferArgs),
    /// Export an input document as one or more report kinds
    Export(ExportArgs),
    /// List known report types and their canonical fields
    List,
    /// Print the JSON Schema input documents are validated against
    Schema,
}

#[derive(Args)]
pub struct InferArgs {
    /// Input document path
    #[arg(short, long, help = "Input JSON document")]
    pub input: PathBuf,

    /// Report type selecting a canonical field list
    #[arg(long, help = "Report type tag (see `assetreport list`)")]
    pub report_type: Option<String>,

    /// Use the canonical field list of the report type
    #[arg(long, help = "Include every canonical field, populated or not")]
    pub all_fields: bool,

    /// Print machine-readable output
    #[arg(long, help = "Print columns and field statistics as JSON")]
    pub json: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Input document path
    #[arg(short, long, help = "Input JSON document")]
    pub input: PathBuf,

    /// Export kinds
    #[arg(
        short,
        long = "kind",
        required = true,
        help = "Export kind: excel or pdf (repeatable)"
    )]
    pub kinds: Vec<String>,

    /// Artifact name
    #[arg(long, help = "Artifact file name (extension is chosen per kind)")]
    pub filename: Option<String>,

    /// Report title
    #[arg(long, help = "Report title")]
    pub title: Option<String>,

    /// Report type
    #[arg(long, help = "Report type tag used when columns are inferred")]
    pub report_type: Option<String>,

    /// Output directory
    #[arg(
        short,
        long,
        env = "ASSETREPORT_OUTPUT_DIR",
        default_value = ".",
        help = "Directory artifacts are written to"
    )]
    pub output_dir: PathBuf,

    /// Currency symbol
    #[arg(long, env = "ASSETREPORT_CURRENCY", help = "Currency symbol for monetary fields")]
    pub currency_symbol: Option<String>,

    /// Date format
    #[arg(
        long,
        env = "ASSETREPORT_DATE_FORMAT",
        help = "strftime format for date fields (e.g. %d %b %Y)"
    )]
    pub date_format: Option<String>,

    /// Do not apply filters and sort to the exported rows
    #[arg(
        long,
        help = "Only describe filters and sort in the report header, export all rows"
    )]
    pub metadata_only: bool,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    assetreport_core::initialize_input_validator()
        .context("Failed to initialize input validator")?;

    match &cli.command {
        Command::Infer(args) => infer(args).await,
        Command::Export(args) => {
            let all_succeeded = export(args).await?;
            if !all_succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::List => {
            list_report_types();
            Ok(())
        }
        Command::Schema => print_input_schema(),
    }
}

/// Reads and validates an input document.
async fn load_document(path: &Path) -> Result<InputDocument> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let document = parse_input_document(&content)
        .with_context(|| format!("Invalid input document {}", path.display()))?;

    info!(
        "Loaded {} records from {}",
        document.records.len(),
        path.display()
    );
    Ok(document)
}

/// Prints the inferred columns with per-field population statistics.
async fn infer(args: &InferArgs) -> Result<()> {
    let document = load_document(&args.input).await?;
    let report_type = args
        .report_type
        .as_deref()
        .or(document.report_type.as_deref());

    let columns = infer_columns(&document.records, args.all_fields, report_type);

    let mut inferrer = SchemaInferrer::new();
    inferrer.analyze_all(&document.records);
    let schema = inferrer.finalize();

    if args.json {
        let output = serde_json::json!({
            "columns": columns,
            "schema": schema,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize columns")?
        );
        return Ok(());
    }

    println!(
        "{} columns from {} records",
        columns.len(),
        schema.records_analyzed
    );
    println!();
    for (index, column) in columns.iter().enumerate() {
        let populated = schema
            .fields
            .iter()
            .find(|field| field.name == column.data_index)
            .map_or(0, |field| field.populated_count);
        println!(
            "{:>3}. {:<28} {:<28} {}/{} populated",
            index + 1,
            column.key,
            column.title,
            populated,
            schema.records_analyzed
        );
    }

    let unpopulated: Vec<_> = schema
        .fields
        .iter()
        .filter(|field| !field.is_populated())
        .map(|field| field.name.as_str())
        .collect();
    if !unpopulated.is_empty() {
        println!();
        println!("Fields without data: {}", unpopulated.join(", "));
    }

    Ok(())
}

/// Runs one export per requested kind concurrently.
///
/// Returns false when any export failed.
async fn export(args: &ExportArgs) -> Result<bool> {
    let document = load_document(&args.input).await?;

    let mut config = ExportConfig::new()
        .with_output_dir(&args.output_dir)
        .with_apply_view_state(!args.metadata_only);
    if let Some(symbol) = &args.currency_symbol {
        config = config.with_currency_symbol(symbol);
    }
    if let Some(format) = &args.date_format {
        config = config.with_date_format(format);
    }

    let coordinator =
        ExportCoordinator::with_default_encoders(config).context("Invalid export configuration")?;

    let mut request = document.into_request();
    if let Some(filename) = &args.filename {
        request.filename = filename.clone();
    }
    if let Some(title) = &args.title {
        request.title = title.clone();
    }
    if let Some(report_type) = &args.report_type {
        request.report_type = Some(report_type.clone());
    }

    let exports = args
        .kinds
        .iter()
        .map(|kind| coordinator.export(kind, &request));
    let results = futures::future::join_all(exports).await;

    let mut all_succeeded = true;
    for (kind, result) in args.kinds.iter().zip(&results) {
        let label = kind
            .parse::<ExportKind>()
            .map_or_else(|_| kind.to_uppercase(), |k| k.label().to_string());
        let message = result.notification(&label);

        if result.success {
            println!("{}", message);
            if let Some(artifact) = &result.artifact {
                println!("  → {}", artifact.display());
            }
        } else {
            error!("{}", message);
            eprintln!("{}", message);
            all_succeeded = false;
        }
    }

    Ok(all_succeeded)
}

/// Lists known report types and their canonical fields
fn list_report_types() {
    println!("Report Types:");
    println!();

    for report_type in ReportType::ALL {
        let fields = report_type.canonical_fields();
        println!("{} ({} fields):", report_type.tag(), fields.len());
        println!("  {}", fields.join(", "));
        println!();
    }

    println!("Export Kinds:");
    println!("  excel  - Excel-compatible CSV (.csv)");

    #[cfg(feature = "printable")]
    println!("  pdf    - Print-ready HTML for print-to-PDF (.html)");
}

/// Prints the embedded input document schema
fn print_input_schema() -> Result<()> {
    let schema = assetreport_core::validation::get_input_schema()
        .context("Failed to load input schema")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&schema).context("Failed to serialize input schema")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_accepts_repeated_kinds() {
        let cli = Cli::try_parse_from([
            "assetreport",
            "export",
            "--input",
            "assets.json",
            "--kind",
            "excel",
            "--kind",
            "pdf",
            "--metadata-only",
        ])
        .unwrap();

        match cli.command {
            Command::Export(args) => {
                assert_eq!(args.kinds, vec!["excel", "pdf"]);
                assert!(args.metadata_only);
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_schema_subcommand() {
        let cli = Cli::try_parse_from(["assetreport", "schema", "-q"]).unwrap();
        assert!(matches!(cli.command, Command::Schema));
        assert!(print_input_schema().is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["assetreport", "list", "-vv"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert!(!cli.global.quiet);
    }
}
