//! Santa CLI - Certificate Generator
//!
//! Commands: generate (default), check, records
//! Progress goes to stdout, errors to stderr.
//! Returns 1 on I/O or configuration failure, 2 on record/template failure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use santa_core::{
    builtin_records, load_records, CertificateBatch, ChildRecord, FailurePolicy, RenderedDocument,
    RunConfig, SantaError, WrittenDocument, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "santa-cli")]
#[command(about = "Santa Certificates - personalised letters from the North Pole")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Abort,
    Continue,
}

#[derive(Args, Default)]
struct InputArgs {
    /// Certificate template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Christmas tree image
    #[arg(long)]
    tree: Option<PathBuf>,

    /// Wax seal image
    #[arg(long)]
    seal: Option<PathBuf>,

    /// JSON array of child records (built-in list when omitted)
    #[arg(long)]
    records: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render and write every certificate
    Generate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory (created if missing)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// What to do when one record fails
        #[arg(long, value_enum)]
        policy: Option<Policy>,
    },

    /// Render every certificate in memory without writing
    Check {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Print the built-in records as JSON
    Records,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    // RUST_LOG, when set, replaces the level chosen by --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn apply_inputs(config: &mut RunConfig, inputs: InputArgs) {
    if let Some(template) = inputs.template {
        config.template = template;
    }
    if let Some(tree) = inputs.tree {
        config.tree_image = tree;
    }
    if let Some(seal) = inputs.seal {
        config.seal_image = seal;
    }
    if inputs.records.is_some() {
        config.records = inputs.records;
    }
}

fn records_for(config: &RunConfig) -> Result<Vec<ChildRecord>, SantaError> {
    match &config.records {
        Some(path) => {
            debug!(path = %path.display(), "loading records");
            load_records(path)
        }
        None => Ok(builtin_records()),
    }
}

fn exit_code(error: &SantaError) -> ExitCode {
    if error.is_validation() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn report_error(format: Format, error: &SantaError) {
    match format {
        Format::Text => {
            eprintln!("Error: {error}");
            if let SantaError::Batch { failures, .. } = error {
                for failure in failures {
                    eprintln!("  - {failure}");
                }
            }
        }
        Format::Json => {
            let errors: Vec<String> = match error {
                SantaError::Batch { failures, .. } => failures.iter().map(|f| f.to_string()).collect(),
                other => vec![other.to_string()],
            };
            let output = serde_json::json!({
                "success": false,
                "version": ENGINE_VERSION,
                "errors": errors,
            });
            eprintln!("{output}");
        }
    }
}

fn print_written(format: Format, written: &[WrittenDocument], failures: &[SantaError]) {
    match format {
        Format::Text => {
            for doc in written {
                println!("✨ Created {} (sha256 {})", doc.path.display(), doc.sha256);
            }
            if failures.is_empty() && !written.is_empty() {
                println!();
                println!("🎅 Ho Ho Ho! All {} certificates are ready!", written.len());
                println!("📄 Open the HTML files in a browser to view them");
                println!("🖨️  Print to PDF or directly print for physical copies");
                println!();
                println!("🎄 Merry Christmas! 🎄");
            }
        }
        Format::Json => {
            let output = serde_json::json!({
                "success": failures.is_empty(),
                "version": ENGINE_VERSION,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "documents": written,
                "errors": failures.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
    }
}

fn print_checked(format: Format, documents: &[RenderedDocument]) {
    match format {
        Format::Text => {
            for doc in documents {
                println!("✔ {} renders ({} bytes, sha256 {})", doc.filename, doc.content.len(), doc.sha256);
            }
        }
        Format::Json => {
            let docs: Vec<_> = documents
                .iter()
                .map(|d| serde_json::json!({
                    "filename": d.filename,
                    "sha256": d.sha256,
                    "bytes": d.content.len(),
                }))
                .collect();
            let output = serde_json::json!({
                "success": true,
                "version": ENGINE_VERSION,
                "documents": docs,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
    }
}

fn generate(config: RunConfig, format: Format) -> Result<(), SantaError> {
    let records = records_for(&config)?;
    let batch = CertificateBatch::from_config(&config)?;
    info!(records = records.len(), output_dir = %batch.output_dir().display(), "generating certificates");

    let report = batch.run(&records)?;
    print_written(format, &report.written, &report.failures);
    report.into_result().map(|_| ())
}

fn check(config: RunConfig, format: Format) -> Result<(), SantaError> {
    let records = records_for(&config)?;
    let batch = CertificateBatch::from_config(&config)?;
    let documents = batch.check(&records)?;
    print_checked(format, &documents);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RunConfig, SantaError> {
    let config = RunConfig::load(path)?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(cli.format, &e);
            return exit_code(&e);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Generate {
        inputs: InputArgs::default(),
        output_dir: None,
        policy: None,
    }) {
        Commands::Generate { inputs, output_dir, policy } => {
            apply_inputs(&mut config, inputs);
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            match policy {
                Some(Policy::Abort) => config.failure_policy = FailurePolicy::Abort,
                Some(Policy::Continue) => config.failure_policy = FailurePolicy::Continue,
                None => {}
            }
            generate(config, cli.format)
        }

        Commands::Check { inputs } => {
            apply_inputs(&mut config, inputs);
            check(config, cli.format)
        }

        Commands::Records => match serde_json::to_string_pretty(&builtin_records()) {
            Ok(json) => {
                println!("{json}");
                Ok(())
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(cli.format, &e);
            exit_code(&e)
        }
    }
}
