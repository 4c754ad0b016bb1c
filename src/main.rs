//! sbomgen: automated SBOM generation and BOM reconciliation
//!
//! Command-line entry point for the in-job generator and offline tooling.

#![allow(clippy::too_many_lines, clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbomgen::{
    cli::{
        self, DesiredConfig, GenerateConfig, IntakeCommandConfig, OutputFormat, PomRecord,
        PrepareManifestConfig, ReconcileBomConfig,
    },
    config::TriggerMode,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nManifest Formats:",
        "\n  Maven POM (XML), purl lists (JSON)",
        "\n\nBOM Formats:",
        "\n  CycloneDX JSON",
        "\n\nFeatures:",
        "\n  Event intake, job-run materialization, BOM reconciliation"
    )
}

#[derive(Parser)]
#[command(name = "sbomgen")]
#[command(version, long_version = build_long_version())]
#[command(about = "Automated SBOM generation and BOM reconciliation", long_about = None)]
#[command(after_help = "EXIT CODES (generate):
    0   Success
    1   General error
    2   Configuration invalid
    3   Configuration missing
    4   Deliverable index out of range
    5   Generation failed
    6   Timed out

EXAMPLES:
    # Add missing declared dependencies to a generated BOM
    sbomgen reconcile-bom --manifest pom.xml --bom bom.json

    # Generate the SBOM of one deliverable inside a job run
    sbomgen generate -c operation-config.yaml --index 0 --workdir /workdir --data-dir /data

    # Show what a notification would create
    sbomgen intake --type DeliverableAnalysisStateChange --payload msg.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs (extracted for readability)
// ============================================================================

/// Arguments for the `reconcile-bom` subcommand
#[derive(Parser)]
struct ReconcileBomArgs {
    /// Manifest declaring the expected dependencies (POM or purl list)
    #[arg(short, long)]
    manifest: PathBuf,

    /// Raw CycloneDX JSON BOM produced by the generator
    #[arg(short, long)]
    bom: PathBuf,

    /// Reconciled BOM path (default: `<bom stem>-enhanced.json` next to the input)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Print the reconciliation report in this format
    #[arg(long, value_enum)]
    report: Option<OutputFormat>,
}

/// Arguments for the `generate` subcommand
#[derive(Parser)]
struct GenerateArgs {
    /// Operation configuration file (YAML or JSON)
    #[arg(short = 'c', long = "operation-config", value_name = "FILE")]
    operation_config: PathBuf,

    /// Deliverable index; every deliverable is processed when omitted
    #[arg(long, allow_negative_numbers = true)]
    index: Option<i64>,

    /// Directory the per-deliverable work directories are created in
    #[arg(long, default_value = "workdir", value_name = "DIR")]
    workdir: PathBuf,

    /// Directory deliverable POM paths are relative to
    #[arg(long, default_value = ".", value_name = "DIR")]
    data_dir: PathBuf,

    /// Clean up existing work directories
    #[arg(short, long)]
    force: bool,
}

/// Arguments for the `prepare-manifest` subcommand
#[derive(Parser)]
struct PrepareManifestArgs {
    /// Analysed artifacts: JSON array or one purl per line
    #[arg(long, value_name = "FILE")]
    artifacts: PathBuf,

    /// Deliverable archive URL; artifacts found elsewhere are ignored
    #[arg(long)]
    url: Option<String>,

    /// Deliverable analysis operation id
    #[arg(long)]
    operation_id: String,

    /// Product name, used as the POM group id
    #[arg(long, default_value = "groupId")]
    group: String,

    /// Product milestone, used as the POM artifact id
    #[arg(long, default_value = "artifactId")]
    artifact: String,

    /// POM version (default: archive file name)
    #[arg(long)]
    pom_version: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Request resource to record the POM on (rewritten in place)
    #[arg(long, value_name = "FILE", requires_all = ["deliverable", "output_file"])]
    request: Option<PathBuf>,

    /// Position of the deliverable within the request configuration
    #[arg(long, requires = "request")]
    deliverable: Option<usize>,

    /// POM reference recorded on the request (default: the output path)
    #[arg(long, requires = "request")]
    pom_ref: Option<String>,
}

/// Arguments for the `intake` subcommand
#[derive(Parser)]
struct IntakeArgs {
    /// Transport `type` property of the message
    #[arg(long = "type", value_name = "TYPE")]
    message_type: String,

    /// Message body (JSON)
    #[arg(long, value_name = "FILE")]
    payload: PathBuf,

    /// Trigger mode (overrides the configuration file)
    #[arg(long, value_enum)]
    trigger: Option<TriggerMode>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    output: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

/// Arguments for the `desired` subcommand
#[derive(Parser)]
struct DesiredArgs {
    /// Persisted generation request (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    request: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    output: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add declared dependencies missing from a generated BOM
    ReconcileBom(ReconcileBomArgs),

    /// Generate deliverable SBOMs (runs inside a generation job)
    Generate(GenerateArgs),

    /// Build a deliverable POM from analysed artifacts
    PrepareManifest(PrepareManifestArgs),

    /// Run event intake on a single notification
    Intake(IntakeArgs),

    /// Print the job runs a generation request calls for
    Desired(DesiredArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .sbomgen.yaml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let (app_config, _) = sbomgen::config::load_or_default(cli.config.as_deref());

    // Dispatch to command handlers
    match cli.command {
        Commands::ReconcileBom(args) => {
            let config = ReconcileBomConfig {
                manifest: args.manifest,
                bom: args.bom,
                output: args.output_file,
                report: args.report,
                reconcile: app_config.reconcile,
                quiet: cli.quiet,
            };
            let exit_code = cli::run_reconcile_bom(config)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::Generate(args) => {
            let config = GenerateConfig {
                config: args.operation_config,
                index: args.index,
                workdir: args.workdir,
                data_dir: args.data_dir,
                force: args.force,
                generator: app_config.generator,
                reconcile: app_config.reconcile,
            };
            let exit_code = cli::run_generate(config)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::PrepareManifest(args) => cli::run_prepare_manifest(PrepareManifestConfig {
            artifacts: args.artifacts,
            url: args.url,
            operation_id: args.operation_id,
            group: args.group,
            artifact: args.artifact,
            version: args.pom_version,
            output: args.output_file,
            record: args.request.zip(args.deliverable).map(|(request, deliverable)| PomRecord {
                request,
                deliverable,
                pom_ref: args.pom_ref,
            }),
            quiet: cli.quiet,
        }),

        Commands::Intake(args) => {
            let config = IntakeCommandConfig {
                message_type: args.message_type,
                payload: args.payload,
                trigger: args.trigger.unwrap_or(app_config.intake.trigger),
                format: args.output,
                output: args.output_file,
                quiet: cli.quiet,
            };
            let exit_code = cli::run_intake(config)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::Desired(args) => cli::run_desired(DesiredConfig {
            request: args.request,
            settings: app_config.orchestrator,
            format: args.output,
            output: args.output_file,
            quiet: cli.quiet,
        }),

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbomgen", &mut io::stdout());
            Ok(())
        }

        Commands::ConfigSchema { output } => {
            let schema = sbomgen::config::generate_json_schema()
                .context("failed to generate config schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = sbomgen::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                eprintln!("Config file search paths (in order):");
                for path in sbomgen::config::search_paths() {
                    eprintln!("  {}", path.display());
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in sbomgen::config::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match sbomgen::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".sbomgen.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = sbomgen::config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}
