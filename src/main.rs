//! sbom-convert: SPDX ⇄ `CycloneDX` SBOM converter
//!
//! Reads a JSON SBOM, detects its format, and writes the equivalent document
//! in the other format. Warnings and errors go to stderr or a JSON report.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_convert::{
    config::{self, ConverterConfig, Validatable},
    ConversionResult, Converter, SbomFormat,
};
use serde_json::Value;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code when the conversion produced errors at `error` severity or above.
const EXIT_CONVERSION_FAILED: i32 = 1;
/// Exit code for IO, parse, configuration, or detection failures.
const EXIT_ERROR: i32 = 3;

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported SBOM Formats:",
        "\n  SPDX:      2.1, 2.2, 2.3 (JSON)",
        "\n  CycloneDX: 1.3, 1.4, 1.5, 1.6 (JSON)"
    )
}

#[derive(Parser)]
#[command(name = "sbom-convert")]
#[command(version, long_version = build_long_version())]
#[command(about = "Convert SBOMs between SPDX and CycloneDX", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Conversion succeeded (warnings allowed)
    1  Conversion produced errors
    3  Error occurred (unreadable input, unknown format, bad config)

EXAMPLES:
    # Convert, detecting the source format
    sbom-convert convert app.spdx.json -O app.cdx.json

    # Read stdin, write stdout, keep a diagnostics report
    cat app.cdx.json | sbom-convert convert - --report report.json

    # Only check what format a file is in
    sbom-convert detect app.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "SBOM_CONVERT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `convert` subcommand
#[derive(Parser)]
struct ConvertArgs {
    /// Input SBOM (`-` for stdin)
    input: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Target format; refuses input already in this format
    #[arg(short, long, value_enum)]
    to: Option<SbomFormat>,

    /// Write warnings and errors as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Skip dependency cycle detection
    #[arg(long)]
    no_cycle_detection: bool,

    /// Exit with code 1 if any warning was produced
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an SBOM into the other format
    Convert(ConvertArgs),

    /// Print the detected format, version, and confidence
    Detect {
        /// Input SBOM (`-` for stdin)
        input: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
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
    /// Print an example config file to stdout
    Example,
    /// Generate an example .sbom-convert.yaml in the current directory
    Init,
    /// Print the JSON Schema of the config file format
    Schema,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout may carry the converted document
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Convert(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            if args.no_cycle_detection {
                config.graph.detect_cycles = false;
            }
            run_convert(&config, &args, cli.quiet)
        }

        Commands::Detect { input } => {
            let document = read_document(&input)?;
            let detection = Converter::default().detect(&document);
            match detection.format {
                Some(format) => println!(
                    "{format} {} (confidence {:.0}%)",
                    detection.version.as_deref().unwrap_or("unknown-version"),
                    detection.confidence.value() * 100.0
                ),
                None => println!("unknown"),
            }
            if !cli.quiet {
                for warning in &detection.warnings {
                    eprintln!("warning: {warning}");
                }
            }
            Ok(if detection.format.is_some() { 0 } else { EXIT_ERROR })
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-convert", &mut io::stdout());
            Ok(0)
        }

        Commands::Config { action } => {
            run_config(action, cli.config.as_deref())?;
            Ok(0)
        }
    }
}

fn run_convert(config: &ConverterConfig, args: &ConvertArgs, quiet: bool) -> Result<i32> {
    let document = read_document(&args.input)?;
    let converter = Converter::new(config);
    let result = match args.to {
        Some(target) => converter.convert_to(&document, target),
        None => converter.convert(&document)?,
    };

    if !quiet {
        print_diagnostics(&result);
    }
    if let Some(path) = &args.report {
        let report = serde_json::to_string_pretty(&result.summary())
            .context("failed to serialize report")?;
        std::fs::write(path, report)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if !result.content.is_null() {
        let rendered = if args.compact {
            serde_json::to_string(&result.content)
        } else {
            serde_json::to_string_pretty(&result.content)
        }
        .context("failed to serialize converted document")?;
        match &args.output_file {
            Some(path) => std::fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => writeln!(io::stdout().lock(), "{rendered}")?,
        }
    }

    if !result.success() || (args.strict && !result.warnings.is_empty()) {
        Ok(EXIT_CONVERSION_FAILED)
    } else {
        Ok(0)
    }
}

fn print_diagnostics(result: &ConversionResult) {
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    for error in &result.errors {
        eprintln!("{}[{}]: {}", error.severity, error.code, error.message);
    }
    eprintln!(
        "Converted to {}: {} warnings, {} errors",
        result.target_format,
        result.warnings.len(),
        result.errors.len()
    );
}

fn read_document(input: &Path) -> Result<Value> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", input.display()))
}

fn load_config(explicit: Option<&Path>) -> Result<ConverterConfig> {
    let config = match explicit {
        Some(path) => config::load_config_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => config::load_or_default(None).0,
    };
    let errors = config.validate();
    if !errors.is_empty() {
        let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("invalid configuration: {}", listed.join("; "));
    }
    Ok(config)
}

fn run_config(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let (config, loaded_from) = config::load_or_default(explicit);
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            let yaml = serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 2] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                ::dirs::config_dir().map(|p| p.join("sbom-convert").display().to_string()),
            ];
            eprintln!("Config file search paths (in order):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            eprintln!();
            match config::discover_config_file(explicit) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".sbom-convert.yaml");
            if target.exists() {
                anyhow::bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            std::fs::write(&target, config::generate_example_config())
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
        }
        ConfigAction::Example => print!("{}", config::generate_example_config()),
        ConfigAction::Schema => println!("{}", config::generate_json_schema()),
    }
    Ok(())
}
