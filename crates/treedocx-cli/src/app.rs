//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use treedocx_core::{Assembler, Config, Diagnostics, JsonDoctreeStore};
use treedocx_ooxml::{BuildReport, DocxBuilder};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "treedocx")]
#[command(author, version, about = "Document trees in, Word files out", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every configured output document
    Build {
        /// Directory holding `<docname>.json` doctrees, pictures and `treedocx.toml`
        source: PathBuf,

        /// Output directory (default: <SOURCE>/_build)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: <SOURCE>/treedocx.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Translate in memory and print the mutation journals instead of writing
        #[arg(long)]
        dry_run: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Assemble one document tree and print it
    Assemble {
        /// Directory holding `<docname>.json` doctrees
        source: PathBuf,

        /// Start document (default: the configured master document)
        docname: Option<String>,

        /// Configuration file (default: <SOURCE>/treedocx.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only list the documents that would be inlined, in order
        #[arg(long)]
        list: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Run the CLI application
///
/// Parses arguments, sets up logging on stderr and dispatches to the
/// selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Build {
            source,
            output,
            config,
            dry_run,
            format,
        } => {
            build_command(
                &source,
                output.as_deref(),
                config.as_deref(),
                dry_run,
                format,
            )?;
        }
        Commands::Assemble {
            source,
            docname,
            config,
            list,
            format,
        } => {
            assemble_command(
                &source,
                docname.as_deref(),
                config.as_deref(),
                list,
                format,
            )?;
        }
    }

    Ok(())
}

/// `RUST_LOG` directives apply on top of the verbosity flags
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration from an explicit file, or the source directory's
/// `treedocx.toml`, or the defaults
pub fn load_config(source: &Path, config: Option<&Path>) -> Result<Config> {
    match config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Config::load_from_dir(source)
            .with_context(|| format!("Failed to load config from {}", source.display())),
    }
}

/// Execute the build command
///
/// Returns the report of a real build; a dry run returns an empty report
/// after printing the journals.
pub fn build_command(
    source: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    dry_run: bool,
    format: OutputFormat,
) -> Result<BuildReport> {
    if !source.is_dir() {
        anyhow::bail!("Source directory not found: {}", source.display());
    }
    let config = load_config(source, config)?;
    let store = JsonDoctreeStore::new(source);

    let mut builder = DocxBuilder::new(&store, &config, source);
    if let Some(out_dir) = output {
        builder = builder.with_out_dir(out_dir);
    }

    if dry_run {
        let runs = builder.dry_run().context("Dry run failed")?;
        let json =
            serde_json::to_string_pretty(&runs).context("Failed to serialize journals to JSON")?;
        println!("{}", json);
        return Ok(BuildReport::default());
    }

    if format == OutputFormat::Text {
        println!("treedocx v{}", treedocx_ooxml::VERSION);
        println!("Building: {}", source.display());
    }
    let report = builder.build().context("Build failed")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize build report to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for path in &report.written {
                println!("  Created: {}", path.display());
            }
            for path in &report.failed {
                println!("  Failed:  {}", path.display());
            }
            print_diagnostics(&report.diagnostics);
            println!();
            if report.is_complete() {
                println!("Build complete!");
            } else {
                println!(
                    "Build finished with {} unwritten document(s)",
                    report.failed.len()
                );
            }
        }
    }

    Ok(report)
}

/// Execute the assemble command
///
/// Prints the merged tree as JSON, or with `list` the documents it is made
/// of. Skipped inclusions go to stderr in text mode.
pub fn assemble_command(
    source: &Path,
    docname: Option<&str>,
    config: Option<&Path>,
    list: bool,
    format: OutputFormat,
) -> Result<()> {
    if !source.is_dir() {
        anyhow::bail!("Source directory not found: {}", source.display());
    }
    let config = load_config(source, config)?;
    let store = JsonDoctreeStore::new(source);
    let root = docname.unwrap_or(&config.master_doc);

    let assembler =
        Assembler::new(&store).with_merged_target(format!("{}.docx", config.master_doc));

    if list {
        let plan = assembler
            .plan(root)
            .with_context(|| format!("Failed to plan assembly of '{}'", root))?;
        match format {
            OutputFormat::Json => {
                let json =
                    serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
                println!("{}", json);
            }
            OutputFormat::Text => {
                for name in &plan {
                    println!("{}", name);
                }
            }
        }
        return Ok(());
    }

    let assembly = assembler
        .assemble(root)
        .with_context(|| format!("Failed to assemble '{}'", root))?;
    let json = serde_json::to_string_pretty(&assembly.tree)
        .context("Failed to serialize tree to JSON")?;
    println!("{}", json);

    if format == OutputFormat::Text {
        for diagnostic in assembly.diagnostics.iter() {
            eprintln!("{}", diagnostic);
        }
    }

    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    println!();
    for diag in diagnostics.iter() {
        println!("{}", diag);
    }
    println!("{} warning(s)", diagnostics.warning_count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["treedocx", "-vv", "build", "docs"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        match cli.command {
            Commands::Build {
                source, dry_run, ..
            } => {
                assert_eq!(source, PathBuf::from("docs"));
                assert!(!dry_run);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["treedocx", "-q", "-v", "build", "docs"]).is_err());
    }

    #[test]
    fn test_assemble_arguments() {
        let cli = Cli::parse_from(["treedocx", "assemble", "docs", "intro", "--list"]);
        match cli.command {
            Commands::Assemble { docname, list, .. } => {
                assert_eq!(docname.as_deref(), Some("intro"));
                assert!(list);
            }
            _ => panic!("expected assemble"),
        }
    }
}
