//! CLI binary for srcmodel: parse source files into normalized JSON models.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use srcmodel_core::config::SrcModelConfig;
use srcmodel_core::{ParseResult, schema};
use srcmodel_parser::{Language, SourceParser};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "srcmodel", about = "Multi-language source model extractor")]
struct Cli {
    /// Project root holding .srcmodel/config.toml (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one file and print its model as JSON
    Parse {
        /// Source file to parse
        file: PathBuf,

        /// Language id or alias (detected from the extension if not specified)
        #[arg(short, long)]
        lang: Option<String>,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse many files in parallel and print a JSON array
    Batch {
        /// Source files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported languages, their aliases and extensions
    Languages,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let config = SrcModelConfig::load(&project_root)?;

    match cli.command {
        Commands::Parse {
            file,
            lang,
            compact,
            output,
        } => cmd_parse(config, &file, lang.as_deref(), compact, output.as_deref()),
        Commands::Batch {
            files,
            compact,
            output,
        } => cmd_batch(config, &files, compact, output.as_deref()),
        Commands::Languages => {
            cmd_languages(&config);
            Ok(())
        }
    }
}

/// Print `json` to stdout, or write it to `output`.
fn emit(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_parse(
    config: SrcModelConfig,
    file: &Path,
    lang: Option<&str>,
    compact: bool,
    output: Option<&Path>,
) -> Result<()> {
    let parser = SourceParser::new(config);
    let result = parser.parse(file, lang);
    if let Some(error) = &result.error {
        tracing::warn!("{}: {}", result.path, error);
    }

    let json = if compact {
        schema::to_json_compact(&result)?
    } else {
        schema::to_json(&result)?
    };
    emit(&json, output)
}

fn cmd_batch(
    config: SrcModelConfig,
    files: &[PathBuf],
    compact: bool,
    output: Option<&Path>,
) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("invalid progress template")?,
    );
    spinner.set_message(format!("Parsing {} files...", files.len()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let parser = SourceParser::new(config);
    let results = parser.parse_many(files);
    spinner.finish_and_clear();

    print_summary(&results);

    let json = schema::batch_to_json(&results, !compact)?;
    emit(&json, output)
}

fn print_summary(results: &[ParseResult]) {
    let failed: Vec<&ParseResult> = results.iter().filter(|r| !r.is_ok()).collect();
    let symbols: usize = results.iter().map(|r| r.symbols.len()).sum();
    let calls: usize = results.iter().map(|r| r.calls.len()).sum();

    eprintln!("Parsed {} files:", results.len());
    eprintln!("  Succeeded: {}", results.len() - failed.len());
    eprintln!("  Failed: {}", failed.len());
    eprintln!("  Symbols: {}", symbols);
    eprintln!("  Calls: {}", calls);
    for result in failed {
        eprintln!(
            "  {} - {}",
            result.path,
            result.error.as_deref().unwrap_or_default()
        );
    }
}

fn cmd_languages(config: &SrcModelConfig) {
    println!("{:<12} {:<14} EXTENSIONS", "LANGUAGE", "ALIASES");
    for language in Language::ALL {
        let mut extensions: Vec<String> = language
            .extensions()
            .iter()
            .map(|e| format!(".{e}"))
            .collect();
        for (ext, id) in &config.languages.extensions {
            if Language::from_name(id) == Some(language) {
                extensions.push(format!(".{ext} (configured)"));
            }
        }
        println!(
            "{:<12} {:<14} {}",
            language.name(),
            language.aliases().join(", "),
            extensions.join(" ")
        );
    }
}
