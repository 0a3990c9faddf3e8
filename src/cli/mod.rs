//! # CLI Module
//!
//! Command-line interface for the near-duplicate finder.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for near-duplicates
//! near-dup scan ~/Photos
//!
//! # Stricter threshold, subfolders included
//! near-dup scan ~/Photos --threshold 0.95 --recursive
//!
//! # JSON output
//! near-dup scan ~/Photos --output json
//!
//! # Delete picked files, then re-scan
//! near-dup delete ~/Photos ~/Photos/copy.jpg --yes
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use near_dup_finder::core::comparator::{LshConfig, ThresholdStrategy};
use near_dup_finder::error::Result;
use near_dup_finder::events::{Event, EventChannel, HashEvent, PipelineEvent, ScanEvent};
use near_dup_finder::{delete_files, Pipeline, PipelineResult};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::warn;

/// Near-Duplicate Finder - Spot visually similar images
#[derive(Parser, Debug)]
#[command(name = "near-dup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging, per-pair details)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory for near-duplicate images
    Scan {
        /// Directory to scan
        directory: PathBuf,

        #[command(flatten)]
        detect: DetectArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Delete files, then re-scan the directory
    Delete {
        /// Directory to re-scan afterwards
        directory: PathBuf,

        /// Files to delete
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        detect: DetectArgs,

        /// Actually delete; without this only the plan is printed
        #[arg(long)]
        yes: bool,
    },
}

/// Detection parameters shared by every subcommand
#[derive(Args, Debug, Clone)]
struct DetectArgs {
    /// Similarity a pair must exceed, between 0 and 1
    #[arg(short, long, default_value_t = ThresholdStrategy::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Fingerprint grid size (fingerprints have size² bits)
    #[arg(short = 's', long, default_value_t = 16)]
    hash_size: u32,

    /// Number of LSH bands
    #[arg(short, long, default_value_t = LshConfig::default().bands)]
    bands: usize,

    /// Include subfolders
    #[arg(short, long)]
    recursive: bool,

    /// Skip hidden files and folders
    #[arg(long)]
    skip_hidden: bool,
}

impl DetectArgs {
    fn pipeline(&self, directory: &Path) -> Result<Pipeline> {
        Ok(Pipeline::builder()
            .directory(directory)
            .threshold(self.threshold)
            .hash_size(self.hash_size)
            .bands(self.bands)
            .recursive(self.recursive)
            .include_hidden(!self.skip_hidden)
            .build()?)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (one path per line, blank line between clusters)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    near_dup_finder::init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            directory,
            detect,
            output,
        } => run_scan(&directory, &detect, output, cli.verbose),
        Commands::Delete {
            directory,
            files,
            detect,
            yes,
        } => run_delete(&directory, &files, &detect, yes, cli.verbose),
    }
}

fn run_scan(directory: &Path, detect: &DetectArgs, output: OutputFormat, verbose: bool) -> Result<()> {
    let term = Term::stderr();

    // Reject bad parameters before touching the directory
    let pipeline = detect.pipeline(directory)?;

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Near-Duplicate Finder").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let outcome = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let result = match outcome {
        Ok(result) => result,
        Err(e) if e.is_directory_access() => {
            println!("Couldn't open input directory {}", display_path(directory));
            println!("{}", style(e).dim());
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, directory, detect, &result, verbose),
        OutputFormat::Json => print_json_results(directory, detect, &result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    // Machine-readable modes keep stdout clean
    if result.groups.is_empty() && !matches!(output, OutputFormat::Pretty) {
        eprintln!("{}", no_results_message(directory, detect.threshold));
    }

    Ok(())
}

fn run_delete(
    directory: &Path,
    files: &[PathBuf],
    detect: &DetectArgs,
    yes: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    // Validate before anything is removed
    detect.pipeline(directory)?;

    if !yes {
        term.write_line(&format!(
            "{} {} file(s) would be deleted:",
            style("Dry run:").yellow().bold(),
            files.len()
        ))
        .ok();
        for file in files {
            term.write_line(&format!("    {}", display_path(file))).ok();
        }
        term.write_line(&format!(
            "{}",
            style("Nothing was deleted. Pass --yes to delete these files.").dim()
        ))
        .ok();
        return Ok(());
    }

    let report = delete_files(files);

    for path in &report.deleted {
        term.write_line(&format!("  {} {}", style("✗").red(), display_path(path)))
            .ok();
    }
    for (path, error) in &report.failed {
        term.write_line(&format!(
            "  {} {}: {}",
            style("!").yellow().bold(),
            display_path(path),
            error
        ))
        .ok();
    }
    term.write_line(&format!(
        "{} deleted, {} failed",
        style(report.deleted.len()).cyan(),
        style(report.failed.len()).cyan()
    ))
    .ok();
    term.write_line("").ok();

    run_scan(directory, detect, OutputFormat::Pretty, verbose)
}

fn print_pretty_results(
    term: &Term,
    directory: &Path,
    detect: &DetectArgs,
    result: &PipelineResult,
    verbose: bool,
) {
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} files listed, {} fingerprinted in {:.1}s",
        style(result.total_files).cyan(),
        style(result.fingerprinted).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} files skipped (not decodable as images)",
            style(result.skipped.len()).yellow()
        ))
        .ok();
    }

    if !result.scan_warnings.is_empty() {
        term.write_line(&format!(
            "  {} folders could not be read",
            style(result.scan_warnings.len()).yellow()
        ))
        .ok();
    }

    if verbose {
        for skipped in &result.skipped {
            term.write_line(&format!(
                "    {} {}",
                style(display_path(&skipped.path)).dim(),
                style(&skipped.reason).dim()
            ))
            .ok();
        }
        if let Some(stats) = &result.lsh_stats {
            term.write_line(&format!("  {}", style(stats).dim())).ok();
        }
    }

    term.write_line("").ok();

    if result.groups.is_empty() {
        println!("{}", no_results_message(directory, detect.threshold));
        return;
    }

    term.write_line(&format!(
        "{}",
        style("Near-Duplicate Clusters:").bold().underlined()
    ))
    .ok();
    term.write_line("").ok();

    for (i, group) in result.groups.iter().enumerate() {
        println!(
            "  {} {} photos, {} average similarity",
            style(format!("Cluster {}:", i + 1)).bold(),
            group.len(),
            style(format_percent(group.average_similarity)).yellow()
        );

        for photo in &group.photos {
            println!("    {} {}", style("○").dim(), display_path(photo));
        }

        if verbose {
            for pair in result
                .near_duplicates
                .iter()
                .filter(|pair| group.contains(&pair.path_a))
            {
                println!(
                    "      {} {} ~ {} ({}, {} bits differ)",
                    style("·").dim(),
                    display_path(&pair.path_a),
                    display_path(&pair.path_b),
                    format_percent(pair.similarity),
                    pair.distance
                );
            }
        }

        println!();
    }

    // Footer
    term.write_line(&format!(
        "{}",
        style("No files were deleted. Use `near-dup delete` to remove the ones you don't want.")
            .dim()
    ))
    .ok();
}

fn print_json_results(directory: &Path, detect: &DetectArgs, result: &PipelineResult) {
    let output = serde_json::json!({
        "directory": directory,
        "threshold": detect.threshold,
        "hash_size": detect.hash_size,
        "bands": detect.bands,
        "total_files": result.total_files,
        "fingerprinted": result.fingerprinted,
        "duration_ms": result.duration_ms,
        "near_duplicates": result.near_duplicates,
        "groups": result.groups,
        "skipped": result.skipped,
        "scan_warnings": result.scan_warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
        "lsh": result.lsh_stats,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!(error = %e, "Failed to serialize results"),
    }
}

fn print_minimal_results(result: &PipelineResult) {
    for (i, group) in result.groups.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for photo in &group.photos {
            println!("{}", photo.display());
        }
    }
}

fn no_results_message(directory: &Path, threshold: f64) -> String {
    format!(
        "No near-duplicates found in {} (threshold {})",
        display_path(directory),
        format_percent(threshold)
    )
}

/// Show paths under the home directory as `~/...`
fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// `0.9` -> `90%`, `0.955` -> `95.5%`
fn format_percent(fraction: f64) -> String {
    let percent = format!("{:.1}", fraction * 100.0);
    format!("{}%", percent.trim_end_matches(".0"))
}
