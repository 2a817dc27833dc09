//! filedim - persistent file dimension indexer and duplicate finder.
//!
//! Usage:
//!   filedim scan [--max-files N] [--no-prune] <PATH>...   Reconcile roots into the index
//!   filedim find-dupes [--limit N] [--output FILE]        Report duplicate file groups
//!   filedim --help                                        Show help

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use filedim_analyze::DedupeFinder;
use filedim_core::ScanConfig;
use filedim_scan::Scanner;
use filedim_store::TreeStore;

#[derive(Parser)]
#[command(
    name = "filedim",
    version,
    about = "Persistent file dimension indexer and duplicate finder",
    long_about = "filedim maintains a persistent index of filesystem trees and\n\
                  finds files with duplicate content across scans, telling true\n\
                  duplicates apart from hard links."
)]
struct Cli {
    /// Path to the index database
    #[arg(long, global = true, default_value = "filedim.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan root directories and reconcile them into the index
    Scan {
        /// Root paths to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Maximum number of entries to visit; -1 for unlimited
        #[arg(short, long, default_value_t = -1)]
        max_files: i64,

        /// Keep stored entries whose path no longer exists on disk
        #[arg(long)]
        no_prune: bool,
    },

    /// Find duplicate file content across everything indexed so far
    FindDupes {
        /// Maximum number of duplicate groups to report (0 = all)
        #[arg(short, long, default_value_t = 25)]
        limit: usize,

        /// Also write the report as JSONL to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan {
            paths,
            max_files,
            no_prune,
        } => run_scan(&cli.db, paths, max_files, no_prune),
        Command::FindDupes { limit, output } => run_find_dupes(&cli.db, limit, output),
    }
}

/// Reconcile each root sequentially; truncation is reported, not an error.
fn run_scan(db: &PathBuf, paths: Vec<PathBuf>, max_files: i64, no_prune: bool) -> Result<()> {
    let store = TreeStore::open(db).context("Cannot open index database")?;

    let config = ScanConfig::builder()
        .roots(paths)
        .max_entries(if max_files < 0 {
            None
        } else {
            Some(max_files as u64)
        })
        .prune(!no_prune)
        .build()
        .map_err(|e| eyre!("Invalid scan configuration: {e}"))?;

    let scanner = Scanner::new(&store);
    let results = scanner.scan_all(&config);

    let mut failures = 0usize;
    for (root, result) in &results {
        match result {
            Ok(report) => {
                println!(
                    "{}: {} visited, {} inserted, {} updated, {} deleted, {} skipped{}",
                    root.display(),
                    report.entries_visited,
                    report.entries_inserted,
                    report.entries_updated,
                    report.entries_deleted,
                    report.entries_skipped,
                    if report.truncated { " (truncated)" } else { "" }
                );
                for warning in &report.warnings {
                    eprintln!("  warning: {}", warning.message);
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("{}: scan failed: {err}", root.display());
            }
        }
    }

    println!("{} entries indexed in total", store.entry_count()?);

    if failures == results.len() {
        return Err(eyre!("All {} root(s) failed to scan", failures));
    }
    Ok(())
}

/// Report duplicate groups, optionally as a JSONL file.
fn run_find_dupes(db: &PathBuf, limit: usize, output: Option<PathBuf>) -> Result<()> {
    let store = TreeStore::open(db).context("Cannot open index database")?;
    let finder = DedupeFinder::with_limit(limit);
    let report = finder.find_duplicates(&store)?;

    if !report.has_duplicates() {
        println!("No duplicate files found.");
        return Ok(());
    }

    println!(
        "Found {} duplicate group(s), {} file(s), {} wasted",
        report.group_count,
        report.files_with_duplicates,
        format_size(report.total_wasted_space)
    );
    println!();

    for (i, group) in report.groups.iter().enumerate() {
        println!(
            "Group {} ({} files, {} each, {} wasted)",
            i + 1,
            group.count(),
            format_size(group.size),
            format_size(group.wasted_bytes)
        );
        for path in &group.paths {
            println!("  {}", path.display());
        }
        println!();
    }

    if let Some(output_path) = output {
        let mut file = std::fs::File::create(&output_path)
            .with_context(|| format!("Cannot create {}", output_path.display()))?;
        for group in &report.groups {
            serde_json::to_writer(&mut file, &group.report_line())?;
            writeln!(file)?;
        }
        eprintln!("Wrote JSONL report to {}", output_path.display());
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
