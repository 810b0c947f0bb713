//! Command-line front end for the transfer library
//!
//! Reads an already-materialized manifest (JSON mapping of file ID to its
//! comma-joined candidate URLs and expected MD5), resolves endpoint
//! priorities, and runs the sequential transfer driver.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use transfer::{
    ConsoleProgressReporter, EndpointSelector, EntryOutcome, FileEntry, InstanceMetadataProbe,
    IntoProgressCallback, TransferConfig, TransferDriver,
};

#[derive(Parser, Debug)]
#[command(name = "transfer-cli", about = "Resumable multi-endpoint manifest transfers")]
struct Args {
    /// Path to the manifest JSON file
    #[arg(short, long)]
    manifest: PathBuf,

    /// Directory to place downloaded files in (must exist)
    #[arg(short, long)]
    destination: PathBuf,

    /// Comma-joined endpoint priorities, highest first (e.g. "HTTP,S3").
    /// When omitted the ordering is derived from the environment.
    #[arg(short, long, default_value = "")]
    endpoint_priority: String,

    /// Bytes transferred per block
    #[arg(long, default_value_t = 8192)]
    block_size: usize,

    /// Print per-chunk progress and verification detail
    #[arg(short, long)]
    verbose: bool,
}

/// One manifest record as stored on disk
#[derive(Debug, Deserialize)]
struct ManifestRecord {
    urls: String,
    md5: String,
}

fn load_manifest(path: &PathBuf) -> Result<Vec<FileEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read manifest {}", path.display()))?;
    let records: BTreeMap<String, ManifestRecord> =
        serde_json::from_str(&raw).context("manifest is not valid JSON")?;
    Ok(records
        .into_iter()
        .map(|(id, record)| FileEntry::from_joined_urls(&id, &record.urls, &record.md5))
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        args.destination.is_dir(),
        "destination {} is not a directory",
        args.destination.display()
    );

    let entries = load_manifest(&args.manifest)?;
    let config = TransferConfig {
        block_size: args.block_size,
        ..TransferConfig::default()
    };

    let probe = InstanceMetadataProbe::new(&config);
    let selector = EndpointSelector::from_priority_string(&args.endpoint_priority, &probe).await?;

    let driver = TransferDriver::new(selector, config);
    let progress = ConsoleProgressReporter::new(args.verbose).into_callback();
    let report = driver
        .run(&entries, &args.destination, Some(progress))
        .await;

    println!(
        "Done: {} completed, {} failed, {} skipped",
        report.completed(),
        report.failed(),
        report.skipped()
    );
    for entry in &report.entries {
        if let EntryOutcome::Failed { error } = &entry.outcome {
            eprintln!("  {}: {}", entry.id, error);
        }
    }

    anyhow::ensure!(report.failed() == 0, "{} transfer(s) failed", report.failed());
    Ok(())
}
