//! Batch command - scan many ID card photos with a pool of workers.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use ktp_core::{ExtractedFields, KtpConfig, KtpScanner};

use super::{OutputFormat, create_engine, format_fields, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input photos
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers, each with its own OCR engine
    #[arg(short = 'j', long, default_value = "2")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of scanning a single file.
struct ScanResult {
    index: usize,
    path: PathBuf,
    fields: Option<ExtractedFields>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// Files still waiting for a worker.
type Queue = Arc<Mutex<VecDeque<(usize, PathBuf)>>>;

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = find_photos(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to scan",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let jobs = args.jobs.clamp(1, files.len());
    let queue: Queue = Arc::new(Mutex::new(files.into_iter().enumerate().collect()));
    let stop = Arc::new(AtomicBool::new(false));

    let mut workers = Vec::with_capacity(jobs);
    for worker_id in 0..jobs {
        let queue = Arc::clone(&queue);
        let stop = Arc::clone(&stop);
        let config = config.clone();
        let model_dir = args.model_dir.clone();
        let pb = overall_pb.clone();
        let continue_on_error = args.continue_on_error;

        workers.push(tokio::task::spawn_blocking(move || {
            scan_worker(worker_id, queue, stop, &config, model_dir.as_ref(), &pb, continue_on_error)
        }));
    }

    let mut results = Vec::new();
    for worker in workers {
        results.extend(worker.await??);
    }
    results.sort_by_key(|r| r.index);

    overall_pb.finish_with_message("Complete");

    if !args.continue_on_error {
        if let Some(failed) = results.iter().find(|r| r.error.is_some()) {
            let error_msg = failed.error.as_deref().unwrap_or("unknown error");
            error!("Failed to scan {}: {}", failed.path.display(), error_msg);
            anyhow::bail!("Scanning failed: {}", error_msg);
        }
    }

    let successful: Vec<_> = results.iter().filter(|r| r.fields.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(fields) = &result.fields {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("ktp");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_fields(fields, args.format, false)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Scanned {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand the pattern and keep supported photo types.
fn find_photos(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    Ok(glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg" | "webp")
        })
        .collect())
}

/// Pull files off the shared queue until it is empty.
///
/// Each worker loads its own engine, so no engine is ever shared between
/// threads.
fn scan_worker(
    worker_id: usize,
    queue: Queue,
    stop: Arc<AtomicBool>,
    config: &KtpConfig,
    model_dir: Option<&PathBuf>,
    pb: &ProgressBar,
    continue_on_error: bool,
) -> anyhow::Result<Vec<ScanResult>> {
    let engine = create_engine(config, model_dir)?;
    let scanner = KtpScanner::from_config(engine, config);
    debug!("Worker {} ready", worker_id);

    let mut results = Vec::new();
    while !stop.load(Ordering::SeqCst) {
        let next = queue
            .lock()
            .map_err(|_| anyhow::anyhow!("work queue poisoned"))?
            .pop_front();
        let Some((index, path)) = next else {
            break;
        };

        let file_start = Instant::now();
        let outcome = fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| scanner.scan_bytes(&bytes).map_err(|e| e.to_string()));
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(fields) => ScanResult {
                index,
                path,
                fields: Some(fields),
                error: None,
                processing_time_ms,
            },
            Err(error_msg) => {
                warn!("Failed to scan {}: {}", path.display(), error_msg);
                if !continue_on_error {
                    stop.store(true, Ordering::SeqCst);
                }
                ScanResult {
                    index,
                    path,
                    fields: None,
                    error: Some(error_msg),
                    processing_time_ms,
                }
            }
        };

        results.push(result);
        pb.inc(1);
    }

    Ok(results)
}

fn write_summary(path: &Path, results: &[ScanResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "name",
        "nik",
        "rt",
        "confidence",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(fields) = &result.fields {
            wtr.write_record([
                filename,
                if fields.is_empty() { "empty" } else { "success" },
                &fields.name,
                &fields.id_number,
                &fields.unit_code,
                &format!("{:.1}", fields.confidence),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
