//! Scan command - read fields from a single ID card photo.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use ktp_core::{KtpScanner, ScanStage};

use super::{OutputFormat, create_engine, format_fields, load_config};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input photo (JPG, PNG, WebP), or a text file holding a data URL with --data-url
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Treat the input file as a `data:image/...;base64,...` URL
    #[arg(long)]
    data_url: bool,

    /// Include the recognized text in the output
    #[arg(long)]
    show_raw: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Scanning {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Loading OCR models...");

    let engine = create_engine(&config, args.model_dir.as_ref())?;

    let stage_pb = pb.clone();
    let scanner = KtpScanner::from_config(engine, &config).with_progress(move |stage| {
        stage_pb.set_position(stage.percent());
        stage_pb.set_message(stage_message(stage));
    });

    let result = if args.data_url {
        let data_url = fs::read_to_string(&args.input)?;
        scanner.scan_data_url(&data_url)
    } else {
        let bytes = fs::read(&args.input)?;
        scanner.scan_bytes(&bytes)
    };

    let fields = match result {
        Ok(fields) => fields,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };
    pb.finish_with_message("Done");

    let output = format_fields(&fields, args.format, args.show_raw)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if fields.is_empty() {
        eprintln!("{} {}", style("!").yellow(), fields.summary());
    }

    debug!("Total scan time: {:?}", start.elapsed());

    Ok(())
}

fn stage_message(stage: ScanStage) -> &'static str {
    match stage {
        ScanStage::Preprocessing => "Preparing image...",
        ScanStage::Recognizing => "Recognizing text...",
        ScanStage::Extracting => "Extracting fields...",
        ScanStage::Done => "Done",
    }
}
