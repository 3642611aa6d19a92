//! Extract command - run field extraction on already recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use ktp_core::{FieldParser, KtpFieldParser, RawRecognitionResult};

use super::{OutputFormat, format_fields, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text file with recognized card text, or `-` for stdin
    #[arg(required = true)]
    input: String,

    /// Recognition confidence to report (0 - 100)
    #[arg(long, default_value = "0")]
    confidence: f32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include the input text in the output
    #[arg(long)]
    show_raw: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let text = if args.input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.input)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input, e))?
    };
    info!("Extracting fields from {} chars", text.len());

    let parser = KtpFieldParser::from_config(&config.extraction);
    let fields = parser.parse(&RawRecognitionResult::new(text, args.confidence));

    let output = format_fields(&fields, args.format, args.show_raw)?;
    match &args.output {
        Some(path) => fs::write(path, output)?,
        None => println!("{}", output),
    }

    Ok(())
}
