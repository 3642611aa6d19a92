//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod scan;

use std::path::{Path, PathBuf};

use ktp_core::models::fields::Field;
use ktp_core::{ExtractedFields, KtpConfig, PureOcrEngine};
use tracing::debug;

/// Output format for extracted fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Load the explicit config file, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<KtpConfig> {
    if let Some(path) = config_path {
        return Ok(KtpConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(KtpConfig::from_file(&default_path)?)
    } else {
        Ok(KtpConfig::default())
    }
}

/// Load the OCR engine, with an optional model directory override.
pub fn create_engine(config: &KtpConfig, model_dir: Option<&PathBuf>) -> anyhow::Result<PureOcrEngine> {
    let mut config = config.clone();
    if let Some(dir) = model_dir {
        config.models.model_dir = dir.clone();
    }

    let det_model = config.model_path(&config.models.detection_model);
    if !det_model.exists() {
        anyhow::bail!(
            "OCR models not found at {}.\n\n\
             Place {}, {} and {} there or pass --model-dir.",
            config.models.model_dir.display(),
            config.models.detection_model,
            config.models.recognition_model,
            config.models.dictionary
        );
    }

    debug!("Using models from {}", config.models.model_dir.display());
    PureOcrEngine::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))
}

pub fn format_fields(
    fields: &ExtractedFields,
    format: OutputFormat,
    show_raw: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(fields, show_raw),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields, show_raw)),
    }
}

fn format_json(fields: &ExtractedFields, show_raw: bool) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(fields)?;
    if !show_raw {
        if let Some(obj) = value.as_object_mut() {
            obj.remove("raw_text");
        }
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

fn format_csv(fields: &ExtractedFields) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["name", "nik", "rt", "confidence"])?;
    wtr.write_record([
        &fields.name,
        &fields.id_number,
        &fields.unit_code,
        &format!("{:.1}", fields.confidence),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(fields: &ExtractedFields, show_raw: bool) -> String {
    let mut output = String::new();

    for field in Field::ALL {
        let value = fields.value(field);
        let shown = if value.is_empty() { "-" } else { value };
        output.push_str(&format!("{:<5} {}\n", format!("{}:", field), shown));
    }
    output.push_str(&format!("Confidence: {:.1}%\n", fields.confidence));
    output.push('\n');
    output.push_str(&fields.summary());
    output.push('\n');

    if show_raw {
        output.push_str("\nRecognized text:\n");
        output.push_str(&fields.raw_text);
        output.push('\n');
    }

    output
}
