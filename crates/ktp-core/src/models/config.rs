//! Configuration structures for the scan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{KtpError, Result};

/// Main configuration for the ktp pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KtpConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Image preprocessing configuration.
    pub preprocessing: PreprocessConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Document language hint passed to the recognizer.
    pub language: String,

    /// Keep `[UNK]` tokens in recognized text instead of replacing them with spaces.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "ind".to_string(),
            keep_unk: false,
        }
    }
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Linear contrast factor applied after grayscale conversion.
    pub contrast: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { contrast: 2.0 }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Closed set of neighborhood-unit (RT) codes accepted by the extractor.
    pub valid_unit_codes: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            valid_unit_codes: vec!["01".to_string(), "02".to_string(), "03".to_string()],
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl KtpConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| KtpError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| KtpError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: KtpConfig =
            serde_json::from_str(r#"{"extraction": {"valid_unit_codes": ["04"]}}"#).unwrap();

        assert_eq!(config.extraction.valid_unit_codes, vec!["04".to_string()]);
        assert_eq!(config.ocr.language, "ind");
        assert_eq!(config.preprocessing.contrast, 2.0);
    }

    #[test]
    fn test_model_path() {
        let config = KtpConfig::default();
        assert_eq!(
            config.model_path(&config.models.detection_model),
            PathBuf::from("models").join("det.onnx")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = KtpConfig::default();
        config.preprocessing.contrast = 1.5;
        config.save(&path).unwrap();

        let loaded = KtpConfig::from_file(&path).unwrap();
        assert_eq!(loaded.preprocessing.contrast, 1.5);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = KtpConfig::from_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(KtpError::Io(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(KtpConfig::from_file(&broken), Err(KtpError::Config(_))));
    }
}
