//! One-shot KTP scan: preprocess, recognize, extract.

use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{OcrError, ScanFailed};
use crate::ktp::{FieldParser, KtpFieldParser};
use crate::models::config::KtpConfig;
use crate::models::fields::ExtractedFields;
use crate::ocr::{ImagePreprocessor, TextRecognizer};

/// Stages reported while a scan runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Preprocessing,
    Recognizing,
    Extracting,
    Done,
}

impl ScanStage {
    /// Rough completion percentage at the start of the stage.
    pub fn percent(&self) -> u64 {
        match self {
            ScanStage::Preprocessing => 10,
            ScanStage::Recognizing => 30,
            ScanStage::Extracting => 80,
            ScanStage::Done => 100,
        }
    }
}

type ProgressFn = Box<dyn Fn(ScanStage) + Send + Sync>;

/// Scans ID card photos with a given recognizer.
pub struct KtpScanner<R> {
    recognizer: R,
    preprocessor: ImagePreprocessor,
    parser: KtpFieldParser,
    language: String,
    progress: Option<ProgressFn>,
}

impl<R: TextRecognizer> KtpScanner<R> {
    /// Create a scanner with default settings.
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            preprocessor: ImagePreprocessor::new(),
            parser: KtpFieldParser::new(),
            language: "ind".to_string(),
            progress: None,
        }
    }

    /// Create a scanner from configuration.
    pub fn from_config(recognizer: R, config: &KtpConfig) -> Self {
        Self {
            recognizer,
            preprocessor: ImagePreprocessor::new().with_contrast(config.preprocessing.contrast),
            parser: KtpFieldParser::from_config(&config.extraction),
            language: config.ocr.language.clone(),
            progress: None,
        }
    }

    /// Report stage changes to a callback.
    pub fn with_progress(mut self, progress: impl Fn(ScanStage) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Scan a `data:image/...;base64,...` URL.
    pub fn scan_data_url(&self, data_url: &str) -> Result<ExtractedFields, ScanFailed> {
        self.report(ScanStage::Preprocessing);
        let image = self
            .preprocessor
            .load_data_url(data_url)
            .map_err(|e| self.fail(e))?;
        self.run(&image)
    }

    /// Scan encoded image bytes.
    pub fn scan_bytes(&self, bytes: &[u8]) -> Result<ExtractedFields, ScanFailed> {
        self.report(ScanStage::Preprocessing);
        let image = self.preprocessor.load_bytes(bytes).map_err(|e| self.fail(e))?;
        self.run(&image)
    }

    /// Scan an already decoded image.
    pub fn scan_image(&self, image: &DynamicImage) -> Result<ExtractedFields, ScanFailed> {
        self.report(ScanStage::Preprocessing);
        self.run(image)
    }

    fn run(&self, image: &DynamicImage) -> Result<ExtractedFields, ScanFailed> {
        let start = Instant::now();

        let enhanced = self.preprocessor.enhance(image).map_err(|e| self.fail(e))?;

        self.report(ScanStage::Recognizing);
        let raw = self
            .recognizer
            .recognize(&enhanced, &self.language)
            .map_err(|e| self.fail(e))?;
        info!(
            "Recognized {} chars, confidence {:.1}",
            raw.text.len(),
            raw.confidence
        );

        self.report(ScanStage::Extracting);
        let fields = self.parser.parse(&raw);

        self.report(ScanStage::Done);
        info!("Scan finished in {}ms", start.elapsed().as_millis());

        Ok(fields)
    }

    fn report(&self, stage: ScanStage) {
        if let Some(progress) = &self.progress {
            progress(stage);
        }
    }

    fn fail(&self, cause: OcrError) -> ScanFailed {
        warn!("Scan failed: {}", cause);
        ScanFailed { cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::RawRecognitionResult;
    use std::sync::{Arc, Mutex};

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(
            &self,
            _image: &DynamicImage,
            language: &str,
        ) -> Result<RawRecognitionResult, OcrError> {
            assert_eq!(language, "ind");
            Ok(RawRecognitionResult::new(self.0, 91.0))
        }
    }

    #[test]
    fn test_stages_reported_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let scanner = KtpScanner::new(FixedText("Nama : BUDI"))
            .with_progress(move |stage| sink.lock().unwrap().push(stage));
        let fields = scanner
            .scan_image(&DynamicImage::new_rgb8(4, 4))
            .unwrap();

        assert_eq!(fields.name, "BUDI");
        assert_eq!(fields.confidence, 91.0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ScanStage::Preprocessing,
                ScanStage::Recognizing,
                ScanStage::Extracting,
                ScanStage::Done
            ]
        );
    }

    #[test]
    fn test_bad_data_url_is_scan_failed() {
        let scanner = KtpScanner::new(FixedText(""));
        let err = scanner.scan_data_url("not a data url").unwrap_err();

        assert!(matches!(err.cause, OcrError::InvalidDataUrl(_)));
        assert_eq!(
            err.to_string(),
            "failed to read the ID card, please retake a clearer photo"
        );
    }
}
