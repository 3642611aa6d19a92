//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{KtpConfig, OcrConfig};
use crate::models::fields::RawRecognitionResult;

use super::{boxes_to_result, sort_by_reading_order, TextBox, TextRecognizer};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in the configuration.
    pub fn from_config(config: &KtpConfig) -> Result<Self, OcrError> {
        Self::from_files(
            &config.model_path(&config.models.detection_model),
            &config.model_path(&config.models.recognition_model),
            &config.model_path(&config.models.dictionary),
            config.ocr.clone(),
        )
    }

    fn from_files(
        det_path: &Path,
        rec_path: &Path,
        dict_path: &Path,
        config: OcrConfig,
    ) -> Result<Self, OcrError> {
        for path in [det_path, rec_path, dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(det_path)
            .rec_model_path(rec_path)
            .dictionary_path(dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", det_path.display());

        Ok(Self { engine, config })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<RawRecognitionResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        // The latin recognition model covers Indonesian; the hint is informational
        info!("Recognizing {}x{} image (language {})", width, height, language);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut text_boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextBox {
                    bbox: polygon_to_bbox(&r.bounding_box),
                    text,
                    confidence: r.confidence as f32,
                }
            })
            .collect();

        sort_by_reading_order(&mut text_boxes);
        let result = boxes_to_result(&text_boxes);

        info!(
            "OCR complete: {} text boxes, confidence {:.1} in {}ms",
            text_boxes.len(),
            result.confidence,
            start.elapsed().as_millis()
        );

        Ok(result)
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
