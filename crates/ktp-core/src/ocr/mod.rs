//! Image preparation and the text recognition seam.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::{decode_data_url, encode_data_url, ImagePreprocessor};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::fields::RawRecognitionResult;

/// Anything that turns an image into raw text plus a confidence score.
pub trait TextRecognizer {
    /// Recognize text in a preprocessed image.
    ///
    /// `language` is a document-language hint such as `"ind"`; engines that
    /// cannot switch languages may ignore it.
    fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<RawRecognitionResult, OcrError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<RawRecognitionResult, OcrError> {
        (**self).recognize(image, language)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<RawRecognitionResult, OcrError> {
        (**self).recognize(image, language)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for std::sync::Arc<T> {
    fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<RawRecognitionResult, OcrError> {
        (**self).recognize(image, language)
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes by reading order (top-to-bottom, left-to-right).
pub fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        // Group by approximate vertical position (within 20 pixels)
        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Collapse ordered boxes into one recognition result.
///
/// Boxes on the same row are joined with a space so that a label and its
/// value end up on one line, rows are joined with newlines. Confidence is the
/// mean box confidence on the 0 - 100 scale.
pub fn boxes_to_result(boxes: &[TextBox]) -> RawRecognitionResult {
    let mut lines: Vec<String> = Vec::new();
    let mut current_row: Option<i32> = None;

    for text_box in boxes {
        let (_, y, _, _) = text_box.rect();
        let row = (y / 20.0) as i32;

        match lines.last_mut() {
            Some(line) if current_row == Some(row) => {
                line.push(' ');
                line.push_str(&text_box.text);
            }
            _ => lines.push(text_box.text.clone()),
        }
        current_row = Some(row);
    }

    let confidence = if boxes.is_empty() {
        0.0
    } else {
        boxes.iter().map(|b| b.confidence).sum::<f32>() / boxes.len() as f32 * 100.0
    };

    RawRecognitionResult::new(lines.join("\n"), confidence)
}
