//! Image preprocessing for OCR.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, Luma};
use tracing::debug;

use crate::error::OcrError;

/// Image preprocessor for the scan pipeline: grayscale plus linear contrast.
pub struct ImagePreprocessor {
    /// Contrast factor (2.0 for card photos).
    contrast: f32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self { contrast: 2.0 }
    }

    /// Set the contrast factor.
    pub fn with_contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    /// Decode a `data:image/...;base64,...` URL into an image.
    pub fn load_data_url(&self, data_url: &str) -> Result<DynamicImage, OcrError> {
        let bytes = decode_data_url(data_url)?;
        self.load_bytes(&bytes)
    }

    /// Decode encoded image bytes (JPEG, PNG, WebP...).
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<DynamicImage, OcrError> {
        image::load_from_memory(bytes).map_err(|e| OcrError::InvalidImage(e.to_string()))
    }

    /// Grayscale and contrast-enhance an image for recognition.
    pub fn enhance(&self, image: &DynamicImage) -> Result<DynamicImage, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::Preprocessing("image has no pixels".to_string()));
        }
        debug!("Enhancing {}x{} image, contrast {}", width, height, self.contrast);

        let factor = contrast_factor(self.contrast);
        let rgba = image.to_rgba8();
        let mut gray = GrayImage::new(width, height);

        for (x, y, pixel) in rgba.enumerate_pixels() {
            let [r, g, b, _] = pixel.0;
            let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            gray.put_pixel(x, y, Luma([stretch(luma, factor)]));
        }

        Ok(DynamicImage::ImageLuma8(gray))
    }

    /// Data URL in, enhanced image out.
    pub fn prepare_data_url(&self, data_url: &str) -> Result<DynamicImage, OcrError> {
        let image = self.load_data_url(data_url)?;
        self.enhance(&image)
    }

    /// Encode an image as PNG bytes.
    pub fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| OcrError::Preprocessing(format!("failed to encode PNG: {}", e)))?;
        Ok(out.into_inner())
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the payload of a base64 `data:` URL.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, OcrError> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| OcrError::InvalidDataUrl("missing data: scheme".to_string()))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| OcrError::InvalidDataUrl("missing ',' separator".to_string()))?;

    if !meta.ends_with(";base64") {
        return Err(OcrError::InvalidDataUrl(format!(
            "expected base64 payload, got {:?}",
            meta
        )));
    }
    if !meta.starts_with("image/") {
        return Err(OcrError::InvalidDataUrl(format!("not an image: {:?}", meta)));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| OcrError::InvalidDataUrl(format!("bad base64: {}", e)))
}

/// Encode bytes as a data URL with the given MIME type.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Linear contrast factor, with `contrast` scaled to the usual -255..255 range.
fn contrast_factor(contrast: f32) -> f32 {
    let c = contrast * 100.0;
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

fn stretch(luma: f32, factor: f32) -> u8 {
    (factor * (luma - 128.0) + 128.0).clamp(0.0, 255.0).round() as u8
}
