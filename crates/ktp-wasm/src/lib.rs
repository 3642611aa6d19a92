//! WASM bindings for KTP field extraction.
//!
//! Recognition itself runs in the browser (or Node.js); these bindings take
//! its text or boxes, and the photo bytes for preprocessing.

use wasm_bindgen::prelude::*;

use ktp_core::models::fields::ExtractedFields;
use ktp_core::models::resident;
use ktp_core::ocr::{boxes_to_result, encode_data_url, sort_by_reading_order};
use ktp_core::{FieldParser, ImagePreprocessor, KtpFieldParser, RawRecognitionResult, TextBox};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract name, NIK and RT from recognized card text.
#[wasm_bindgen]
pub fn extract_fields(text: &str, confidence: f32) -> Result<JsValue, JsValue> {
    let fields = KtpFieldParser::new().parse(&RawRecognitionResult::new(text, confidence));
    to_js(&fields)
}

/// Grayscale and contrast-enhance a photo; returns PNG bytes.
#[wasm_bindgen]
pub fn preprocess_image(bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    let preprocessor = ImagePreprocessor::new();
    let image = preprocessor.load_bytes(bytes).map_err(js_err)?;
    let enhanced = preprocessor.enhance(&image).map_err(js_err)?;
    preprocessor.encode_png(&enhanced).map_err(js_err)
}

/// Same as `preprocess_image`, data URL in and PNG data URL out.
#[wasm_bindgen]
pub fn preprocess_data_url(data_url: &str) -> Result<String, JsValue> {
    let preprocessor = ImagePreprocessor::new();
    let enhanced = preprocessor.prepare_data_url(data_url).map_err(js_err)?;
    let png = preprocessor.encode_png(&enhanced).map_err(js_err)?;
    Ok(encode_data_url("image/png", &png))
}

/// Check that a string is a well-formed 16-digit NIK.
#[wasm_bindgen]
pub fn validate_nik(nik: &str) -> bool {
    ktp_core::ktp::rules::validate_nik(nik)
}

/// The `DDMMYY` segment a NIK should carry for this birthdate, or
/// `undefined` when the date does not exist.
#[wasm_bindgen]
pub fn nik_birth_segment(day: u32, month: u32, year: i32, is_female: bool) -> Option<String> {
    ktp_core::BirthdateHint { day, month, year, is_female }.nik_segment()
}

/// Next free display name, given the names already stored.
#[wasm_bindgen]
pub fn next_available_name(base: &str, existing: Vec<String>) -> String {
    resident::next_available_name(base, &existing)
}

/// Storage key for an uploaded photo, timestamped now.
#[wasm_bindgen]
pub fn photo_storage_path(unit_code: &str, filename: &str) -> Result<String, JsValue> {
    let codes = ktp_core::models::config::ExtractionConfig::default().valid_unit_codes;
    resident::photo_storage_path(unit_code, js_sys::Date::now() as i64, filename, &codes)
        .map_err(js_err)
}

/// KTP extractor class for browser use.
#[wasm_bindgen]
pub struct KtpExtractor {
    parser: KtpFieldParser,
}

#[wasm_bindgen]
impl KtpExtractor {
    /// Create a new extractor with the default RT codes.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: KtpFieldParser::new(),
        }
    }

    /// Replace the accepted RT codes.
    #[wasm_bindgen]
    pub fn set_unit_codes(&mut self, codes: Vec<String>) {
        self.parser = KtpFieldParser::new().with_unit_codes(codes);
    }

    /// Extract fields from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str, confidence: f32) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(&RawRecognitionResult::new(text, confidence)))
    }

    /// Extract fields plus the operator-facing summary, as a JSON string.
    #[wasm_bindgen]
    pub fn extract_json(&self, text: &str, confidence: f32) -> Result<String, JsValue> {
        let fields = self.parser.parse(&RawRecognitionResult::new(text, confidence));

        #[derive(serde::Serialize)]
        struct ExtractResult {
            #[serde(flatten)]
            fields: ExtractedFields,
            summary: String,
        }

        let output = ExtractResult {
            summary: fields.summary(),
            fields,
        };
        serde_json::to_string(&output).map_err(js_err)
    }
}

impl Default for KtpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Text boxes from a browser-side recognizer, collected for extraction.
#[wasm_bindgen]
pub struct RecognizedBoxes {
    boxes: Vec<TextBox>,
}

#[wasm_bindgen]
impl RecognizedBoxes {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Add a text box; `confidence` is 0.0 - 1.0.
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.boxes.push(TextBox {
            text: text.to_string(),
            bbox: [x1, y1, x2, y2, x3, y3, x4, y4],
            confidence,
        });
    }

    /// Text in reading order, one line per row.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        self.to_result().text
    }

    /// Extract fields from the collected boxes.
    #[wasm_bindgen]
    pub fn extract_fields(&self) -> Result<JsValue, JsValue> {
        to_js(&KtpFieldParser::new().parse(&self.to_result()))
    }

    fn to_result(&self) -> RawRecognitionResult {
        let mut boxes = self.boxes.clone();
        sort_by_reading_order(&mut boxes);
        boxes_to_result(&boxes)
    }
}

impl Default for RecognizedBoxes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_validate_nik() {
        assert!(validate_nik("3201060609890001"));
        assert!(!validate_nik("3201060609890"));
    }

    #[wasm_bindgen_test]
    fn test_nik_birth_segment() {
        assert_eq!(nik_birth_segment(17, 8, 1995, true).as_deref(), Some("570895"));
        assert_eq!(nik_birth_segment(6, 9, 1989, false).as_deref(), Some("060989"));
        assert_eq!(nik_birth_segment(31, 2, 1990, false), None);
    }

    #[wasm_bindgen_test]
    fn test_boxes_to_text() {
        let mut boxes = RecognizedBoxes::new();
        boxes.add_box("BUDI", 60.0, 40.0, 100.0, 40.0, 100.0, 50.0, 60.0, 50.0, 0.9);
        boxes.add_box("Nama", 0.0, 41.0, 50.0, 41.0, 50.0, 51.0, 0.0, 51.0, 0.9);
        boxes.add_box("NIK", 0.0, 0.0, 40.0, 0.0, 40.0, 10.0, 0.0, 10.0, 0.9);

        assert_eq!(boxes.get_text(), "NIK\nNama BUDI");
    }

    #[wasm_bindgen_test]
    fn test_extract_json_has_summary() {
        let json = KtpExtractor::new()
            .extract_json("Nama : BUDI SANTOSO", 80.0)
            .unwrap();

        assert!(json.contains(r#""name":"BUDI SANTOSO""#));
        assert!(json.contains("Detected: Nama."));
    }
}
