//! End-to-end scans through `KtpScanner` with a stub recognizer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, Rgb, RgbImage};
use pretty_assertions::assert_eq;

use ktp_core::models::fields::Field;
use ktp_core::ocr::encode_data_url;
use ktp_core::{
    ExtractedFields, ImagePreprocessor, KtpConfig, KtpScanner, OcrError, RawRecognitionResult,
    ScanStage, TextRecognizer,
};

const CARD_TEXT: &str = "PROVINSI DKI JAKARTA
NIK : 3174O5570895OOO2
Nama : SITI AMINAH
Tempat/Tgl Lahir : JAKARTA, 17-08-1995
Jenis Kelamin : PEREMPUAN
RT/RW : 003/010
Kecamatan : TEBET";

/// Returns canned text and counts calls.
struct StubRecognizer {
    text: &'static str,
    calls: AtomicUsize,
}

impl StubRecognizer {
    fn new(text: &'static str) -> Self {
        Self {
            text,
            calls: AtomicUsize::new(0),
        }
    }
}

impl TextRecognizer for StubRecognizer {
    fn recognize(
        &self,
        image: &DynamicImage,
        _language: &str,
    ) -> Result<RawRecognitionResult, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // The recognizer only ever sees the enhanced grayscale image
        assert!(matches!(image, DynamicImage::ImageLuma8(_)));
        Ok(RawRecognitionResult::new(self.text, 72.0))
    }
}

/// Always fails, like an engine that could not read the image.
struct BrokenRecognizer;

impl TextRecognizer for BrokenRecognizer {
    fn recognize(
        &self,
        _image: &DynamicImage,
        _language: &str,
    ) -> Result<RawRecognitionResult, OcrError> {
        Err(OcrError::Recognition("engine crashed".to_string()))
    }
}

fn card_data_url() -> String {
    let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 20, Rgb([200, 190, 180])));
    let png = ImagePreprocessor::new().encode_png(&photo).unwrap();
    encode_data_url("image/png", &png)
}

#[test]
fn test_scan_data_url() {
    let recognizer = StubRecognizer::new(CARD_TEXT);
    let scanner = KtpScanner::new(&recognizer);

    let fields = scanner.scan_data_url(&card_data_url()).unwrap();

    assert_eq!(
        fields,
        ExtractedFields {
            name: "SITI AMINAH".to_string(),
            id_number: "3174055708950002".to_string(),
            unit_code: "03".to_string(),
            confidence: 72.0,
            raw_text: CARD_TEXT.to_string(),
        }
    );
    assert_eq!(fields.missing_fields(), Vec::<Field>::new());
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_female_birthdate_repairs_nik() {
    // Birth segment misread as 5708O5; the card says 17-08-1995, female
    let text = "NIK : 3174055708O5OOO2\nTempat/Tgl Lahir : JAKARTA, 17-08-1995\nPEREMPUAN";
    let scanner = KtpScanner::new(StubRecognizer::new(text));

    let fields = scanner.scan_image(&DynamicImage::new_rgb8(8, 8)).unwrap();

    assert_eq!(&fields.id_number[6..12], "570895");
    assert_eq!(fields.id_number.len(), 16);
}

#[test]
fn test_engine_failure_has_no_partial_result() {
    let scanner = KtpScanner::new(BrokenRecognizer);

    let err = scanner.scan_data_url(&card_data_url()).unwrap_err();

    assert!(matches!(err.cause, OcrError::Recognition(_)));
    assert_eq!(
        err.to_string(),
        "failed to read the ID card, please retake a clearer photo"
    );
}

#[test]
fn test_undecodable_photo_never_reaches_recognizer() {
    let recognizer = StubRecognizer::new(CARD_TEXT);
    let scanner = KtpScanner::new(&recognizer);

    let err = scanner
        .scan_data_url(&encode_data_url("image/jpeg", b"definitely not a jpeg"))
        .unwrap_err();

    assert!(matches!(err.cause, OcrError::InvalidImage(_)));
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_config_controls_unit_codes() {
    let mut config = KtpConfig::default();
    config.extraction.valid_unit_codes = vec!["10".to_string()];

    let scanner = KtpScanner::from_config(StubRecognizer::new("RT/RW : 010/002"), &config);
    let fields = scanner.scan_image(&DynamicImage::new_rgb8(4, 4)).unwrap();

    assert_eq!(fields.unit_code, "10");
}

#[test]
fn test_progress_reaches_done() {
    let last = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&last);

    let scanner = KtpScanner::new(StubRecognizer::new(CARD_TEXT))
        .with_progress(move |stage: ScanStage| {
            sink.store(stage.percent() as usize, Ordering::SeqCst)
        });
    scanner.scan_image(&DynamicImage::new_rgb8(4, 4)).unwrap();

    assert_eq!(last.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn test_concurrent_scans_are_independent() {
    let scanner = Arc::new(KtpScanner::new(StubRecognizer::new(CARD_TEXT)));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let scanner = Arc::clone(&scanner);
        handles.push(tokio::task::spawn_blocking(move || {
            scanner.scan_image(&DynamicImage::new_rgb8(16, 16))
        }));
    }

    for handle in handles {
        let fields = handle.await.unwrap().unwrap();
        assert_eq!(fields.name, "SITI AMINAH");
        assert_eq!(fields.unit_code, "03");
    }
}
