//! Core library for Indonesian ID card (KTP) scanning.
//!
//! This crate provides:
//! - Image preprocessing (data URL decoding, grayscale, contrast)
//! - A text recognition seam with a pure Rust ONNX backend
//! - KTP field extraction (name, NIK, RT code) with confusable repair
//!   and a birthdate cross-check
//! - Resident record contracts for the registration flow

pub mod error;
pub mod ktp;
pub mod models;
pub mod ocr;
pub mod scanner;

pub use error::{KtpError, OcrError, RecordError, Result, ScanFailed};
pub use ktp::{FieldParser, KtpFieldParser};
pub use models::config::KtpConfig;
pub use models::fields::{BirthdateHint, ExtractedFields, Field, Gender, RawRecognitionResult};
pub use models::resident::{NewResident, Resident, ResidentDraft};
pub use ocr::{ImagePreprocessor, TextBox, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use scanner::{KtpScanner, ScanStage};
