//! Error types for the ktp-core library.

use thiserror::Error;

/// Errors from loading and saving configuration files.
///
/// Scans and record rules report their own narrower errors.
#[derive(Error, Debug)]
pub enum KtpError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed or written.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to image preparation and text recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The input is not a usable `data:` URL.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// The single user-facing failure of a scan.
///
/// Whatever went wrong underneath (bad image, engine error) the operator sees
/// one message asking for a better photo. The cause is kept for logs.
#[derive(Error, Debug)]
#[error("failed to read the ID card, please retake a clearer photo")]
pub struct ScanFailed {
    #[source]
    pub cause: OcrError,
}

impl From<OcrError> for ScanFailed {
    fn from(cause: OcrError) -> Self {
        Self { cause }
    }
}

/// Errors related to resident records.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Unit code outside the configured set.
    #[error("invalid RT {code}, must be one of {allowed}")]
    InvalidUnitCode { code: String, allowed: String },

    /// Photo file type is not accepted.
    #[error("unsupported photo type: {0}, only JPG, PNG and WebP are allowed")]
    UnsupportedPhotoType(String),

    /// Delete was attempted with the wrong PIN.
    #[error("invalid PIN")]
    InvalidPin,
}

/// Result type for the ktp library.
pub type Result<T> = std::result::Result<T, KtpError>;
