//! Rule-based field extractors for KTP text.

pub mod birthdate;
pub mod confusables;
pub mod name;
pub mod nik;
pub mod patterns;
pub mod unit_code;

pub use birthdate::{detect_gender, extract_birthdate, BirthdateExtractor};
pub use confusables::{confusable_digit, normalize_zero_one};
pub use name::{extract_name, NameExtractor};
pub use nik::{apply_birthdate, extract_nik, validate_nik, NikExtractor};
pub use unit_code::{extract_unit_code, UnitCodeExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all candidates for the field, best first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.extract(text).into_iter().collect()
    }
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
