//! Values flowing through a single KTP scan.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw output of the text recognizer for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecognitionResult {
    /// Recognized text, possibly multi-line and noisy.
    pub text: String,

    /// Recognition confidence (0 - 100).
    pub confidence: f32,
}

impl RawRecognitionResult {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 100.0),
        }
    }
}

/// Gender as printed on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// PEREMPUAN
    Female,
    /// LAKI-LAKI
    Male,
}

/// Birthdate parsed from the card text, used to cross-check the NIK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdateHint {
    /// Calendar day (1 - 31), without the female offset.
    pub day: u32,
    /// Month (1 - 12).
    pub month: u32,
    /// Full four-digit year.
    pub year: i32,
    /// Whether the card carries the female marker.
    pub is_female: bool,
}

impl BirthdateHint {
    /// Day as encoded in a NIK: women have 40 added.
    ///
    /// `None` unless the hint is a real calendar date.
    pub fn nik_day(&self) -> Option<u32> {
        self.date()?;
        if self.is_female {
            self.day.checked_add(40)
        } else {
            Some(self.day)
        }
    }

    /// The `DDMMYY` segment expected at offset 6..12 of the NIK.
    ///
    /// Always six ASCII digits; `None` for a hint that is not a real date.
    pub fn nik_segment(&self) -> Option<String> {
        Some(format!(
            "{:02}{:02}{:02}",
            self.nik_day()?,
            self.month,
            self.year.rem_euclid(100)
        ))
    }

    /// The birthdate as a calendar date, if it is a real one.
    pub fn date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// Fields the extractor knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    IdNumber,
    UnitCode,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::IdNumber, Field::UnitCode];

    /// Label used on the registration form.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Nama",
            Field::IdNumber => "NIK",
            Field::UnitCode => "RT",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Best-effort structured fields read from one card.
///
/// Empty strings mean "not found"; the operator fills them in by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Holder name, upper-cased.
    pub name: String,

    /// 16-digit NIK, or empty.
    pub id_number: String,

    /// Neighborhood-unit (RT) code from the configured set, or empty.
    pub unit_code: String,

    /// Recognition confidence (0 - 100).
    pub confidence: f32,

    /// Text the fields were read from.
    pub raw_text: String,
}

impl ExtractedFields {
    /// Value of one field; empty when not found.
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::IdNumber => &self.id_number,
            Field::UnitCode => &self.unit_code,
        }
    }

    /// Fields that were found, in form order.
    pub fn found_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.value(*f).is_empty())
            .collect()
    }

    /// Fields that were not found, in form order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.value(*f).is_empty())
            .collect()
    }

    /// True when nothing at all could be read.
    pub fn is_empty(&self) -> bool {
        self.found_fields().is_empty()
    }

    /// Operator-facing summary of a successful scan.
    pub fn summary(&self) -> String {
        let found = self.found_fields();
        if found.is_empty() {
            return "No data detected. Make sure the ID card photo is sharp and try again.".to_string();
        }

        let labels: Vec<&str> = found.iter().map(Field::label).collect();
        format!(
            "Detected: {}. Please review and edit if needed.",
            labels.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nik_segment_male() {
        let hint = BirthdateHint { day: 6, month: 9, year: 1989, is_female: false };
        assert_eq!(hint.nik_segment().as_deref(), Some("060989"));
    }

    #[test]
    fn test_nik_segment_female() {
        let hint = BirthdateHint { day: 17, month: 8, year: 1995, is_female: true };
        assert_eq!(hint.nik_day(), Some(57));
        assert_eq!(hint.nik_segment().as_deref(), Some("570895"));
    }

    #[test]
    fn test_nik_segment_year_2000() {
        let hint = BirthdateHint { day: 1, month: 1, year: 2000, is_female: false };
        assert_eq!(hint.nik_segment().as_deref(), Some("010100"));
    }

    #[test]
    fn test_nik_segment_rejects_impossible_dates() {
        let overflow = BirthdateHint { day: u32::MAX, month: 1, year: 1990, is_female: true };
        assert_eq!(overflow.nik_day(), None);
        assert_eq!(overflow.nik_segment(), None);

        let day_75 = BirthdateHint { day: 75, month: 8, year: 1995, is_female: true };
        assert_eq!(day_75.nik_segment(), None);

        let feb_31 = BirthdateHint { day: 31, month: 2, year: 1990, is_female: false };
        assert_eq!(feb_31.nik_segment(), None);
    }

    #[test]
    fn test_found_and_missing() {
        let fields = ExtractedFields {
            name: "BUDI".to_string(),
            unit_code: "02".to_string(),
            ..Default::default()
        };

        assert_eq!(fields.found_fields(), vec![Field::Name, Field::UnitCode]);
        assert_eq!(fields.missing_fields(), vec![Field::IdNumber]);
        assert_eq!(fields.summary(), "Detected: Nama, RT. Please review and edit if needed.");
        assert!(!fields.is_empty());
        assert!(ExtractedFields::default().is_empty());
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(RawRecognitionResult::new("x", 140.0).confidence, 100.0);
        assert_eq!(RawRecognitionResult::new("x", -3.0).confidence, 0.0);
    }
}
