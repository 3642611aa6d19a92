//! NIK (Indonesian national ID number) extraction and repair.
//!
//! A NIK is 16 digits: 6 digits of region code, 6 digits of birthdate
//! (`DDMMYY`, day + 40 for women) and a 4-digit sequence number.

use std::ops::{Range, RangeInclusive};

use tracing::debug;

use crate::models::fields::BirthdateHint;

use super::confusables::to_digit;
use super::patterns::{NIK_LABEL, NIK_PREFIX};
use super::FieldExtractor;

/// Length of a NIK.
pub const NIK_LENGTH: usize = 16;

/// Offset of the `DDMMYY` birthdate segment.
pub const BIRTH_SEGMENT: Range<usize> = 6..12;

/// Positions tried when dropping one spurious digit from a 17-digit read.
///
/// OCR tends to insert the extra digit around the sequence number, so the
/// window stays clear of the region code.
pub const REPAIR_WINDOW: RangeInclusive<usize> = 9..=12;

/// NIK field extractor.
pub struct NikExtractor {
    birthdate: Option<BirthdateHint>,
}

impl NikExtractor {
    /// Create a new NIK extractor without a birthdate cross-check.
    pub fn new() -> Self {
        Self { birthdate: None }
    }

    /// Cross-check (and repair) the birth segment against this birthdate.
    pub fn with_birthdate(mut self, birthdate: Option<BirthdateHint>) -> Self {
        self.birthdate = birthdate;
        self
    }
}

impl Default for NikExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NikExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let line = text
            .lines()
            .find(|line| line.to_uppercase().contains(NIK_LABEL))?;
        debug!("Found NIK line: {:?}", line);

        let after_label = NIK_PREFIX.replace(line, "");
        let digits = digit_run(&after_label);
        debug!("NIK digits: {:?} ({} digits)", digits, digits.len());

        let nik = normalize_length(&digits)?;
        Some(match &self.birthdate {
            Some(hint) => apply_birthdate(&nik, hint),
            None => nik,
        })
    }
}

/// Digits of the leading ID-like run, confusable letters converted.
///
/// The run is a sequence of whitespace-separated tokens made of digits and
/// confusable characters, each holding at least one real digit. The first
/// token may open with one stray letter. A token that ends in anything else
/// (`0001.`) still contributes its leading part, and the run stops there.
fn digit_run(text: &str) -> String {
    let mut digits = String::new();

    for (index, token) in text.split_whitespace().enumerate() {
        let body = match token.chars().next() {
            Some(first) if index == 0 && first.is_ascii_alphabetic() => {
                let rest = &token[first.len_utf8()..];
                if rest.starts_with(|c: char| c.is_ascii_digit()) {
                    // Stray lead letter: converted if it looks like a digit, else dropped
                    if let Some(d) = to_digit(first) {
                        digits.push(d);
                    }
                    rest
                } else {
                    token
                }
            }
            _ => token,
        };

        let end = body
            .char_indices()
            .find(|(_, c)| to_digit(*c).is_none())
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        let run = &body[..end];

        if !run.chars().any(|c| c.is_ascii_digit()) {
            break;
        }
        digits.extend(run.chars().filter_map(to_digit));

        if end < body.len() {
            break;
        }
    }

    digits
}

/// Bring a digit string to exactly 16 digits, or give up.
fn normalize_length(digits: &str) -> Option<String> {
    match digits.len() {
        NIK_LENGTH => Some(digits.to_string()),
        17 => {
            debug!("Got 17 digits, trying to drop one");
            let repaired = REPAIR_WINDOW
                .map(|pos| format!("{}{}", &digits[..pos], &digits[pos + 1..]))
                .find(|candidate| !candidate.starts_with('0'));
            Some(repaired.unwrap_or_else(|| digits[..NIK_LENGTH].to_string()))
        }
        n if n > 17 => Some(digits[..NIK_LENGTH].to_string()),
        _ => None,
    }
}

/// Overwrite the birth segment of a 16-digit NIK with the one the birthdate implies.
///
/// The date on the card is printed with separators and survives OCR better
/// than the run of NIK digits, so it is trusted over them.
pub fn apply_birthdate(nik: &str, birthdate: &BirthdateHint) -> String {
    if nik.len() != NIK_LENGTH || !nik.is_ascii() {
        return nik.to_string();
    }

    let Some(expected) = birthdate.nik_segment() else {
        debug!("Birthdate {:?} is not a real date, NIK left as read", birthdate);
        return nik.to_string();
    };
    let actual = &nik[BIRTH_SEGMENT];
    debug!("Expected birth segment {}, actual {}", expected, actual);

    if actual == expected {
        return nik.to_string();
    }

    let fixed = format!(
        "{}{}{}",
        &nik[..BIRTH_SEGMENT.start],
        expected,
        &nik[BIRTH_SEGMENT.end..]
    );
    debug!("Fixed NIK: {}", fixed);
    fixed
}

/// Extract the NIK from card text; empty when none could be read.
pub fn extract_nik(text: &str, birthdate: Option<&BirthdateHint>) -> String {
    NikExtractor::new()
        .with_birthdate(birthdate.copied())
        .extract(text)
        .unwrap_or_default()
}

/// Check that a string is a well-formed NIK: 16 digits with a plausible birth segment.
pub fn validate_nik(nik: &str) -> bool {
    if nik.len() != NIK_LENGTH || !nik.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let segment = &nik[BIRTH_SEGMENT];
    let day: u32 = segment[0..2].parse().unwrap_or(0);
    let month: u32 = segment[2..4].parse().unwrap_or(0);

    let day_ok = (1..=31).contains(&day) || (41..=71).contains(&day);
    day_ok && (1..=12).contains(&month)
}
