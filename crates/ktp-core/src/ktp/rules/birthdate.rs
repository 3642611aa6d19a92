//! Gender and birthdate detection.

use regex::Captures;
use tracing::debug;

use crate::models::fields::{BirthdateHint, Gender};

use super::patterns::{DATE_DMY_LONG, DATE_DMY_SHORT, FEMALE_MARKER, MALE_MARKERS};
use super::{ExtractionMatch, FieldExtractor};

/// Detect the gender printed on the card.
pub fn detect_gender(text: &str) -> Option<Gender> {
    let upper = text.to_uppercase();

    if upper.contains(FEMALE_MARKER) {
        return Some(Gender::Female);
    }
    if MALE_MARKERS.iter().any(|m| upper.contains(m)) {
        return Some(Gender::Male);
    }
    None
}

/// Birthdate extractor.
///
/// The first date in the text wins. A KTP also carries an issue date and
/// sometimes an expiry date; those are not told apart from the birthdate.
pub struct BirthdateExtractor;

impl BirthdateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BirthdateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BirthdateExtractor {
    type Output = ExtractionMatch<BirthdateHint>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let first = self.extract_all(text).into_iter().next()?;

        // Only the first date counts, even when it is not a real date
        if first.value.date().is_none() {
            debug!("First date {:?} is not a real date, ignoring", first.source);
            return None;
        }

        Some(first)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let is_female = detect_gender(text) == Some(Gender::Female);
        let mut results: Vec<Self::Output> = Vec::new();

        // DD-MM-YYYY
        for caps in DATE_DMY_LONG.captures_iter(text) {
            let full_match = caps.get(0).unwrap();
            let Some(hint) = hint_from(&caps, is_female) else {
                continue;
            };
            results.push(
                ExtractionMatch::new(hint, 0.9, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            );
        }

        // DD-MM-YY
        for caps in DATE_DMY_SHORT.captures_iter(text) {
            let full_match = caps.get(0).unwrap();

            // Skip if the same date already matched in its long form
            if results.iter().any(|r| r.position.map(|(s, _)| s) == Some(full_match.start())) {
                continue;
            }

            let Some(hint) = hint_from(&caps, is_female) else {
                continue;
            };
            results.push(
                ExtractionMatch::new(hint, 0.8, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            );
        }

        // Document order
        results.sort_by_key(|r| r.position.map(|(start, _)| start).unwrap_or(usize::MAX));
        results
    }
}

/// Extract the birthdate hint from card text.
pub fn extract_birthdate(text: &str) -> Option<BirthdateHint> {
    let found = BirthdateExtractor::new().extract(text)?;
    debug!(
        "Extracted birthdate {:?} from {:?}",
        found.value, found.source
    );
    Some(found.value)
}

/// Day, month and year groups of a date match.
fn hint_from(caps: &Captures<'_>, is_female: bool) -> Option<BirthdateHint> {
    Some(BirthdateHint {
        day: caps[1].parse().ok()?,
        month: caps[2].parse().ok()?,
        year: parse_year(&caps[3])?,
        is_female,
    })
}

/// Expand two-digit years: 51-99 are 1900s, 00-50 are 2000s.
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(if year < 100 {
        if year > 50 { 1900 + year } else { 2000 + year }
    } else {
        year
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_gender() {
        assert_eq!(detect_gender("Jenis Kelamin : PEREMPUAN"), Some(Gender::Female));
        assert_eq!(detect_gender("jenis kelamin : perempuan"), Some(Gender::Female));
        assert_eq!(detect_gender("Jenis Kelamin : LAKI-LAKI"), Some(Gender::Male));
        assert_eq!(detect_gender("Jenis Kelamin : LAKI LAKI"), Some(Gender::Male));
        assert_eq!(detect_gender("Jenis Kelamin :"), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("26"), Some(2026));
        assert_eq!(parse_year("51"), Some(1951));
        assert_eq!(parse_year("50"), Some(2050));
        assert_eq!(parse_year("1950"), Some(1950));
        assert_eq!(parse_year("\u{0669}\u{0665}"), None);
    }

    #[test]
    fn test_two_digit_year_expansion() {
        let hint = extract_birthdate("Lahir : JAKARTA, 01-02-26").unwrap();
        assert_eq!(hint.year, 2026);

        let hint = extract_birthdate("Lahir : JAKARTA, 01-02-51").unwrap();
        assert_eq!(hint.year, 1951);

        let hint = extract_birthdate("Lahir : JAKARTA, 01/02/50").unwrap();
        assert_eq!(hint.year, 2050);
    }

    #[test]
    fn test_female_birthdate() {
        let text = "Tempat/Tgl Lahir : BANDUNG, 17-08-1995\nJenis Kelamin : PEREMPUAN";
        let hint = extract_birthdate(text).unwrap();

        assert_eq!(
            hint,
            BirthdateHint { day: 17, month: 8, year: 1995, is_female: true }
        );
        assert_eq!(hint.nik_day(), Some(57));
        assert_eq!(hint.nik_segment().as_deref(), Some("570895"));
    }

    #[test]
    fn test_first_date_in_document_order_wins() {
        let text = "Lahir : 05/06/89\nDiterbitkan : 12-10-2015";
        let hint = extract_birthdate(text).unwrap();

        assert_eq!((hint.day, hint.month, hint.year), (5, 6, 1989));
    }

    #[test]
    fn test_long_form_preferred_at_same_position() {
        let hint = extract_birthdate("06-09-1989").unwrap();
        assert_eq!(hint.year, 1989);
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_birthdate("NIK : 3201061509890001"), None);
    }

    #[test]
    fn test_out_of_range_date() {
        assert_eq!(extract_birthdate("Lahir : 45-13-1990"), None);
        assert_eq!(extract_birthdate("Lahir : 31-02-1990"), None);
    }

    #[test]
    fn test_invalid_first_date_is_not_skipped() {
        // A later valid date is usually the issue date, not the birthdate
        let text = "Lahir : 45-13-1990\nDiterbitkan : 12-10-2015";
        assert_eq!(extract_birthdate(text), None);
    }

    #[test]
    fn test_non_ascii_year_gives_no_hint() {
        let text = "NIK : 3201061708950001\nLahir : 17-08-\u{0661}\u{0669}\u{0669}\u{0665}";
        assert_eq!(extract_birthdate(text), None);
        assert_eq!(
            crate::ktp::rules::nik::extract_nik(text, extract_birthdate(text).as_ref()),
            "3201061708950001"
        );
    }
}
