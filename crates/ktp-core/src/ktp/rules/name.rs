//! Holder name extraction.

use tracing::debug;

use super::patterns::{
    NAME_DISALLOWED, NAME_FALSE_POSITIVES, NAME_LABEL, NAME_SAME_LINE, OTHER_FIELD_LABEL,
};
use super::FieldExtractor;

/// Name field extractor.
pub struct NameExtractor;

impl NameExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NameExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        // Only the first real name label is considered
        let index = lines.iter().position(|line| is_name_label(line))?;
        let line = lines[index].to_uppercase();
        debug!("Found name line: {:?}", line);

        if let Some(caps) = NAME_SAME_LINE.captures(&line) {
            if caps[1].trim().len() > 2 {
                return non_empty(clean_name(&caps[1]));
            }
        }

        let next = lines.get(index + 1)?;
        if OTHER_FIELD_LABEL.is_match(next) {
            debug!("Line after name label is another field: {:?}", next);
            return None;
        }

        non_empty(clean_name(next))
    }
}

fn is_name_label(line: &str) -> bool {
    let upper = line.to_uppercase();
    upper.contains(NAME_LABEL) && !NAME_FALSE_POSITIVES.iter().any(|l| upper.contains(l))
}

/// Keep letters, spaces, periods and apostrophes; upper-case.
fn clean_name(raw: &str) -> String {
    NAME_DISALLOWED.replace_all(raw, "").trim().to_uppercase()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Extract the holder name from card text; empty when none could be read.
pub fn extract_name(text: &str) -> String {
    NameExtractor::new().extract(text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_line() {
        assert_eq!(extract_name("Nama : BUDI SANTOSO"), "BUDI SANTOSO");
        assert_eq!(extract_name("NAMA: siti aminah"), "SITI AMINAH");
    }

    #[test]
    fn test_same_line_with_punctuation() {
        assert_eq!(extract_name("Nama : R.A. KARTINI'S"), "R.A. KARTINI'S");
    }

    #[test]
    fn test_next_line() {
        let text = "NIK : 3201060609890001\nNama\nBudi Santoso 1\nTempat/Tgl Lahir : BOGOR";
        assert_eq!(extract_name(text), "BUDI SANTOSO");
    }

    #[test]
    fn test_next_line_is_other_label() {
        let text = "Nama :\nTempat/Tgl Lahir : BOGOR, 06-09-1989\nNama : BUDI";
        assert_eq!(extract_name(text), "");
    }

    #[test]
    fn test_kecamatan_never_name_label() {
        let text = "NAMA KECAMATAN : CIBINONG\nNama : BUDI SANTOSO";
        assert_eq!(extract_name(text), "BUDI SANTOSO");

        assert_eq!(extract_name("NAMA KECAMATAN\nCIBINONG"), "");
    }

    #[test]
    fn test_short_same_line_value_falls_back_to_next_line() {
        let text = "Nama : Al\nALI BIN ABU";
        assert_eq!(extract_name(text), "ALI BIN ABU");
    }

    #[test]
    fn test_no_label() {
        assert_eq!(extract_name("PROVINSI JAWA BARAT\nKABUPATEN BOGOR"), "");
    }

    #[test]
    fn test_label_on_last_line() {
        assert_eq!(extract_name("PROVINSI JAWA BARAT\nNama"), "");
    }
}
