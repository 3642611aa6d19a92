//! KTP field parser composing the individual rules.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::fields::{ExtractedFields, RawRecognitionResult};

use super::rules::{
    birthdate::extract_birthdate, name::NameExtractor, nik::NikExtractor,
    unit_code::UnitCodeExtractor, FieldExtractor,
};

/// Trait for turning recognized card text into form fields.
pub trait FieldParser {
    /// Parse fields from one recognition result.
    fn parse(&self, raw: &RawRecognitionResult) -> ExtractedFields;

    /// Parse fields from plain text with unknown confidence.
    fn parse_text(&self, text: &str) -> ExtractedFields {
        self.parse(&RawRecognitionResult::new(text, 0.0))
    }
}

/// Rule-based KTP parser.
///
/// Stateless: the same text always yields the same fields.
pub struct KtpFieldParser {
    unit_codes: UnitCodeExtractor,
}

impl KtpFieldParser {
    /// Create a parser with the default RT codes.
    pub fn new() -> Self {
        Self {
            unit_codes: UnitCodeExtractor::default(),
        }
    }

    /// Create a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_unit_codes(config.valid_unit_codes.iter().cloned())
    }

    /// Set the closed set of accepted RT codes.
    pub fn with_unit_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unit_codes = UnitCodeExtractor::new(codes);
        self
    }
}

impl Default for KtpFieldParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldParser for KtpFieldParser {
    fn parse(&self, raw: &RawRecognitionResult) -> ExtractedFields {
        let start = Instant::now();
        let text = raw.text.as_str();

        // The NIK check needs the birthdate; name and RT stand alone
        let birthdate = extract_birthdate(text);
        debug!("Birthdate hint: {:?}", birthdate);

        let id_number = NikExtractor::new()
            .with_birthdate(birthdate)
            .extract(text)
            .unwrap_or_default();
        let name = NameExtractor::new().extract(text).unwrap_or_default();
        let unit_code = self.unit_codes.extract(text).unwrap_or_default();

        let fields = ExtractedFields {
            name,
            id_number,
            unit_code,
            confidence: raw.confidence,
            raw_text: raw.text.clone(),
        };

        debug!(
            nik = %fields.id_number,
            name = %fields.name,
            rt = %fields.unit_code,
            "Final fields"
        );
        info!(
            "Extracted {:?} in {}us",
            fields.found_fields(),
            start.elapsed().as_micros()
        );

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"PROVINSI JAWA BARAT
KABUPATEN BOGOR
NIK : 3201O6150989OOO1
Nama : BUDI SANTOSO
Tempat/Tgl Lahir : BOGOR, 06-09-1989
Jenis Kelamin : LAKI-LAKI   Gol. Darah : O
Alamat : JL MAWAR NO 5
RT/RW : 002/005
Kel/Desa : SUKAMAJU
Kecamatan : CIBINONG
Agama : ISLAM
Berlaku Hingga : SEUMUR HIDUP
BOGOR
12-10-2015"#;

    #[test]
    fn test_parse_full_card() {
        let parser = KtpFieldParser::new();
        let fields = parser.parse(&RawRecognitionResult::new(SAMPLE, 87.5));

        assert_eq!(
            fields,
            ExtractedFields {
                name: "BUDI SANTOSO".to_string(),
                id_number: "3201060609890001".to_string(),
                unit_code: "02".to_string(),
                confidence: 87.5,
                raw_text: SAMPLE.to_string(),
            }
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = KtpFieldParser::new();
        let raw = RawRecognitionResult::new(SAMPLE, 60.0);

        assert_eq!(parser.parse(&raw), parser.parse(&raw));
    }

    #[test]
    fn test_partial_result() {
        let parser = KtpFieldParser::new();
        let fields = parser.parse_text("Nama : SITI AMINAH\nRT/RW : 009/001");

        assert_eq!(fields.name, "SITI AMINAH");
        assert_eq!(fields.id_number, "");
        assert_eq!(fields.unit_code, "");
    }

    #[test]
    fn test_configured_unit_codes() {
        let config = ExtractionConfig {
            valid_unit_codes: vec!["09".to_string()],
        };
        let parser = KtpFieldParser::from_config(&config);

        assert_eq!(parser.parse_text("RT/RW : 009/001").unit_code, "09");
    }
}
