//! Label vocabulary and regex patterns for KTP extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Marker printed in the gender field of a woman's card.
pub const FEMALE_MARKER: &str = "PEREMPUAN";

/// Markers printed in the gender field of a man's card.
pub const MALE_MARKERS: [&str; 2] = ["LAKI-LAKI", "LAKI LAKI"];

/// Label in front of the ID number.
pub const NIK_LABEL: &str = "NIK";

/// Label in front of the holder name.
pub const NAME_LABEL: &str = "NAMA";

/// Labels that contain [`NAME_LABEL`] but are not the holder name.
pub const NAME_FALSE_POSITIVES: [&str; 1] = ["KECAMATAN"];

/// Labels that relate to the neighborhood unit line.
pub const UNIT_LABELS: [&str; 2] = ["RT", "RW"];

lazy_static! {
    // Digit classes are ASCII only

    // Dates: DD-MM-YYYY / DD/MM/YY
    pub static ref DATE_DMY_LONG: Regex = Regex::new(
        r"([0-9]{1,2})[-/]([0-9]{1,2})[-/]([0-9]{4})"
    ).unwrap();

    pub static ref DATE_DMY_SHORT: Regex = Regex::new(
        r"([0-9]{1,2})[-/]([0-9]{1,2})[-/]([0-9]{2})\b"
    ).unwrap();

    // Everything up to and including the last NIK label
    pub static ref NIK_PREFIX: Regex = Regex::new(
        r"(?i).*NIK\s*[:\s]*"
    ).unwrap();

    // Name on the label line: "Nama : BUDI SANTOSO"
    pub static ref NAME_SAME_LINE: Regex = Regex::new(
        r"(?i)NAMA\s*[:.\s]+([A-Z\s.']+)"
    ).unwrap();

    pub static ref NAME_DISALLOWED: Regex = Regex::new(
        r"[^A-Za-z\s.']"
    ).unwrap();

    // A line starting with one of these is another field, never a name
    pub static ref OTHER_FIELD_LABEL: Regex = Regex::new(
        r"(?i)^(tempat|lahir|jenis|gol|alamat|rt|rw|kel|desa|kec|agama|status|pekerjaan|kewarganegaraan|berlaku|nik)"
    ).unwrap();

    // RT patterns, most specific first
    pub static ref RT_COMBINED_LABEL: Regex = Regex::new(
        r"(?i)RTRW\s*[:.\s]*0*([0-9]{1,2})"
    ).unwrap();

    pub static ref RT_BEFORE_SLASH: Regex = Regex::new(
        r"(?i)RT\s*[.:\s]*0*([0-9]{1,2})\s*[/\\]"
    ).unwrap();

    pub static ref RT_SLASH_RW: Regex = Regex::new(
        r"(?i)RT\s*[/\\]\s*RW\s*[.:\s]*0*([0-9]{1,2})\s*[/\\]"
    ).unwrap();

    pub static ref RT_LOOSE: Regex = Regex::new(
        r"(?i)\bRT\s*[.:\s]*0*([0-9]{1,2})(?:\s|$|[/\\])"
    ).unwrap();

    // "002/005" style pair on an address line
    pub static ref RT_RW_PAIR: Regex = Regex::new(
        r"\b0*([0-9]{1,2})\s*[/\\:]\s*0*[0-9]{1,3}\b"
    ).unwrap();
}
