//! Resident records and the rules around creating them.
//!
//! Storage lives elsewhere; this module holds the request/response shapes and
//! the checks applied before a record is handed to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::models::fields::ExtractedFields;

/// Stored in place of a NIK the operator left blank.
pub const NIK_PLACEHOLDER: &str = "-";

/// Photo extensions accepted for upload.
pub const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Editable registration form for one photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentDraft {
    pub name: String,
    pub nik: String,
    pub unit_code: String,
}

impl ResidentDraft {
    /// Pre-fill from a scan. Only non-empty extracted values replace what the
    /// operator already typed.
    pub fn apply_scan(&mut self, fields: &ExtractedFields) {
        if !fields.name.is_empty() {
            self.name = fields.name.clone();
        }
        if !fields.id_number.is_empty() {
            self.nik = fields.id_number.clone();
        }
        if !fields.unit_code.is_empty() {
            self.unit_code = fields.unit_code.clone();
        }
    }

    /// Turn the reviewed form into a create request.
    pub fn into_new_resident(self, photo_url: impl Into<String>) -> NewResident {
        NewResident {
            name: self.name,
            nik: Some(self.nik).filter(|n| !n.trim().is_empty()),
            unit_code: self.unit_code,
            photo_url: photo_url.into(),
        }
    }
}

/// Request to create a resident record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResident {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nik: Option<String>,
    pub unit_code: String,
    pub photo_url: String,
}

impl NewResident {
    /// Check required fields and the RT code against the closed set.
    pub fn validate(&self, valid_codes: &[String]) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::MissingField("name"));
        }
        if self.unit_code.trim().is_empty() {
            return Err(RecordError::MissingField("unit_code"));
        }
        if self.photo_url.trim().is_empty() {
            return Err(RecordError::MissingField("photo_url"));
        }
        if !valid_codes.contains(&self.unit_code) {
            return Err(RecordError::InvalidUnitCode {
                code: self.unit_code.clone(),
                allowed: valid_codes.join(", "),
            });
        }
        Ok(())
    }
}

/// A stored resident record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub id: String,
    pub name: String,
    pub nik: String,
    pub unit_code: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}

impl Resident {
    /// Build the record to store.
    ///
    /// `existing_names` are names already stored that start with the new
    /// name; a duplicate gets a ` (n)` suffix.
    pub fn create(
        new: NewResident,
        existing_names: &[String],
        valid_codes: &[String],
        now: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        new.validate(valid_codes)?;

        let name = next_available_name(new.name.trim(), existing_names);
        Ok(Self {
            id: now.timestamp_millis().to_string(),
            name,
            nik: new.nik.unwrap_or_else(|| NIK_PLACEHOLDER.to_string()),
            unit_code: new.unit_code,
            photo_url: new.photo_url,
            created_at: now,
        })
    }

    /// Case-insensitive name search; a blank query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Pick a free display name: `NAME`, then `NAME (1)`, `NAME (2)`...
pub fn next_available_name(base: &str, existing: &[String]) -> String {
    let base_lower = base.to_lowercase();

    let taken: Vec<u32> = existing
        .iter()
        .filter_map(|name| duplicate_number(&name.to_lowercase(), &base_lower))
        .collect();

    match taken.iter().max() {
        None => base.to_string(),
        Some(max) => format!("{} ({})", base, max.saturating_add(1)),
    }
}

/// `Some(0)` for an exact duplicate, `Some(n)` for `base (n)`.
fn duplicate_number(candidate: &str, base: &str) -> Option<u32> {
    let rest = candidate.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(0);
    }

    let number = rest.strip_prefix(" (")?.strip_suffix(')')?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    number.parse().ok()
}

/// Storage key for an uploaded photo: `rt{code}/{timestamp}-{filename}`.
pub fn photo_storage_path(
    unit_code: &str,
    timestamp_ms: i64,
    filename: &str,
    valid_codes: &[String],
) -> Result<String, RecordError> {
    if !valid_codes.iter().any(|c| c == unit_code) {
        return Err(RecordError::InvalidUnitCode {
            code: unit_code.to_string(),
            allowed: valid_codes.join(", "),
        });
    }
    photo_content_type(filename)?;

    Ok(format!("rt{}/{}-{}", unit_code, timestamp_ms, filename))
}

/// MIME type for an accepted photo file name.
pub fn photo_content_type(filename: &str) -> Result<&'static str, RecordError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        _ => Err(RecordError::UnsupportedPhotoType(filename.to_string())),
    }
}

/// Gate for deleting a record.
pub fn authorize_delete(pin: &str, expected: &str) -> Result<(), RecordError> {
    if expected.is_empty() || pin != expected {
        return Err(RecordError::InvalidPin);
    }
    Ok(())
}
