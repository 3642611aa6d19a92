//! Data models: recognition output, extracted fields, resident records, config.

pub mod config;
pub mod fields;
pub mod resident;
