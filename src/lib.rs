//! Freeform spec to structured requirement list conversion
//!
//! A freeform spec describes one requirement with `**Criticality**` and
//! `**Failure Mode**` headlines and `## Specification` / `## Validation`
//! sections. Conversion turns it into YAML front matter plus a normalized
//! `## Requirements` list.

pub mod domain;
pub use domain::{
    Config, ConvertError, Criticality, DocumentModel, RequirementId, RequirementIdError,
};

pub mod markdown;
pub use markdown::{FrontMatter, Value};

/// Reading, converting and writing spec files.
pub mod storage;
pub use storage::{FileError, Outcome, Summary};

/// Converts a document to the structured requirement list dialect.
///
/// # Errors
///
/// Returns an error if the document has no title, or has neither
/// specification text nor validation items.
pub fn convert(text: &str) -> Result<String, ConvertError> {
    DocumentModel::parse(text).map(|document| document.to_msl())
}
