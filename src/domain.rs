//! Domain models for requirement documents.
//!
//! This module contains the document model produced by parsing, the
//! criticality and requirement identifier types it is built from, and the
//! configuration used for directory conversion.

mod config;
pub use config::{Config, ConfigError, DEFAULT_FILE_NAME as DEFAULT_CONFIG_FILE_NAME};

mod criticality;
pub use criticality::{Criticality, UnknownCriticality};

/// The document model and its builder.
pub mod document;
pub use document::{ConvertError, DocumentModel};

/// Requirement identifier (`REQ-<digits>`) types and parsing.
pub mod requirement_id;
pub use requirement_id::{Error as RequirementIdError, RequirementId};
