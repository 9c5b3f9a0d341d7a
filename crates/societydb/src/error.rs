use crate::model::{RecordId, Section};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocietyError {
    #[error("Record not found: {section}/{id}")]
    RecordNotFound { section: Section, id: RecordId },

    #[error("Record already active: {section}/{id}")]
    RecordExists { section: Section, id: RecordId },

    #[error("Invalid record id: {0:?}")]
    InvalidId(String),

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Unknown mode: {0} (expected demo or production)")]
    UnknownMode(String),

    #[error("Corrupt file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required fields for {section}: {}", missing.join(", "))]
    Validation {
        section: Section,
        missing: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl SocietyError {
    pub fn not_found(section: Section, id: &RecordId) -> Self {
        SocietyError::RecordNotFound {
            section,
            id: id.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SocietyError::RecordNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, SocietyError>;
