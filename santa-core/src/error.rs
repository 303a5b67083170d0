//! Error types shared by the loader, renderer and batch runner.

use std::path::PathBuf;
use thiserror::Error;

use crate::templates::TemplateError;

pub type Result<T> = std::result::Result<T, SantaError>;

#[derive(Debug, Error)]
pub enum SantaError {
    #[error("Cannot read or write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image format: {} (expected png, jpg, jpeg, gif, webp or svg)", path.display())]
    UnsupportedImage { path: PathBuf },

    #[error("Invalid template: {0}")]
    Template(#[from] TemplateError),

    #[error("Template is missing required slots: {}", slots.join(", "))]
    MissingSlots { slots: Vec<String> },

    #[error("Template contains unknown slots: {}", slots.join(", "))]
    UnknownSlots { slots: Vec<String> },

    #[error("Record '{record}' is missing required fields: {}", fields.join(", "))]
    MissingFields { record: String, fields: Vec<String> },

    #[error("Record '{record}' has an invalid filename: {filename:?}")]
    InvalidFilename { record: String, filename: String },

    #[error("Record '{record}' reuses filename {filename:?} from an earlier record")]
    DuplicateFilename { record: String, filename: String },

    #[error("Invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid data URI: {0}")]
    DataUri(String),

    #[error("{} of {total} certificates failed", failures.len())]
    Batch {
        total: usize,
        failures: Vec<SantaError>,
    },
}

impl SantaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by record data or the template contract,
    /// as opposed to environment problems (files, directories, config).
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Template(_)
            | Self::MissingSlots { .. }
            | Self::UnknownSlots { .. }
            | Self::MissingFields { .. }
            | Self::InvalidFilename { .. }
            | Self::DuplicateFilename { .. } => true,
            Self::Batch { failures, .. } => failures.iter().all(SantaError::is_validation),
            _ => false,
        }
    }
}
