//! Run configuration: input paths, output directory and failure policy.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SantaError};

/// What to do when one record fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Render everything in memory first; write nothing if any record fails.
    #[default]
    Abort,
    /// Write each certificate independently and report failures at the end.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    pub template: PathBuf,
    pub tree_image: PathBuf,
    pub seal_image: PathBuf,
    pub output_dir: PathBuf,
    /// JSON records file. The built-in list is used when unset.
    pub records: Option<PathBuf>,
    pub failure_policy: FailurePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("templates/certificate.html"),
            tree_image: PathBuf::from("assets/tree.png"),
            seal_image: PathBuf::from("assets/wax_seal_small.jpg"),
            output_dir: PathBuf::from("build"),
            records: None,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl RunConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SantaError::io(path, e))?;
        serde_json::from_str(&content).map_err(|source| SantaError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Explicit file if given, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}
