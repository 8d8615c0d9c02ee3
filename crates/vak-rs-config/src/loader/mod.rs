//! Loading config documents from text or disk.
//!
//! Parses a document into a [`RawConfigTree`], then validates it against the
//! built-in schema table to produce a [`VakConfig`].


use crate::{ConfigError, RawConfigTree, SchemaTable, VakConfig};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Text formats a config document may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    /// JSON5, which also accepts plain JSON.
    Json5,
}

impl DocumentFormat {
    /// Pick a format from a file extension (`.toml`, `.json5`, `.json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(DocumentFormat::Toml),
            "json5" | "json" => Some(DocumentFormat::Json5),
            _ => None,
        }
    }
}

impl RawConfigTree {
    /// Parse a document in the given format.
    pub fn parse(contents: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Toml => Self::from_toml_str(contents),
            DocumentFormat::Json5 => Self::from_json5_str(contents),
        }
    }

    /// Read and parse a document, choosing the format from its extension.
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path).ok_or_else(|| {
            ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
        })?;
        debug!(
            "reading config document (path={}, format={:?})",
            path.display(),
            format
        );
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents, format)
    }
}

impl VakConfig {
    /// Load and validate a config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        let tree = RawConfigTree::read_from_path(path)?;
        let config = crate::validate(&tree, &SchemaTable::vak())?;
        info!(
            "config loaded (path={}, sections={})",
            path.display(),
            tree.len()
        );
        Ok(config)
    }

    /// Load and validate config contents.
    pub fn load_from_str(contents: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        debug!(
            "loading config from raw contents (len={}, format={:?})",
            contents.len(),
            format
        );
        let tree = RawConfigTree::parse(contents, format)?;
        crate::validate(&tree, &SchemaTable::vak())
    }
}
