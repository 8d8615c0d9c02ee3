//! Error types for config loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading or validating config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a TOML document failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),
    /// Parsing a JSON5 document failed.
    #[error("failed to parse config: {0}")]
    Json5Failed(#[from] json5::Error),
    /// Decoding the checked tree into typed sections failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// The file extension does not name a supported document format.
    #[error("unsupported config format for {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
    /// A parsed document holds a value the raw tree cannot represent.
    #[error("unsupported value at {path}: {message}")]
    UnsupportedValue { path: String, message: String },
    /// Two sections that select alternative run modes are both present.
    #[error(
        "sections [{first}] and [{second}] are mutually exclusive; \
         a config file may define only one of them"
    )]
    MutuallyExclusiveSections { first: String, second: String },
    /// A section has no schema.
    #[error("unknown section [{section}]")]
    UnknownSection { section: String },
    /// An option is not declared by its section's schema.
    #[error("unknown option '{option}' in section [{section}]")]
    UnknownOption { section: String, option: String },
    /// Options declared as alternatives are both present.
    #[error("options '{first}' and '{second}' in section [{section}] are mutually exclusive")]
    MutuallyExclusiveOptions {
        section: String,
        first: String,
        second: String,
    },
    /// A required option is absent from a present section.
    #[error("missing required option '{option}' in section [{section}]")]
    MissingOption { section: String, option: String },
    /// An option's value cannot be coerced to its declared type.
    #[error(
        "invalid value for option '{option}' in section [{section}]: \
         expected {expected}, got {received}"
    )]
    InvalidOptionType {
        section: String,
        option: String,
        expected: String,
        received: String,
    },
    /// A command entry point was handed a config without its section.
    #[error("config does not define a [{section}] section")]
    MissingSection { section: String },
    /// A path option does not point at an existing directory.
    #[error("option '{option}' in section [{section}] is not a directory: {}", .path.display())]
    NotADirectory {
        section: String,
        option: String,
        path: PathBuf,
    },
}

/// Fieldless discriminant of [`ConfigError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Read,
    Parse,
    Decode,
    UnsupportedFormat,
    UnsupportedValue,
    MutuallyExclusiveSections,
    UnknownSection,
    UnknownOption,
    MutuallyExclusiveOptions,
    MissingOption,
    InvalidOptionType,
    MissingSection,
    NotADirectory,
}

impl ConfigError {
    /// Kind of failure, without the offending names.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::ReadFailed(_) => ErrorKind::Read,
            ConfigError::ParseFailed(_) | ConfigError::Json5Failed(_) => ErrorKind::Parse,
            ConfigError::DecodeFailed(_) => ErrorKind::Decode,
            ConfigError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ConfigError::UnsupportedValue { .. } => ErrorKind::UnsupportedValue,
            ConfigError::MutuallyExclusiveSections { .. } => ErrorKind::MutuallyExclusiveSections,
            ConfigError::UnknownSection { .. } => ErrorKind::UnknownSection,
            ConfigError::UnknownOption { .. } => ErrorKind::UnknownOption,
            ConfigError::MutuallyExclusiveOptions { .. } => ErrorKind::MutuallyExclusiveOptions,
            ConfigError::MissingOption { .. } => ErrorKind::MissingOption,
            ConfigError::InvalidOptionType { .. } => ErrorKind::InvalidOptionType,
            ConfigError::MissingSection { .. } => ErrorKind::MissingSection,
            ConfigError::NotADirectory { .. } => ErrorKind::NotADirectory,
        }
    }
}
