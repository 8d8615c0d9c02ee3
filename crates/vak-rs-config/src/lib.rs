//! Configuration schema, validation, and loading for vak experiments.
//!
//! A parsed document becomes a [`RawConfigTree`], which [`validate`] checks
//! against a [`SchemaTable`] before decoding it into a typed [`VakConfig`].

mod error;
mod loader;
mod model;
mod raw;
pub mod schema;
mod validate;

/// Public error type returned by config loading and validation APIs.
pub use error::{ConfigError, ErrorKind};
/// Document formats accepted by the loader.
pub use loader::DocumentFormat;
/// Typed configuration models.
pub use model::*;
pub use raw::{RawConfigTree, RawSection, RawValue};
pub use schema::{SchemaTable, SectionSchema};
pub use validate::{CheckedSection, CheckedTree, OptionValue, check, validate};
