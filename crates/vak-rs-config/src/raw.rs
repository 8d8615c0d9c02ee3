//! Generic key-value tree produced by a document parser, prior to validation.
//!
//! Sections map option names to scalar-or-sequence values. Nested tables in
//! the source document become dotted section names, so `[TweetyNet.optimizer]`
//! is stored as the section `TweetyNet.optimizer`.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A single option value as it appeared in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Sequence(Vec<RawValue>),
}

impl RawValue {
    /// Short name of the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::String(_) => "string",
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Boolean(_) => "boolean",
            RawValue::Sequence(_) => "sequence",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(value) => write!(f, "{value:?}"),
            RawValue::Integer(value) => write!(f, "{value}"),
            RawValue::Float(value) => write!(f, "{value:?}"),
            RawValue::Boolean(value) => write!(f, "{value}"),
            RawValue::Sequence(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Boolean(value)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(values: Vec<T>) -> Self {
        RawValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

/// Options of a single section, keyed by option name.
pub type RawSection = BTreeMap<String, RawValue>;

/// Parsed document: section name to options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfigTree {
    sections: BTreeMap<String, RawSection>,
}

impl RawConfigTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text into a tree.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = contents.parse()?;
        Self::from_toml_table(table)
    }

    /// Build a tree from an already-parsed TOML table.
    pub fn from_toml_table(table: toml::Table) -> Result<Self, ConfigError> {
        let mut tree = Self::new();
        for (name, value) in table {
            match value {
                toml::Value::Table(section) => tree.flatten_toml(&name, section)?,
                _ => return Err(option_outside_section(&name)),
            }
        }
        Ok(tree)
    }

    /// Parse JSON5 (or plain JSON) text into a tree.
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        let value: JsonValue = json5::from_str(contents)?;
        Self::from_json_value(value)
    }

    /// Build a tree from an already-parsed JSON value; the root must be an object.
    pub fn from_json_value(value: JsonValue) -> Result<Self, ConfigError> {
        let JsonValue::Object(root) = value else {
            return Err(ConfigError::UnsupportedValue {
                path: "root".to_string(),
                message: "expected object".to_string(),
            });
        };
        let mut tree = Self::new();
        for (name, value) in root {
            match value {
                JsonValue::Object(section) => tree.flatten_json(&name, section)?,
                _ => return Err(option_outside_section(&name)),
            }
        }
        Ok(tree)
    }

    /// Insert an option, creating its section if needed.
    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<RawValue>,
    ) -> &mut Self {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), value.into());
        self
    }

    /// Insert or replace a whole section.
    pub fn insert_section(&mut self, name: impl Into<String>, section: RawSection) {
        self.sections.insert(name.into(), section);
    }

    /// Remove a section, returning its options.
    pub fn remove_section(&mut self, name: &str) -> Option<RawSection> {
        self.sections.remove(name)
    }

    /// Remove a single option from a section.
    pub fn remove_option(&mut self, section: &str, option: &str) -> Option<RawValue> {
        self.sections.get_mut(section)?.remove(option)
    }

    /// Options of one section.
    pub fn section(&self, name: &str) -> Option<&RawSection> {
        self.sections.get(name)
    }

    /// Whether the section is present.
    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Section names in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Sections in sorted name order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &RawSection)> {
        self.sections
            .iter()
            .map(|(name, section)| (name.as_str(), section))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when the tree has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Store scalar entries of `table` under `path`, recursing into sub-tables.
    ///
    /// A table holding only sub-tables does not become a section itself.
    fn flatten_toml(&mut self, path: &str, table: toml::Table) -> Result<(), ConfigError> {
        let mut options = RawSection::new();
        let mut has_subsections = false;
        for (key, value) in table {
            match value {
                toml::Value::Table(sub) => {
                    has_subsections = true;
                    self.flatten_toml(&join_path(path, &key), sub)?;
                }
                value => {
                    let raw = raw_from_toml(value, &join_path(path, &key))?;
                    options.insert(key, raw);
                }
            }
        }
        if !options.is_empty() || !has_subsections {
            self.sections.insert(path.to_string(), options);
        }
        Ok(())
    }

    fn flatten_json(
        &mut self,
        path: &str,
        object: serde_json::Map<String, JsonValue>,
    ) -> Result<(), ConfigError> {
        let mut options = RawSection::new();
        let mut has_subsections = false;
        for (key, value) in object {
            match value {
                JsonValue::Object(sub) => {
                    has_subsections = true;
                    self.flatten_json(&join_path(path, &key), sub)?;
                }
                value => {
                    let raw = raw_from_json(value, &join_path(path, &key))?;
                    options.insert(key, raw);
                }
            }
        }
        if !options.is_empty() || !has_subsections {
            self.sections.insert(path.to_string(), options);
        }
        Ok(())
    }
}

fn raw_from_toml(value: toml::Value, path: &str) -> Result<RawValue, ConfigError> {
    match value {
        toml::Value::String(value) => Ok(RawValue::String(value)),
        toml::Value::Integer(value) => Ok(RawValue::Integer(value)),
        toml::Value::Float(value) => Ok(RawValue::Float(value)),
        toml::Value::Boolean(value) => Ok(RawValue::Boolean(value)),
        toml::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| raw_from_toml(item, &format!("{path}[{idx}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(RawValue::Sequence),
        toml::Value::Datetime(_) => Err(unsupported(path, "datetimes are not supported")),
        toml::Value::Table(_) => Err(unsupported(path, "tables are not allowed here")),
    }
}

fn raw_from_json(value: JsonValue, path: &str) -> Result<RawValue, ConfigError> {
    match value {
        JsonValue::String(value) => Ok(RawValue::String(value)),
        JsonValue::Bool(value) => Ok(RawValue::Boolean(value)),
        JsonValue::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(RawValue::Integer(value))
            } else if number.is_u64() {
                Err(unsupported(path, "integer out of range"))
            } else {
                number
                    .as_f64()
                    .map(RawValue::Float)
                    .ok_or_else(|| unsupported(path, "expected number"))
            }
        }
        JsonValue::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| raw_from_json(item, &format!("{path}[{idx}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(RawValue::Sequence),
        JsonValue::Null => Err(unsupported(path, "null is not supported")),
        JsonValue::Object(_) => Err(unsupported(path, "objects are not allowed here")),
    }
}

/// Join nested table names into a dotted section name.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn option_outside_section(name: &str) -> ConfigError {
    unsupported(name, "options must belong to a section")
}

fn unsupported(path: &str, message: &str) -> ConfigError {
    ConfigError::UnsupportedValue {
        path: path.to_string(),
        message: message.to_string(),
    }
}
