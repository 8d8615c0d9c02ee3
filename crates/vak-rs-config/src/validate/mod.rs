//! Validation of a raw config tree against a schema table.
//!
//! Checks run in a fixed order so one document yields one error:
//! section exclusivity, unknown sections, per-section presence (unknown
//! options, option groups, required options), then value coercion.

mod coerce;


use crate::raw::{RawConfigTree, RawSection, RawValue};
use crate::schema::{Presence, SchemaTable, SectionSchema};
use crate::{ConfigError, VakConfig};
use log::debug;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A single option value after coercion to its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Strings, paths and choices.
    Text(String),
    Count(u64),
    Float(f64),
    Boolean(bool),
    Floats(Vec<f64>),
    Names(Vec<String>),
    Labelset(BTreeSet<String>),
    /// Options of open sections, kept as written.
    Raw(RawValue),
}

impl OptionValue {
    fn to_json(&self) -> Result<Value, ConfigError> {
        let value = match self {
            OptionValue::Text(text) => Value::from(text.as_str()),
            OptionValue::Count(n) => Value::from(*n),
            OptionValue::Float(x) => Value::from(*x),
            OptionValue::Boolean(b) => Value::from(*b),
            OptionValue::Floats(values) => Value::from(values.clone()),
            OptionValue::Names(names) => Value::from(names.clone()),
            OptionValue::Labelset(labels) => {
                Value::Array(labels.iter().map(|label| Value::from(label.as_str())).collect())
            }
            OptionValue::Raw(raw) => serde_json::to_value(raw)?,
        };
        Ok(value)
    }
}

/// Coerced options of one section, with defaults filled in.
pub type CheckedSection = BTreeMap<String, OptionValue>;

/// A tree that passed every schema check.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckedTree {
    sections: BTreeMap<String, CheckedSection>,
}

impl CheckedTree {
    pub fn section(&self, name: &str) -> Option<&CheckedSection> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// JSON view used for typed decoding.
    ///
    /// Dotted sections (`TweetyNet.optimizer`) are grouped under a `models`
    /// object keyed by model name.
    pub(crate) fn to_json(&self) -> Result<Value, ConfigError> {
        let mut root = Map::new();
        let mut models = Map::new();
        for (name, section) in &self.sections {
            let mut object = Map::new();
            for (option, value) in section {
                object.insert(option.clone(), value.to_json()?);
            }
            match name.split_once('.') {
                Some((model, sub)) => {
                    let entry = models
                        .entry(model.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(model_map) = entry {
                        model_map.insert(sub.to_string(), Value::Object(object));
                    }
                }
                None => {
                    root.insert(name.clone(), Value::Object(object));
                }
            }
        }
        root.insert("models".to_string(), Value::Object(models));
        Ok(Value::Object(root))
    }
}

/// Validate a tree and build the typed config.
///
/// Pure: no I/O, and failure never yields a partial config. With a custom
/// table, any section `VakConfig` has no field for fails as `UnknownSection`;
/// use [`check`] to validate against such tables.
pub fn validate(tree: &RawConfigTree, schemas: &SchemaTable) -> Result<VakConfig, ConfigError> {
    let checked = check(tree, schemas)?;
    VakConfig::from_checked(&checked)
}

/// Run every schema check and coerce option values.
pub fn check(tree: &RawConfigTree, schemas: &SchemaTable) -> Result<CheckedTree, ConfigError> {
    debug!("validating config tree (sections={})", tree.len());

    for (first, second) in schemas.exclusive_pairs() {
        if tree.contains_section(first) && tree.contains_section(second) {
            debug!("mutually exclusive sections present ({first}, {second})");
            return Err(ConfigError::MutuallyExclusiveSections {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
    }

    let mut matched: Vec<(&str, &RawSection, &SectionSchema)> = Vec::with_capacity(tree.len());
    for (name, section) in tree.sections() {
        let Some(schema) = schemas.get(name) else {
            return Err(ConfigError::UnknownSection {
                section: name.to_string(),
            });
        };
        matched.push((name, section, schema));
    }

    for (name, section, schema) in &matched {
        check_presence(name, section, schema)?;
    }

    let mut sections = BTreeMap::new();
    for (name, section, schema) in &matched {
        sections.insert(name.to_string(), coerce_section(name, section, schema)?);
    }

    debug!("config tree valid (sections={})", sections.len());
    Ok(CheckedTree { sections })
}

/// Reject unknown options and enforce option groups and required options.
fn check_presence(
    name: &str,
    section: &RawSection,
    schema: &SectionSchema,
) -> Result<(), ConfigError> {
    if schema.open {
        return Ok(());
    }

    for option in section.keys() {
        if schema.option(option).is_none() {
            return Err(ConfigError::UnknownOption {
                section: name.to_string(),
                option: option.clone(),
            });
        }
    }

    for group in &schema.one_of {
        let present: Vec<&str> = group
            .iter()
            .copied()
            .filter(|option| section.contains_key(*option))
            .collect();
        match present.as_slice() {
            [] => {
                return Err(ConfigError::MissingOption {
                    section: name.to_string(),
                    option: group.join(" or "),
                });
            }
            [_] => {}
            [first, second, ..] => {
                return Err(ConfigError::MutuallyExclusiveOptions {
                    section: name.to_string(),
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }

    for spec in &schema.options {
        if spec.presence == Presence::Required && !section.contains_key(spec.name) {
            return Err(ConfigError::MissingOption {
                section: name.to_string(),
                option: spec.name.to_string(),
            });
        }
    }
    Ok(())
}

/// Coerce present options and fill defaults for absent ones.
fn coerce_section(
    name: &str,
    section: &RawSection,
    schema: &SectionSchema,
) -> Result<CheckedSection, ConfigError> {
    let mut checked = CheckedSection::new();
    if schema.open {
        for (option, value) in section {
            if !coerce::is_finite(value) {
                return Err(ConfigError::InvalidOptionType {
                    section: name.to_string(),
                    option: option.clone(),
                    expected: "finite value".to_string(),
                    received: format!("{} {value}", value.type_name()),
                });
            }
            checked.insert(option.clone(), OptionValue::Raw(value.clone()));
        }
        return Ok(checked);
    }

    for spec in &schema.options {
        match (section.get(spec.name), &spec.presence) {
            (Some(value), _) => {
                let coerced = coerce::coerce(value, &spec.kind).ok_or_else(|| {
                    ConfigError::InvalidOptionType {
                        section: name.to_string(),
                        option: spec.name.to_string(),
                        expected: spec.kind.describe(),
                        received: format!("{} {value}", value.type_name()),
                    }
                })?;
                checked.insert(spec.name.to_string(), coerced);
            }
            (None, Presence::Default(default)) => {
                checked.insert(spec.name.to_string(), coerce::default_value(default));
            }
            (None, _) => {}
        }
    }
    Ok(checked)
}
