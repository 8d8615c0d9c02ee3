//! Section schemas: which sections exist, what options they take, and which
//! sections exclude each other.

mod table;

pub use table::{
    AUDIO_FORMATS, COMMAND_SECTIONS, KNOWN_MODELS, MODEL_SUBSECTIONS, SPECT_FORMATS,
    TRANSFORM_TYPES,
};

/// Declared type of an option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionKind {
    String,
    /// Non-empty string naming a file or directory.
    Path,
    /// Non-negative integer.
    Count,
    /// Finite number; integers widen.
    Float,
    Boolean,
    /// String restricted to a fixed set.
    Choice(&'static [&'static str]),
    /// Sequence of finite numbers, optionally of fixed length.
    FloatList { len: Option<usize> },
    /// A name or a sequence of names, each from a fixed set.
    Names(&'static [&'static str]),
    /// Label set given as a string of single-character labels, a
    /// `range:` string, or a sequence of labels.
    Labelset,
}

impl OptionKind {
    /// Human-readable description used as the "expected" part of errors.
    pub fn describe(&self) -> String {
        match self {
            OptionKind::String => "string".to_string(),
            OptionKind::Path => "non-empty path string".to_string(),
            OptionKind::Count => "non-negative integer".to_string(),
            OptionKind::Float => "finite number".to_string(),
            OptionKind::Boolean => "boolean".to_string(),
            OptionKind::Choice(choices) => format!("one of {}", quote_all(choices)),
            OptionKind::FloatList { len: Some(len) } => format!("list of {len} numbers"),
            OptionKind::FloatList { len: None } => "non-empty list of numbers".to_string(),
            OptionKind::Names(names) => {
                format!("name or list of names from {}", quote_all(names))
            }
            OptionKind::Labelset => {
                "labelset string, \"range:\" string, or list of labels".to_string()
            }
        }
    }
}

fn quote_all(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Value filled in when an optional option is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Count(u64),
    Float(f64),
    Boolean(bool),
    Str(&'static str),
}

/// Whether an option must appear, and what stands in for it when it doesn't.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    Default(DefaultValue),
}

/// Schema of a single option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    pub presence: Presence,
}

impl OptionSpec {
    pub const fn required(name: &'static str, kind: OptionKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: OptionKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
        }
    }

    pub const fn defaulted(name: &'static str, kind: OptionKind, default: DefaultValue) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Default(default),
        }
    }
}

/// Schema of a single section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSchema {
    pub name: String,
    pub options: Vec<OptionSpec>,
    /// Option groups of which exactly one member must be present.
    pub one_of: Vec<&'static [&'static str]>,
    /// Sections that may not appear alongside this one.
    pub exclusive_with: Vec<String>,
    /// Open sections accept any option and keep its raw value.
    pub open: bool,
}

impl SectionSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            one_of: Vec::new(),
            exclusive_with: Vec::new(),
            open: false,
        }
    }

    pub fn options(mut self, options: impl IntoIterator<Item = OptionSpec>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn one_of(mut self, group: &'static [&'static str]) -> Self {
        self.one_of.push(group);
        self
    }

    pub fn exclusive_with<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive_with
            .extend(sections.into_iter().map(Into::into));
        self
    }

    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.name == name)
    }
}

/// Table of every recognized section, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTable {
    sections: Vec<SectionSchema>,
}

impl SchemaTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Add a section, replacing any existing schema with the same name.
    pub fn with_section(mut self, schema: SectionSchema) -> Self {
        match self
            .sections
            .iter_mut()
            .find(|existing| existing.name == schema.name)
        {
            Some(existing) => *existing = schema,
            None => self.sections.push(schema),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&SectionSchema> {
        self.sections.iter().find(|schema| schema.name == name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionSchema> {
        self.sections.iter()
    }

    /// Unordered exclusivity pairs declared anywhere in the table.
    ///
    /// Pairs come out in declaration order, each once, with the declaring
    /// section first.
    pub fn exclusive_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        for schema in &self.sections {
            for other in &schema.exclusive_with {
                let (a, b) = (schema.name.as_str(), other.as_str());
                let seen = pairs
                    .iter()
                    .any(|&(x, y)| (x == a && y == b) || (x == b && y == a));
                if !seen && a != b {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }
}

impl Default for SchemaTable {
    fn default() -> Self {
        Self::vak()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exclusive_pairs_are_deduplicated() {
        let table = SchemaTable::empty()
            .with_section(SectionSchema::new("A").exclusive_with(["B", "C"]))
            .with_section(SectionSchema::new("B").exclusive_with(["A"]))
            .with_section(SectionSchema::new("C").exclusive_with(["A", "C"]));
        assert_eq!(table.exclusive_pairs(), vec![("A", "B"), ("A", "C")]);
    }

    #[test]
    fn with_section_replaces_by_name() {
        let table = SchemaTable::empty()
            .with_section(SectionSchema::new("A"))
            .with_section(SectionSchema::new("A").open());
        assert_eq!(table.sections().count(), 1);
        assert!(table.get("A").is_some_and(|schema| schema.open));
    }

    #[test]
    fn vak_table_covers_fixture_sections() {
        let table = SchemaTable::vak();
        for name in [
            "PREP",
            "SPECT_PARAMS",
            "DATALOADER",
            "TRAIN",
            "LEARNCURVE",
            "EVAL",
            "PREDICT",
            "TweetyNet.optimizer",
            "TeenyTweetyNet.network",
        ] {
            assert!(table.get(name).is_some(), "missing schema for {name}");
        }
        assert!(table.get("TweetyNet").is_none());
    }

    #[test]
    fn vak_command_sections_exclude_each_other() {
        let table = SchemaTable::vak();
        let pairs = table.exclusive_pairs();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], ("TRAIN", "LEARNCURVE"));
    }

    #[test]
    fn describe_choice_lists_values() {
        assert_eq!(
            OptionKind::Choice(&["cbin", "wav"]).describe(),
            "one of \"cbin\", \"wav\""
        );
    }
}
