//! Coercion of raw option values into their declared kinds.

use super::OptionValue;
use crate::raw::RawValue;
use crate::schema::{DefaultValue, OptionKind};
use std::collections::BTreeSet;

/// Prefix marking a labelset string as a list of integer ranges.
const RANGE_PREFIX: &str = "range:";

/// Upper bound on the labels a range string may expand to.
const MAX_RANGE_LABELS: u64 = 10_000;

/// Coerce a raw value, returning `None` when it does not fit `kind`.
pub(super) fn coerce(value: &RawValue, kind: &OptionKind) -> Option<OptionValue> {
    match kind {
        OptionKind::String => expect_str(value).map(|s| OptionValue::Text(s.to_string())),
        OptionKind::Path => expect_str(value)
            .filter(|s| !s.trim().is_empty())
            .map(|s| OptionValue::Text(s.to_string())),
        OptionKind::Count => match value {
            RawValue::Integer(n) => u64::try_from(*n).ok().map(OptionValue::Count),
            _ => None,
        },
        OptionKind::Float => expect_f64(value).map(OptionValue::Float),
        OptionKind::Boolean => match value {
            RawValue::Boolean(b) => Some(OptionValue::Boolean(*b)),
            _ => None,
        },
        OptionKind::Choice(choices) => expect_str(value)
            .filter(|s| choices.iter().any(|choice| choice == s))
            .map(|s| OptionValue::Text(s.to_string())),
        OptionKind::FloatList { len } => {
            let RawValue::Sequence(items) = value else {
                return None;
            };
            let floats = items.iter().map(expect_f64).collect::<Option<Vec<_>>>()?;
            match len {
                Some(len) if floats.len() != *len => None,
                None if floats.is_empty() => None,
                _ => Some(OptionValue::Floats(floats)),
            }
        }
        OptionKind::Names(allowed) => {
            let names = match value {
                RawValue::String(name) => vec![name.clone()],
                RawValue::Sequence(items) => items
                    .iter()
                    .map(|item| expect_str(item).map(str::to_string))
                    .collect::<Option<Vec<_>>>()?,
                _ => return None,
            };
            let known = |name: &String| allowed.iter().any(|allowed| *allowed == name.as_str());
            if names.is_empty() || !names.iter().all(known) {
                return None;
            }
            Some(OptionValue::Names(names))
        }
        OptionKind::Labelset => coerce_labelset(value).map(OptionValue::Labelset),
    }
}

/// Materialize a schema default.
pub(super) fn default_value(default: &DefaultValue) -> OptionValue {
    match default {
        DefaultValue::Count(n) => OptionValue::Count(*n),
        DefaultValue::Float(x) => OptionValue::Float(*x),
        DefaultValue::Boolean(b) => OptionValue::Boolean(*b),
        DefaultValue::Str(s) => OptionValue::Text(s.to_string()),
    }
}

/// Whether every float in a value, including nested ones, is finite.
pub(super) fn is_finite(value: &RawValue) -> bool {
    match value {
        RawValue::Float(x) => x.is_finite(),
        RawValue::Sequence(items) => items.iter().all(is_finite),
        _ => true,
    }
}

fn expect_str(value: &RawValue) -> Option<&str> {
    match value {
        RawValue::String(s) => Some(s.as_str()),
        _ => None,
    }
}

fn expect_f64(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Integer(n) => Some(*n as f64),
        RawValue::Float(x) if x.is_finite() => Some(*x),
        _ => None,
    }
}

/// Convert a labelset option into a sorted set of labels.
///
/// `"iabc"` yields one label per character, `"range: 1-3, 12"` yields
/// `1, 2, 3, 12`, and a sequence yields the string form of each element.
fn coerce_labelset(value: &RawValue) -> Option<BTreeSet<String>> {
    let labels: BTreeSet<String> = match value {
        RawValue::String(s) => match s.strip_prefix(RANGE_PREFIX) {
            Some(ranges) => parse_range_str(ranges)?,
            None => s.chars().map(String::from).collect(),
        },
        RawValue::Sequence(items) => items
            .iter()
            .map(|item| match item {
                RawValue::String(s) if !s.is_empty() => Some(s.clone()),
                RawValue::Integer(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Option<_>>()?,
        _ => return None,
    };
    (!labels.is_empty()).then_some(labels)
}

/// Parse comma-separated integers and inclusive `a-b` ranges.
fn parse_range_str(ranges: &str) -> Option<BTreeSet<String>> {
    let mut labels = BTreeSet::new();
    for part in ranges.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((start, end)) => {
                let start: u64 = start.trim().parse().ok()?;
                let end: u64 = end.trim().parse().ok()?;
                let remaining = MAX_RANGE_LABELS.saturating_sub(labels.len() as u64);
                if start > end || end - start >= remaining {
                    return None;
                }
                labels.extend((start..=end).map(|n| n.to_string()));
            }
            None => {
                let n: u64 = part.parse().ok()?;
                labels.insert(n.to_string());
            }
        }
    }
    Some(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn count_rejects_negative_and_float() {
        assert_eq!(
            coerce(&RawValue::Integer(11), &OptionKind::Count),
            Some(OptionValue::Count(11))
        );
        assert_eq!(coerce(&RawValue::Integer(-1), &OptionKind::Count), None);
        assert_eq!(coerce(&RawValue::Float(11.0), &OptionKind::Count), None);
    }

    #[test]
    fn float_widens_integers_and_rejects_nan() {
        assert_eq!(
            coerce(&RawValue::Integer(50), &OptionKind::Float),
            Some(OptionValue::Float(50.0))
        );
        assert_eq!(coerce(&RawValue::Float(f64::NAN), &OptionKind::Float), None);
        assert_eq!(coerce(&"50".into(), &OptionKind::Float), None);
    }

    #[test]
    fn names_accept_single_string() {
        let kind = OptionKind::Names(&["TweetyNet"]);
        assert_eq!(
            coerce(&"TweetyNet".into(), &kind),
            Some(OptionValue::Names(vec!["TweetyNet".to_string()]))
        );
        assert_eq!(coerce(&"Unet".into(), &kind), None);
        assert_eq!(coerce(&RawValue::Sequence(Vec::new()), &kind), None);
    }

    #[test]
    fn fixed_length_float_list() {
        let kind = OptionKind::FloatList { len: Some(2) };
        assert_eq!(
            coerce(&vec![500_i64, 10000].into(), &kind),
            Some(OptionValue::Floats(vec![500.0, 10000.0]))
        );
        assert_eq!(coerce(&vec![500_i64].into(), &kind), None);
    }

    #[test]
    fn choice_is_case_sensitive() {
        let kind = OptionKind::Choice(&["cbin", "wav"]);
        assert!(coerce(&"cbin".into(), &kind).is_some());
        assert!(coerce(&"CBIN".into(), &kind).is_none());
    }

    #[test]
    fn path_rejects_blank() {
        assert!(coerce(&"  ".into(), &OptionKind::Path).is_none());
        assert!(coerce(&"./data".into(), &OptionKind::Path).is_some());
    }

    #[test]
    fn labelset_from_string_splits_characters() {
        assert_eq!(
            coerce_labelset(&"iabcdefghjk".into()),
            Some(labels(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]))
        );
    }

    #[test]
    fn labelset_digits_stay_characters() {
        assert_eq!(
            coerce_labelset(&"01234567".into()),
            Some(labels(&["0", "1", "2", "3", "4", "5", "6", "7"]))
        );
    }

    #[test]
    fn labelset_from_range_string() {
        assert_eq!(
            coerce_labelset(&"range: 1-3, 12".into()),
            Some(labels(&["1", "2", "3", "12"]))
        );
        assert_eq!(coerce_labelset(&"range: 3-1".into()), None);
        assert_eq!(coerce_labelset(&"range: a-b".into()), None);
    }

    #[test]
    fn labelset_range_is_bounded() {
        assert_eq!(coerce_labelset(&"range: 0-50000000".into()), None);
        assert_eq!(coerce_labelset(&"range: 0-5000, 6000-11000".into()), None);
        let labels = coerce_labelset(&"range: 1-10000".into()).expect("labels");
        assert_eq!(labels.len(), 10_000);
    }

    #[test]
    fn non_finite_floats_are_detected() {
        assert!(is_finite(&RawValue::Float(0.5)));
        assert!(!is_finite(&RawValue::Float(f64::NAN)));
        assert!(!is_finite(&RawValue::Sequence(vec![
            RawValue::Integer(1),
            RawValue::Float(f64::INFINITY),
        ])));
    }

    #[test]
    fn labelset_from_sequence() {
        let value = RawValue::Sequence(vec![RawValue::Integer(1), "syl".into()]);
        assert_eq!(coerce_labelset(&value), Some(labels(&["1", "syl"])));
        assert_eq!(coerce_labelset(&"".into()), None);
        assert_eq!(coerce_labelset(&RawValue::Boolean(true)), None);
    }
}
