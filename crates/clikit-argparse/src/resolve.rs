//! Coalescing of scanned occurrences into validated option values.

use indexmap::IndexMap;

use crate::error::Reporter;
use crate::option::{OptionSpec, OptionValue};
use crate::registry::OptionRegistry;
use crate::scan::{RawValue, ScanOutput};

/// Validated option values for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    values: IndexMap<String, OptionValue>,
    is_help: bool,
    next_index: usize,
}

impl Resolution {
    /// Value by option key, in registration order.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &IndexMap<String, OptionValue> {
        &self.values
    }

    pub fn is_help(&self) -> bool {
        self.is_help
    }

    /// Index in argv of the first positional argument.
    pub fn next_index(&self) -> usize {
        self.next_index
    }
}

/// Apply multiplicity, allowed-value and required checks to every option, in
/// registration order, reporting every violation found.
///
/// `arg_count` is the number of argv tokens following the command name.
pub(crate) fn resolve(
    registry: &OptionRegistry,
    scanned: &ScanOutput,
    arg_count: usize,
    reporter: &mut Reporter<'_>,
) -> Resolution {
    let is_help = registry
        .implicit_help()
        .is_some_and(|key| scanned.merged.contains_key(key));
    // `<cmd> --help` must succeed whatever else is required
    let help_only = is_help && arg_count == 1;

    let mut values = IndexMap::with_capacity(registry.len());
    for option in registry.options() {
        let key = option.key();
        if registry.is_implicit_help(&key) {
            values.insert(key, OptionValue::Flag(is_help));
            continue;
        }

        let raw = scanned.merged.get(&key);
        if let Some(raw) = raw {
            check_multiplicity(option, raw, reporter);
            check_allowed_values(option, raw, reporter);
        }

        let value = match raw {
            None if option.required => {
                if !help_only {
                    reporter.error(format!("{} argument required", option.display_name()));
                }
                OptionValue::Absent
            }
            raw => coalesce(option, raw),
        };
        values.insert(key, value);
    }

    Resolution {
        values,
        is_help,
        next_index: scanned.next_index,
    }
}

fn check_multiplicity(option: &OptionSpec, raw: &[RawValue], reporter: &mut Reporter<'_>) {
    if !option.multiple_allowed && raw.len() > 1 {
        reporter.error(format!(
            "{} cannot be used multiple times",
            option.display_name()
        ));
    }
}

fn check_allowed_values(option: &OptionSpec, raw: &[RawValue], reporter: &mut Reporter<'_>) {
    let Some(allowed) = option.constrained_values() else {
        return;
    };
    let mut invalid: Vec<&str> = Vec::new();
    for value in raw {
        if let RawValue::Text(v) = value {
            if !allowed.iter().any(|a| a == v) && !invalid.contains(&v.as_str()) {
                invalid.push(v);
            }
        }
    }
    if !invalid.is_empty() {
        let noun = if invalid.len() == 1 { "value" } else { "values" };
        reporter.error(format!(
            "invalid {} {noun}: {}",
            option.display_name(),
            invalid.join(", ")
        ));
    }
}

fn coalesce(option: &OptionSpec, raw: Option<&Vec<RawValue>>) -> OptionValue {
    match (option.is_flag(), option.multiple_allowed, raw) {
        (true, true, raw) => OptionValue::Count(raw.map_or(0, Vec::len)),
        (true, false, raw) => OptionValue::Flag(raw.is_some()),
        (false, true, Some(raw)) => OptionValue::List(texts(raw)),
        (false, true, None) => OptionValue::List(option.default_value.clone()),
        (false, false, Some(raw)) => match raw.last() {
            Some(RawValue::Text(v)) => OptionValue::Text(v.clone()),
            _ => OptionValue::Absent,
        },
        (false, false, None) => match option.default_value.as_slice() {
            [] => OptionValue::Absent,
            [single] => OptionValue::Text(single.clone()),
            many => OptionValue::List(many.to_vec()),
        },
    }
}

fn texts(raw: &[RawValue]) -> Vec<String> {
    raw.iter()
        .filter_map(|v| match v {
            RawValue::Text(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}
