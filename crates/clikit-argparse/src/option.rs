//! Option declarations and resolved option values.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_VALUE_NAME: &str = "VALUE";

/// Whether an option is a bare flag or carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionKind {
    #[default]
    Flag,
    Value,
}

/// Declaration of a single command-line option.
///
/// Build one with [`OptionSpec::flag`] or [`OptionSpec::value`], or deserialize
/// it from JSON (see [`options_from_json`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default = "default_value_name")]
    pub value_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, rename = "optionType")]
    pub kind: OptionKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub value_required: bool,
    #[serde(default)]
    pub multiple_allowed: bool,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub default_value: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    #[serde(default)]
    pub hidden: bool,
}

fn default_value_name() -> String {
    DEFAULT_VALUE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(v)) => vec![v],
        Some(OneOrMany::Many(v)) => v,
    })
}

impl OptionSpec {
    fn with_kind(kind: OptionKind) -> Self {
        Self {
            long: None,
            short: None,
            value_name: default_value_name(),
            description: String::new(),
            kind,
            required: false,
            value_required: true,
            multiple_allowed: false,
            default_value: Vec::new(),
            allowed_values: None,
            hidden: false,
        }
    }

    /// A boolean flag (`-v`, `--verbose`).
    pub fn flag() -> Self {
        Self::with_kind(OptionKind::Flag)
    }

    /// A value-taking option (`-o FILE`, `--output=FILE`).
    ///
    /// The value is required unless [`OptionSpec::optional_value`] is used.
    pub fn value() -> Self {
        Self::with_kind(OptionKind::Value)
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = value_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept `--name` on its own; the value is then the empty string.
    pub fn optional_value(mut self) -> Self {
        self.value_required = false;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple_allowed = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value.push(value.into());
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Canonical identifier: the long name, else the short name.
    pub fn key(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }

    /// `--long` if the option has a long name, else `-s`.
    pub fn display_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => String::new(),
        }
    }

    pub fn is_flag(&self) -> bool {
        self.kind == OptionKind::Flag
    }

    /// Allowed values, if this is a value option with a constrained value set.
    pub fn constrained_values(&self) -> Option<&[String]> {
        if self.is_flag() {
            return None;
        }
        self.allowed_values.as_deref()
    }
}

/// Parse a JSON array of option declarations.
///
/// ```json
/// [{ "long": "dest", "short": "d", "valueName": "DIR", "optionType": "VALUE", "required": true }]
/// ```
pub fn options_from_json(json: &str) -> Result<Vec<OptionSpec>, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Resolved value of an option after validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    #[default]
    Absent,
    Flag(bool),
    Count(usize),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Flags are true when given; counts when nonzero; values when present.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Flag(b) => *b,
            Self::Count(n) => *n > 0,
            Self::Text(_) => true,
            Self::List(v) => !v.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_count(&self) -> usize {
        match self {
            Self::Count(n) => *n,
            Self::Flag(true) => 1,
            _ => 0,
        }
    }

    pub fn as_list(&self) -> &[String] {
        match self {
            Self::List(v) => v.as_slice(),
            Self::Text(s) => std::slice::from_ref(s),
            _ => &[],
        }
    }
}
