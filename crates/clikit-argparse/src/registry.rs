use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::option::OptionSpec;

pub const HELP_NAME: &str = "help";
const HELP_SHORT: char = 'h';

/// The option set of one command.
///
/// Options keep their registration order. Unless a `help` option is declared,
/// a hidden `--help` (and `-h`, if free) flag is appended.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    by_key: IndexMap<String, OptionSpec>,
    short_names: HashMap<char, String>,
    long_names: HashMap<String, String>,
    implicit_help: Option<String>,
}

impl OptionRegistry {
    pub fn new<I>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OptionSpec>,
    {
        let mut registry = Self::default();
        for option in options {
            registry.add(option)?;
        }

        if !registry.long_names.contains_key(HELP_NAME) {
            let mut help = OptionSpec::flag()
                .long(HELP_NAME)
                .description("Show this help and exit")
                .hidden();
            if !registry.short_names.contains_key(&HELP_SHORT) {
                help = help.short(HELP_SHORT);
            }
            registry.implicit_help = Some(help.key());
            registry.add(help)?;
        }

        Ok(registry)
    }

    fn add(&mut self, option: OptionSpec) -> Result<(), ConfigError> {
        if option.short.is_none() && option.long.is_none() {
            return Err(ConfigError::Unnamed);
        }
        if let Some(short) = option.short {
            if !short.is_ascii_alphanumeric() {
                return Err(ConfigError::InvalidShortName(short));
            }
        }
        if let Some(long) = &option.long {
            if !is_valid_long_name(long) {
                return Err(ConfigError::InvalidLongName(long.clone()));
            }
        }

        let key = option.key();
        let short_taken = option
            .short
            .is_some_and(|s| self.short_names.contains_key(&s));
        let long_taken = option
            .long
            .as_ref()
            .is_some_and(|l| self.long_names.contains_key(l));
        if short_taken || long_taken || self.by_key.contains_key(&key) {
            let names: Vec<String> = option
                .short
                .map(|s| format!("-{s}"))
                .into_iter()
                .chain(option.long.as_ref().map(|l| format!("--{l}")))
                .collect();
            return Err(ConfigError::DuplicateName(names.join(", ")));
        }

        if let Some(short) = option.short {
            self.short_names.insert(short, key.clone());
        }
        if let Some(long) = &option.long {
            self.long_names.insert(long.clone(), key.clone());
        }
        self.by_key.insert(key, option);
        Ok(())
    }

    /// Look up an option by its short (`"v"`) or long (`"verbose"`) name.
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        if let Some(key) = self.long_names.get(name) {
            return self.by_key.get(key);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.get_short(c),
            _ => None,
        }
    }

    pub fn get_short(&self, short: char) -> Option<&OptionSpec> {
        self.short_names.get(&short).and_then(|k| self.by_key.get(k))
    }

    pub fn get_long(&self, long: &str) -> Option<&OptionSpec> {
        self.long_names.get(long).and_then(|k| self.by_key.get(k))
    }

    pub fn by_key(&self, key: &str) -> Option<&OptionSpec> {
        self.by_key.get(key)
    }

    /// Every option in registration order, including hidden ones.
    pub fn options(&self) -> impl Iterator<Item = &OptionSpec> {
        self.by_key.values()
    }

    /// Options shown in usage and help text.
    pub fn visible(&self) -> Vec<&OptionSpec> {
        self.by_key.values().filter(|o| !o.hidden).collect()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Key of the injected help option, if one was added.
    pub fn implicit_help(&self) -> Option<&str> {
        self.implicit_help.as_deref()
    }

    pub fn is_implicit_help(&self, key: &str) -> bool {
        self.implicit_help.as_deref() == Some(key)
    }
}

fn is_valid_long_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_hidden_help() {
        let registry = OptionRegistry::new([OptionSpec::flag().short('v')]).unwrap();
        let help = registry.get("help").unwrap();
        assert!(help.hidden);
        assert_eq!(help.short, Some('h'));
        assert_eq!(registry.get("h"), Some(help));
        assert_eq!(registry.implicit_help(), Some("help"));
        assert_eq!(registry.visible().len(), 1);
    }

    #[test]
    fn help_skips_taken_short_name() {
        let registry =
            OptionRegistry::new([OptionSpec::value().short('h').long("host")]).unwrap();
        assert_eq!(registry.get("h").and_then(|o| o.long.as_deref()), Some("host"));
        assert_eq!(registry.get("help").unwrap().short, None);
    }

    #[test]
    fn declared_help_replaces_implicit_one() {
        let registry = OptionRegistry::new([OptionSpec::value()
            .long("help")
            .optional_value()
            .description("Show help for a topic")])
        .unwrap();
        assert_eq!(registry.implicit_help(), None);
        assert_eq!(registry.len(), 1);
        assert!(!registry.get("help").unwrap().hidden);
    }

    #[test]
    fn rejects_colliding_short_names() {
        let err = OptionRegistry::new([
            OptionSpec::flag().short('r').long("recursive"),
            OptionSpec::flag().short('r').long("reverse"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(ref n) if n == "-r, --reverse"));
    }

    #[test]
    fn rejects_colliding_long_names() {
        let err = OptionRegistry::new([
            OptionSpec::flag().long("dry-run"),
            OptionSpec::value().short('d').long("dry-run"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(_)));
    }

    #[test]
    fn rejects_colliding_keys() {
        let err = OptionRegistry::new([OptionSpec::flag().short('x'), OptionSpec::flag().long("x")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(_)));
    }

    #[test]
    fn rejects_unnamed_and_malformed_names() {
        assert!(matches!(
            OptionRegistry::new([OptionSpec::flag()]).unwrap_err(),
            ConfigError::Unnamed
        ));
        assert!(matches!(
            OptionRegistry::new([OptionSpec::flag().short('-')]).unwrap_err(),
            ConfigError::InvalidShortName('-')
        ));
        assert!(matches!(
            OptionRegistry::new([OptionSpec::flag().long("1st")]).unwrap_err(),
            ConfigError::InvalidLongName(_)
        ));
        assert!(matches!(
            OptionRegistry::new([OptionSpec::flag().long("no spaces")]).unwrap_err(),
            ConfigError::InvalidLongName(_)
        ));
    }

    #[test]
    fn short_and_long_namespaces_are_separate() {
        let registry = OptionRegistry::new([
            OptionSpec::flag().short('n').long("dry-run"),
            OptionSpec::flag().long("verbose"),
        ])
        .unwrap();
        assert_eq!(registry.get_long("n"), None);
        assert_eq!(registry.get_short('n').map(|o| o.key()), Some("dry-run".into()));
        assert_eq!(registry.get("verbose").map(|o| o.key()), Some("verbose".into()));
    }
}
