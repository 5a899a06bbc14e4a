//! Token-level scanning of the argument vector.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::Reporter;
use crate::registry::OptionRegistry;

/// One occurrence of an option in argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A flag occurrence.
    Flag,
    Text(String),
    /// A required value was missing at the end of argv.
    Missing,
}

/// Result of scanning argv.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    /// Occurrences per option key, in first-seen order.
    pub merged: IndexMap<String, Vec<RawValue>>,
    /// Index of the first positional argument.
    pub next_index: usize,
}

enum Token<'t> {
    Short { name: char, rest: &'t str },
    Long { name: &'t str, inline: Option<&'t str> },
    Separator,
    Invalid,
    Positional,
}

fn classify(arg: &str) -> Token<'_> {
    if arg == "--" {
        return Token::Separator;
    }
    if let Some(body) = arg.strip_prefix("--") {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        if !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Token::Long { name, inline };
        }
        return Token::Invalid;
    }
    if let Some(body) = arg.strip_prefix('-') {
        let mut chars = body.chars();
        return match chars.next() {
            Some(name) if name.is_ascii_alphanumeric() => Token::Short {
                name,
                rest: chars.as_str(),
            },
            _ => Token::Invalid,
        };
    }
    Token::Positional
}

/// Walk `argv` from `start`, collecting option occurrences until the first
/// positional argument or `--`.
///
/// Soft errors go to `reporter`; scanning always runs to completion.
pub(crate) fn scan(
    registry: &OptionRegistry,
    argv: &[String],
    start: usize,
    reporter: &mut Reporter<'_>,
) -> ScanOutput {
    let mut out = ScanOutput::default();
    let mut i = start;
    // Remaining combined short flags, scanned in place of argv[i].
    let mut requeued: Option<String> = None;

    while i < argv.len() {
        let arg: Cow<'_, str> = match requeued.take() {
            Some(synthetic) => Cow::Owned(synthetic),
            None => Cow::Borrowed(argv[i].as_str()),
        };

        let (option, inline, short) = match classify(&arg) {
            Token::Separator => {
                i += 1;
                break;
            }
            Token::Positional => break,
            Token::Invalid => {
                reporter.error(format!("invalid argument '{arg}'"));
                i += 1;
                continue;
            }
            Token::Short { name, rest } => {
                let Some(option) = registry.get_short(name) else {
                    reporter.error(format!("unknown option '{name}'"));
                    i += 1;
                    continue;
                };
                (option, (!rest.is_empty()).then_some(rest), true)
            }
            Token::Long { name, inline } => {
                let Some(option) = registry.get_long(name) else {
                    reporter.error(format!("unknown option '{name}'"));
                    i += 1;
                    continue;
                };
                (option, inline, false)
            }
        };

        let value = if option.is_flag() {
            // `-rv` is `-r -v`; `--flag=value` sets the flag and drops the value
            if short && let Some(rest) = inline {
                requeued = Some(format!("-{rest}"));
            }
            RawValue::Flag
        } else if !option.value_required {
            RawValue::Text(inline.unwrap_or_default().to_string())
        } else if let Some(inline) = inline {
            RawValue::Text(inline.to_string())
        } else if let Some(next) = argv.get(i + 1) {
            i += 1;
            RawValue::Text(next.clone())
        } else {
            reporter.error(format!("{} value required", option.display_name()));
            RawValue::Missing
        };

        tracing::trace!(key = %option.key(), ?value, "scanned option");
        out.merged.entry(option.key()).or_default().push(value);

        if requeued.is_none() {
            i += 1;
        }
    }

    out.next_index = i.min(argv.len());
    out
}
