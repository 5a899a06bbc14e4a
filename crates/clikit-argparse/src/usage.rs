//! Synopsis and help text derived from option declarations.
//!
//! Everything here is a pure function of the visible options and the command
//! name.

use crate::option::OptionSpec;

/// Render a value name for usage text.
///
/// All-uppercase names are used verbatim (`FILE`); anything else is kebab-cased
/// inside angle brackets (`fileName` => `<file-name>`).
pub fn format_value_name(name: &str) -> String {
    if name == name.to_uppercase() {
        name.to_string()
    } else {
        format!("<{}>", kebab_case(name))
    }
}

fn kebab_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut pending_dash = false;
    let mut prev_lower = false;
    for c in text.chars() {
        if !c.is_alphanumeric() {
            pending_dash = true;
            prev_lower = false;
            continue;
        }
        if !out.is_empty() && (pending_dash || (prev_lower && c.is_uppercase())) {
            out.push('-');
        }
        pending_dash = false;
        prev_lower = c.is_lowercase();
        out.extend(c.to_lowercase());
    }
    out
}

/// Value placeholder after `-s` (short) or `--long` (long).
fn value_suffix(option: &OptionSpec, short: bool) -> String {
    let name = format_value_name(&option.value_name);
    match (option.value_required, short) {
        (true, _) => format!(" {name}"),
        (false, true) => format!("[{name}]"),
        (false, false) => format!("[={name}]"),
    }
}

/// One-line synopsis, e.g. `[-n] [--verbose] [--exclude PATTERN] --from SOURCE`.
///
/// Short flags are clustered first, then long-only flags, then optional value
/// options, then required value options.
pub fn synopsis(options: &[&OptionSpec]) -> String {
    let mut short_flags = String::new();
    let mut long_flags: Vec<String> = Vec::new();
    let mut optional: Vec<String> = Vec::new();
    let mut required: Vec<String> = Vec::new();

    for option in options {
        if option.is_flag() {
            match (option.short, &option.long) {
                (Some(short), _) => short_flags.push(short),
                (None, Some(long)) => long_flags.push(format!("[--{long}]")),
                (None, None) => {}
            }
            continue;
        }

        let entry = match (option.short, &option.long) {
            (Some(short), _) => format!("-{short}{}", value_suffix(option, true)),
            (None, Some(long)) => format!("--{long}{}", value_suffix(option, false)),
            (None, None) => continue,
        };
        if option.required {
            required.push(entry);
        } else {
            optional.push(format!("[{entry}]"));
        }
    }

    let mut parts: Vec<String> = Vec::new();
    if !short_flags.is_empty() {
        parts.push(format!("[-{short_flags}]"));
    }
    parts.extend(long_flags);
    parts.extend(optional);
    parts.extend(required);
    parts.join(" ")
}

fn option_block(option: &OptionSpec) -> String {
    let mut names: Vec<String> = Vec::new();
    if let Some(short) = option.short {
        names.push(format!("-{short}"));
    }
    if let Some(long) = &option.long {
        names.push(format!("--{long}"));
    }

    let mut out = format!("  {}", names.join(", "));
    if !option.is_flag() {
        out.push_str(&value_suffix(option, option.long.is_none()));
    }

    let indent = if option.description.trim().is_empty() {
        "    "
    } else {
        out.push_str(&format!("\n    {}", option.description.trim()));
        "      "
    };

    if !option.is_flag() && !option.default_value.is_empty() {
        out.push_str(&format!(
            "\n{indent}default: {}",
            option.default_value.join(",")
        ));
    }
    if let Some(allowed) = option.constrained_values() {
        out.push_str(&format!("\n{indent}options:"));
        for value in allowed {
            out.push_str(&format!("\n{indent}- {value}"));
        }
    }
    out
}

/// Full help document for `command_name` (program name plus command name).
pub fn help(command_name: &str, description: &str, options: &[&OptionSpec]) -> String {
    let synopsis = synopsis(options);

    let mut out = String::new();
    out.push_str(&format!("NAME\n  {command_name}\n"));

    out.push_str("\nSYNOPSIS\n");
    if synopsis.is_empty() {
        out.push_str(&format!("  {command_name}\n"));
    } else {
        out.push_str(&format!("  {command_name} {synopsis}\n"));
    }

    if !description.trim().is_empty() {
        out.push_str(&format!("\nDESCRIPTION\n  {}\n", description.trim()));
    }

    if !options.is_empty() {
        out.push_str("\nOPTIONS\n");
        let blocks: Vec<String> = options.iter().map(|o| option_block(o)).collect();
        out.push_str(&blocks.join("\n\n"));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_names() {
        assert_eq!(format_value_name("FILE"), "FILE");
        assert_eq!(format_value_name("<PATTERN>"), "<PATTERN>");
        assert_eq!(format_value_name("directory"), "<directory>");
        assert_eq!(format_value_name("fileName"), "<file-name>");
        assert_eq!(format_value_name("Output Dir"), "<output-dir>");
        assert_eq!(format_value_name("key_value2"), "<key-value2>");
    }

    #[test]
    fn synopsis_groups_options_in_fixed_order() {
        let options = [
            OptionSpec::value().long("from").value_name("<SOURCE>").required(),
            OptionSpec::flag().short('n'),
            OptionSpec::value().long("exclude").value_name("<PATTERN>"),
            OptionSpec::value().long("to").value_name("<DEST>").required(),
            OptionSpec::flag().long("verbose"),
        ];
        let refs: Vec<&OptionSpec> = options.iter().collect();
        assert_eq!(
            synopsis(&refs),
            "[-n] [--verbose] [--exclude <PATTERN>] --from <SOURCE> --to <DEST>"
        );
    }

    #[test]
    fn synopsis_clusters_short_flags_and_prefers_short_form() {
        let options = [
            OptionSpec::flag().short('n').long("dry-run"),
            OptionSpec::flag().short('y'),
            OptionSpec::flag().long("quiet"),
            OptionSpec::flag().long("force"),
            OptionSpec::value().short('o').long("output").value_name("file"),
            OptionSpec::value().short('c').long("color").optional_value(),
            OptionSpec::value().long("level").value_name("N").optional_value(),
            OptionSpec::value().short('d').long("dest").value_name("DIR").required(),
        ];
        let refs: Vec<&OptionSpec> = options.iter().collect();
        assert_eq!(
            synopsis(&refs),
            "[-ny] [--quiet] [--force] [-o <file>] [-c[VALUE]] [--level[=N]] -d DIR"
        );
    }

    #[test]
    fn help_lists_every_option_block() {
        let options = [
            OptionSpec::flag()
                .short('n')
                .long("dry-run")
                .description("Show what would be done"),
            OptionSpec::value()
                .long("mode")
                .value_name("mode")
                .optional_value()
                .default_value("copy")
                .allowed_values(["copy", "move"]),
            OptionSpec::value()
                .short('x')
                .long("exclude")
                .value_name("PATTERN")
                .description("Skip matching files")
                .multiple()
                .default_value("*.tmp")
                .default_value("*.bak"),
        ];
        let refs: Vec<&OptionSpec> = options.iter().collect();
        let text = help("prog sync", "Copy files between trees", &refs);
        let expected = "\
NAME
  prog sync

SYNOPSIS
  prog sync [-n] [--mode[=<mode>]] [-x PATTERN]

DESCRIPTION
  Copy files between trees

OPTIONS
  -n, --dry-run
    Show what would be done

  --mode[=<mode>]
    default: copy
    options:
    - copy
    - move

  -x, --exclude PATTERN
    Skip matching files
      default: *.tmp,*.bak
";
        assert_eq!(text, expected);
    }

    #[test]
    fn help_without_options() {
        let text = help("prog noop", "", &[]);
        assert_eq!(text, "NAME\n  prog noop\n\nSYNOPSIS\n  prog noop\n");
    }
}
