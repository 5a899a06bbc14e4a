//! Commands shipped with the `clikit` binary.

use anyhow::{Context as _, Result};
use clikit_argparse::{
    Command, CommandTable, ConfigError, Context, OptionSpec, OptionValue, options_from_json,
};
use indexmap::IndexMap;
use serde::Serialize;

pub fn register_all(table: &mut CommandTable) -> Result<(), ConfigError> {
    table.register(SyncFiles)?;
    table.register(Echo::new()?)?;
    table.register(Exit)?;
    Ok(())
}

/// Prints its resolved options as JSON without touching the filesystem.
pub struct SyncFiles;

#[derive(Serialize)]
struct SyncReport<'a> {
    options: IndexMap<String, &'a OptionValue>,
    args: &'a [String],
}

impl Command for SyncFiles {
    fn name(&self) -> Vec<String> {
        vec!["sync".into(), "files".into()]
    }

    fn description(&self) -> &str {
        "Show how files would be synced from SOURCE to DEST"
    }

    fn options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::flag()
                .short('n')
                .long("dry-run")
                .description("Don't change anything"),
            OptionSpec::flag()
                .long("verbose")
                .description("Log each resolved option"),
            OptionSpec::value()
                .long("exclude")
                .value_name("<PATTERN>")
                .description("Skip files matching PATTERN")
                .multiple(),
            OptionSpec::value()
                .long("mode")
                .value_name("MODE")
                .description("How files reach DEST")
                .default_value("copy")
                .allowed_values(["copy", "move"]),
            OptionSpec::value()
                .long("from")
                .value_name("<SOURCE>")
                .required(),
            OptionSpec::value()
                .long("to")
                .value_name("<DEST>")
                .required(),
        ]
    }

    fn run(&mut self, ctx: &mut Context<'_>) -> Result<Option<i32>> {
        if ctx.flag("verbose")? {
            for (key, value) in ctx.values() {
                tracing::info!(option = %key, ?value, "resolved");
            }
        }
        let report = SyncReport {
            options: ctx.values(),
            args: ctx.args(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        writeln!(ctx.out(), "{json}")?;
        Ok(None)
    }
}

const ECHO_OPTIONS: &str = r#"[
    {
        "short": "u",
        "long": "upper",
        "description": "Print arguments in upper case"
    },
    {
        "short": "v",
        "description": "Increase verbosity",
        "multipleAllowed": true
    },
    {
        "long": "sep",
        "valueName": "TEXT",
        "description": "Print TEXT between arguments",
        "optionType": "VALUE",
        "valueRequired": false,
        "defaultValue": " "
    }
]"#;

/// Joins its arguments, with options declared as JSON.
pub struct Echo {
    options: Vec<OptionSpec>,
}

impl Echo {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            options: options_from_json(ECHO_OPTIONS)?,
        })
    }
}

impl Command for Echo {
    fn name(&self) -> Vec<String> {
        vec!["echo".into()]
    }

    fn description(&self) -> &str {
        "Print arguments separated by TEXT"
    }

    fn options(&self) -> Vec<OptionSpec> {
        self.options.clone()
    }

    fn run(&mut self, ctx: &mut Context<'_>) -> Result<Option<i32>> {
        let verbosity = ctx.count("v")?;
        let sep = ctx.text("sep")?.unwrap_or_default();
        let mut line = ctx.args().join(sep);
        if ctx.flag("upper")? {
            line = line.to_uppercase();
        }
        if verbosity > 0 {
            tracing::info!(verbosity, args = ctx.args().len(), "echo");
        }
        writeln!(ctx.out(), "{line}")?;
        Ok(None)
    }
}

/// Exits with the given status.
pub struct Exit;

impl Command for Exit {
    fn name(&self) -> Vec<String> {
        vec!["exit".into()]
    }

    fn description(&self) -> &str {
        "Exit with status CODE"
    }

    fn options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::value()
                .long("status")
                .value_name("CODE")
                .description("Exit status")
                .default_value("0"),
        ]
    }

    fn run(&mut self, ctx: &mut Context<'_>) -> Result<Option<i32>> {
        let raw = ctx.text("status")?.unwrap_or("0");
        let status: i32 = raw
            .parse()
            .with_context(|| format!("invalid exit status: {raw}"))?;
        ctx.set_exit_status(status);
        Ok(None)
    }
}
