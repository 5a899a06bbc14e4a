//! Commands, invocations and the per-run context handed to command bodies.

use std::io::Write;

use indexmap::IndexMap;

use crate::error::{ConfigError, ErrorSink, InvokeError, Reporter};
use crate::option::{OptionSpec, OptionValue};
use crate::registry::OptionRegistry;
use crate::resolve::{Resolution, resolve};
use crate::scan::scan;
use crate::usage;

static ABSENT: OptionValue = OptionValue::Absent;

/// A command that can be registered in a [`CommandTable`](crate::CommandTable).
///
/// # Example
///
/// ```
/// use std::io::Write;
///
/// use clikit_argparse::{Command, Context, OptionSpec};
///
/// struct Greet;
///
/// impl Command for Greet {
///     fn name(&self) -> Vec<String> {
///         vec!["greet".into()]
///     }
///
///     fn options(&self) -> Vec<OptionSpec> {
///         vec![OptionSpec::flag().short('l').long("loud")]
///     }
///
///     fn run(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<Option<i32>> {
///         let name = ctx.args().first().map(String::as_str).unwrap_or("world");
///         let greeting = format!("Hello, {name}!");
///         if ctx.flag("loud")? {
///             writeln!(ctx.out(), "{}", greeting.to_uppercase())?;
///         } else {
///             writeln!(ctx.out(), "{greeting}")?;
///         }
///         Ok(None)
///     }
/// }
/// ```
pub trait Command {
    /// Default qualified name, e.g. `["sync", "files"]` for `prog sync files`.
    fn name(&self) -> Vec<String>;

    /// Options accepted by the command, in the order they should be listed.
    fn options(&self) -> Vec<OptionSpec>;

    /// Shown in the DESCRIPTION section of the help text.
    fn description(&self) -> &str {
        ""
    }

    /// Run the command with resolved options.
    ///
    /// The exit status is the returned value if any, else the last status
    /// passed to [`Context::set_exit_status`], else 0.
    fn run(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<Option<i32>>;
}

/// Validate a qualified command name: at least one part, each matching
/// `[A-Za-z][A-Za-z0-9_-]*`.
pub fn validate_qualified_name<S: AsRef<str>>(parts: &[S]) -> Result<(), ConfigError> {
    if parts.is_empty() {
        return Err(ConfigError::InvalidCommandName(String::new()));
    }
    for part in parts {
        let part = part.as_ref();
        let mut chars = part.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ConfigError::InvalidCommandName(part.to_string()));
        }
    }
    Ok(())
}

/// Scan and validation state for one command execution.
///
/// Values are resolved on first use and memoized; later calls return the same
/// outcome without scanning argv again.
pub struct Invocation<'a> {
    registry: &'a OptionRegistry,
    argv: &'a [String],
    first_index: usize,
    command_name: &'a str,
    sink: &'a dyn ErrorSink,
    outcome: Option<(Resolution, usize)>,
}

impl<'a> Invocation<'a> {
    /// `first_index` is where options start in `argv` (after the program and
    /// command name tokens).
    pub fn new(
        registry: &'a OptionRegistry,
        argv: &'a [String],
        first_index: usize,
        command_name: &'a str,
        sink: &'a dyn ErrorSink,
    ) -> Self {
        Self {
            registry,
            argv,
            first_index: first_index.min(argv.len()),
            command_name,
            sink,
            outcome: None,
        }
    }

    pub fn resolve(&mut self) -> Result<&Resolution, InvokeError> {
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None => self.scan_and_validate(),
        };
        let (resolution, errors) = self.outcome.insert(outcome);
        if *errors > 0 {
            return Err(InvokeError::InvalidArguments);
        }
        Ok(resolution)
    }

    fn scan_and_validate(&self) -> (Resolution, usize) {
        let mut reporter = Reporter::new(self.command_name, self.sink);
        let scanned = scan(self.registry, self.argv, self.first_index, &mut reporter);
        let arg_count = self.argv.len() - self.first_index;
        let resolution = resolve(self.registry, &scanned, arg_count, &mut reporter);
        tracing::debug!(
            command = self.command_name,
            errors = reporter.count(),
            help = resolution.is_help(),
            "resolved options"
        );
        (resolution, reporter.count())
    }

    /// Number of errors reported, or 0 before resolution.
    pub fn error_count(&self) -> usize {
        self.outcome.as_ref().map_or(0, |(_, errors)| *errors)
    }

    /// Arguments left for the command body.
    pub fn positional(&self) -> &'a [String] {
        match &self.outcome {
            Some((resolution, _)) => &self.argv[resolution.next_index()..],
            None => &[],
        }
    }
}

/// What a command body sees while running.
pub struct Context<'a> {
    command_name: &'a str,
    registry: &'a OptionRegistry,
    resolution: &'a Resolution,
    args: &'a [String],
    out: &'a mut dyn Write,
    exit_status: i32,
}

impl<'a> Context<'a> {
    pub fn new(
        command_name: &'a str,
        registry: &'a OptionRegistry,
        resolution: &'a Resolution,
        args: &'a [String],
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            command_name,
            registry,
            resolution,
            args,
            out,
            exit_status: 0,
        }
    }

    /// Program name followed by the command name.
    pub fn command_name(&self) -> &str {
        self.command_name
    }

    /// Positional arguments.
    pub fn args(&self) -> &[String] {
        self.args
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Value of an option by short or long name.
    ///
    /// Repeatable flags resolve to a count and repeatable value options to a
    /// list.
    pub fn value(&self, name: &str) -> Result<&OptionValue, InvokeError> {
        let option = self
            .registry
            .get(name)
            .ok_or_else(|| InvokeError::NoSuchOption(name.to_string()))?;
        Ok(self
            .resolution
            .get(&option.key())
            .unwrap_or(&ABSENT))
    }

    pub fn flag(&self, name: &str) -> Result<bool, InvokeError> {
        Ok(self.value(name)?.as_bool())
    }

    pub fn text(&self, name: &str) -> Result<Option<&str>, InvokeError> {
        Ok(self.value(name)?.as_str())
    }

    pub fn count(&self, name: &str) -> Result<usize, InvokeError> {
        Ok(self.value(name)?.as_count())
    }

    pub fn list(&self, name: &str) -> Result<&[String], InvokeError> {
        Ok(self.value(name)?.as_list())
    }

    /// Every option value keyed by long name, else short name.
    pub fn values(&self) -> IndexMap<String, &OptionValue> {
        self.registry
            .options()
            .map(|o| {
                let key = o.key();
                let value = self.resolution.get(&key).unwrap_or(&ABSENT);
                (key, value)
            })
            .collect()
    }

    pub fn set_exit_status(&mut self, status: i32) {
        self.exit_status = status;
    }

    pub fn exit_status(&self) -> i32 {
        self.exit_status
    }
}

/// Lifecycle of a registered command. Unregistered commands are plain
/// [`Command`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Registered,
    Invoked,
}

/// A command recorded in a command table under a fixed qualified name.
pub struct RegisteredCommand {
    parts: Vec<String>,
    name: String,
    registry: OptionRegistry,
    command: Box<dyn Command>,
    state: CommandState,
}

impl RegisteredCommand {
    pub(crate) fn new(
        parts: Vec<String>,
        command: Box<dyn Command>,
    ) -> Result<Self, ConfigError> {
        validate_qualified_name(&parts)?;
        let registry = OptionRegistry::new(command.options())?;
        Ok(Self {
            name: parts.join(" "),
            parts,
            registry,
            command,
            state: CommandState::Registered,
        })
    }

    /// Qualified name parts.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Qualified name joined by spaces.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        self.command.description()
    }

    pub fn options(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    /// One-line synopsis of the visible options.
    pub fn synopsis(&self) -> String {
        usage::synopsis(&self.registry.visible())
    }

    /// Full help text, with `program` prefixed to the command name.
    pub fn help(&self, program: &str) -> String {
        usage::help(
            &format!("{program} {}", self.name),
            self.command.description(),
            &self.registry.visible(),
        )
    }

    /// Resolve options from `argv[first_index..]` and run the command once.
    ///
    /// Help is written to `out` instead of running the body. Every scan and
    /// validation error is reported to `sink` before
    /// [`InvokeError::InvalidArguments`] is returned.
    pub fn invoke(
        &mut self,
        program: &str,
        argv: &[String],
        first_index: usize,
        sink: &dyn ErrorSink,
        out: &mut dyn Write,
    ) -> Result<i32, InvokeError> {
        if self.state == CommandState::Invoked {
            return Err(InvokeError::AlreadyInvoked(self.name.clone()));
        }
        self.state = CommandState::Invoked;

        let command_name = format!("{program} {}", self.name);
        let mut invocation = Invocation::new(&self.registry, argv, first_index, &command_name, sink);
        let resolution = invocation.resolve()?.clone();
        let args = invocation.positional();

        if resolution.is_help() {
            let text = usage::help(
                &command_name,
                self.command.description(),
                &self.registry.visible(),
            );
            out.write_all(text.as_bytes())
                .map_err(|e| InvokeError::Failed(e.into()))?;
            return Ok(0);
        }

        tracing::debug!(command = %self.name, args = args.len(), "running command");
        let mut ctx = Context::new(&command_name, &self.registry, &resolution, args, out);
        match self.command.run(&mut ctx)? {
            Some(status) => Ok(status),
            None => Ok(ctx.exit_status()),
        }
    }
}
