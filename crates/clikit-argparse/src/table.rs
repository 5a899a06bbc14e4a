use std::io::Write;

use indexmap::IndexMap;

use crate::command::{Command, RegisteredCommand};
use crate::error::{ConfigError, ErrorSink, InvokeError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_ARGUMENTS: i32 = 2;

fn is_help_arg(arg: &str) -> bool {
    arg == "-h" || arg == "--help" || arg == "help"
}

fn is_prefix(parts: &[String], args: &[String]) -> bool {
    parts.len() <= args.len() && parts.iter().zip(args).all(|(p, a)| p == a)
}

/// Every command known to the program, keyed by qualified name.
///
/// Owned by the entry point for the lifetime of the process.
pub struct CommandTable {
    program: String,
    commands: IndexMap<String, RegisteredCommand>,
    running: Option<String>,
}

impl CommandTable {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            commands: IndexMap::new(),
            running: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Register `command` under its default name.
    pub fn register<C: Command + 'static>(&mut self, command: C) -> Result<(), ConfigError> {
        let parts = command.name();
        self.insert(parts, Box::new(command))
    }

    /// Register `command` under `parts`, ignoring its default name.
    pub fn register_as<C, S>(&mut self, parts: &[S], command: C) -> Result<(), ConfigError>
    where
        C: Command + 'static,
        S: AsRef<str>,
    {
        let parts = parts.iter().map(|p| p.as_ref().to_string()).collect();
        self.insert(parts, Box::new(command))
    }

    fn insert(&mut self, parts: Vec<String>, command: Box<dyn Command>) -> Result<(), ConfigError> {
        let registered = RegisteredCommand::new(parts, command)?;
        let name = registered.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(ConfigError::DuplicateCommand(name));
        }
        tracing::trace!(command = %name, "registered command");
        self.commands.insert(name, registered);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.commands.values()
    }

    /// Name of the command currently being dispatched, if any.
    pub fn running(&self) -> Option<&str> {
        self.running.as_deref()
    }

    /// Find the command whose name parts are the longest prefix of `args`.
    ///
    /// Returns the command name and the number of tokens it consumed.
    pub fn lookup(&self, args: &[String]) -> Option<(&str, usize)> {
        self.commands
            .values()
            .filter(|c| is_prefix(c.parts(), args))
            .max_by_key(|c| c.parts().len())
            .map(|c| (c.name(), c.parts().len()))
    }

    /// Summary of registered commands.
    pub fn usage(&self) -> String {
        let mut out = format!("Usage: {} <command> [options] [args]\n", self.program);
        if self.commands.is_empty() {
            return out;
        }
        out.push_str("\nCommands:\n");
        let width = self.commands.keys().map(|k| k.len()).max().unwrap_or(0);
        for command in self.commands.values() {
            let synopsis = command.synopsis();
            if synopsis.is_empty() {
                out.push_str(&format!("  {}\n", command.name()));
            } else {
                out.push_str(&format!(
                    "  {:width$}  {}\n",
                    command.name(),
                    synopsis,
                    width = width
                ));
            }
        }
        out
    }

    /// Run the command named by the leading tokens of `argv[1..]`.
    ///
    /// `argv[0]` is the program path. With no arguments, or a lone `-h`,
    /// `--help` or `help` that no registered command claims, the command
    /// listing is written instead. Returns the process exit status: the
    /// command's status, [`EXIT_INVALID_ARGUMENTS`] when its arguments were
    /// rejected or no command matched, and [`EXIT_FAILURE`] when its body
    /// failed.
    pub fn dispatch(&mut self, argv: &[String], sink: &dyn ErrorSink, out: &mut dyn Write) -> i32 {
        let args = argv.get(1..).unwrap_or(&[]);
        let wants_listing = match args {
            [] => true,
            [arg] => is_help_arg(arg) && self.lookup(args).is_none(),
            _ => false,
        };
        if wants_listing {
            return match out.write_all(self.usage().as_bytes()) {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    sink.error_line(&format!("{}: {e}", self.program));
                    EXIT_FAILURE
                }
            };
        }

        let program = self.program.as_str();
        let Some(command) = self
            .commands
            .values_mut()
            .filter(|c| is_prefix(c.parts(), args))
            .max_by_key(|c| c.parts().len())
        else {
            let err = InvokeError::UnknownCommand(args[0].clone());
            sink.error_line(&format!("{program}: {err}"));
            return EXIT_INVALID_ARGUMENTS;
        };
        let name = command.name().to_string();
        let consumed = command.parts().len();
        tracing::debug!(command = %name, "dispatching");
        self.running = Some(name.clone());

        let status = match command.invoke(program, argv, 1 + consumed, sink, out) {
            Ok(status) => status,
            Err(InvokeError::InvalidArguments) => EXIT_INVALID_ARGUMENTS,
            Err(err) => {
                sink.error_line(&format!("{program} {name}: {err:#}"));
                EXIT_FAILURE
            }
        };
        tracing::debug!(command = %name, status, "command finished");
        status
    }
}
