use std::cell::RefCell;
use std::fmt;
use std::io::Write;

use thiserror::Error;

/// Programming errors detected while declaring options or registering commands.
///
/// These are never produced by argument parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("option must have a short or long name")]
    Unnamed,

    #[error("invalid short option name '{0}'")]
    InvalidShortName(char),

    #[error("invalid long option name '{0}'")]
    InvalidLongName(String),

    #[error("option names must be unique: {0}")]
    DuplicateName(String),

    #[error("invalid command name: '{0}'")]
    InvalidCommandName(String),

    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    #[error("invalid option declarations: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while invoking a registered command.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// One or more scan/validation errors were reported to the sink.
    #[error("invalid arguments")]
    InvalidArguments,

    #[error("no option with name '{0}'")]
    NoSuchOption(String),

    #[error("{0} has already been invoked")]
    AlreadyInvoked(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Destination for user-facing error lines.
pub trait ErrorSink {
    fn error_line(&self, line: &str);
}

/// Writes error lines to stderr as-is, whatever the log filter.
///
/// Each line is also recorded as a `tracing` DEBUG event.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl ErrorSink for StderrSink {
    fn error_line(&self, line: &str) {
        tracing::debug!(%line, "reported error");
        // nowhere left to report a failed write to stderr
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }
}

/// Collects error lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: RefCell<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl ErrorSink for MemorySink {
    fn error_line(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

/// Counts soft errors for one invocation and forwards them to the sink,
/// prefixed with the command name.
pub(crate) struct Reporter<'s> {
    prefix: &'s str,
    sink: &'s dyn ErrorSink,
    count: usize,
}

impl<'s> Reporter<'s> {
    pub(crate) fn new(prefix: &'s str, sink: &'s dyn ErrorSink) -> Self {
        Self {
            prefix,
            sink,
            count: 0,
        }
    }

    pub(crate) fn error(&mut self, message: impl fmt::Display) {
        self.sink.error_line(&format!("{}: {message}", self.prefix));
        self.count += 1;
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }
}
