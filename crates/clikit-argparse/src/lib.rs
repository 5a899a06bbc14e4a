//! Option declaration, parsing, validation and usage rendering for CLI
//! commands.
//!
//! A program builds a [`CommandTable`], registers [`Command`]s and hands argv
//! to [`CommandTable::dispatch`]:
//!
//! - options are scanned with a getopt-like grammar (`-v`, `-rv`, `-ofile`,
//!   `--out=file`, `--out file`, `--`)
//! - every scan and validation error is reported to an [`ErrorSink`] before
//!   the invocation is rejected, so users see all problems at once
//! - `-h`/`--help` is injected into every command that doesn't declare its own
//!   `help` option, and prints help derived from the option declarations

pub mod command;
pub mod error;
pub mod option;
pub mod registry;
pub mod resolve;
pub mod scan;
pub mod table;
pub mod usage;

pub use command::{
    Command, CommandState, Context, Invocation, RegisteredCommand, validate_qualified_name,
};
pub use error::{ConfigError, ErrorSink, InvokeError, MemorySink, StderrSink};
pub use option::{OptionKind, OptionSpec, OptionValue, options_from_json};
pub use registry::OptionRegistry;
pub use resolve::Resolution;
pub use table::{CommandTable, EXIT_FAILURE, EXIT_INVALID_ARGUMENTS, EXIT_SUCCESS};
