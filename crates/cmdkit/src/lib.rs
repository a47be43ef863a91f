//! Command-line argument parsing and shell completion for subcommand CLIs.
//!
//! The crate is built around an immutable command tree: an [`AppBuilder`]
//! collects [`Command`]s and global [`Flag`]s, validates the tree, and
//! seals it into an [`App`]. Running the app resolves the deepest matching
//! subcommand from the raw tokens, parses the remaining tokens into typed
//! [`FlagValue`]s with CLI > environment > default precedence, and hands a
//! [`Context`] to the command's callback.
//!
//! ```no_run
//! use std::io::Write;
//!
//! use cmdkit::{AppBuilder, Command, Flag, FlagType};
//!
//! fn main() -> anyhow::Result<()> {
//!     let app = AppBuilder::new("myapp")
//!         .description("An example application.")
//!         .command(
//!             Command::new("greet")
//!                 .about("Print a greeting.")
//!                 .flag(Flag::new("name", FlagType::String).short('n').env("GREET_NAME"))
//!                 .execute(|ctx| {
//!                     let name = ctx.string("name").unwrap_or("world").to_string();
//!                     writeln!(ctx.output(), "hello, {name}")?;
//!                     Ok(())
//!                 }),
//!         )
//!         .build()?;
//!
//!     let args: Vec<String> = std::env::args().skip(1).collect();
//!     app.run(&args)?;
//!     Ok(())
//! }
//! ```
//!
//! The `completion` built-in generates scripts for bash, zsh, fish and
//! PowerShell from the same tree, so completions never drift from the
//! commands they describe.

mod app;
mod command;
mod completion;
mod context;
mod error;
mod flag;
mod parser;
mod resolver;

pub use app::{App, AppBuilder};
pub use command::{ArgsValidator, Command, ExecuteFn};
pub use completion::{Shell, generate, script};
pub use context::Context;
pub use error::Error;
pub use flag::{Flag, FlagType, FlagValue};
pub use parser::{ParsedArgs, parse, parse_with_env};
pub use resolver::{resolve, wants_help};
