//! Application assembly and dispatch.
//!
//! [`AppBuilder`] collects commands and global flags, validates the tree
//! (names, duplicates), installs the built-in `help` and `completion`
//! commands exactly once, and seals everything into an immutable [`App`].
//! [`App::run`] then resolves the command path, parses the remaining
//! tokens against the effective flag set, and invokes the matching
//! callback.

use std::io::Write;

use crate::command::{Builtin, Command};
use crate::completion;
use crate::context::Context;
use crate::error::Error;
use crate::flag::Flag;
use crate::parser;
use crate::resolver;

/// An immutable, fully-validated CLI application.
///
/// Built once via [`AppBuilder`]; the command tree is never mutated after
/// `build`, so parsing and completion generation are pure reads.
pub struct App {
    name: String,
    description: String,
    commands: Vec<Command>,
    global_flags: Vec<Flag>,
    allow_unknown_flags: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("global_flags", &self.global_flags)
            .field("allow_unknown_flags", &self.allow_unknown_flags)
            .finish_non_exhaustive()
    }
}

/// Builder for [`App`].
pub struct AppBuilder {
    name: String,
    description: String,
    commands: Vec<Command>,
    global_flags: Vec<Flag>,
    allow_unknown_flags: bool,
}

impl AppBuilder {
    /// Start building an application with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            commands: Vec::new(),
            global_flags: Vec::new(),
            allow_unknown_flags: false,
        }
    }

    /// Set the application description shown in the command list.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Register a top-level command.
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Add a flag available to every command. A command flag with the same
    /// name shadows the global one.
    pub fn global_flag(mut self, flag: Flag) -> Self {
        self.global_flags.push(flag);
        self
    }

    /// Accept unknown flags instead of returning [`Error::UnknownFlag`].
    /// Their values are stored as raw strings on the context.
    pub fn allow_unknown_flags(mut self) -> Self {
        self.allow_unknown_flags = true;
        self
    }

    /// Validate the tree and seal it into an immutable [`App`].
    ///
    /// This is the single point where the built-in `help` and `completion`
    /// commands are installed (unless shadowed by user commands of the
    /// same name), so repeated runs never re-register them.
    pub fn build(mut self) -> Result<App, Error> {
        validate_commands(&self.commands)?;
        for flag in &self.global_flags {
            if flag.name().is_empty() {
                return Err(Error::InvalidName(
                    "global flag name cannot be empty".to_string(),
                ));
            }
        }

        if !self.commands.iter().any(|c| c.name() == "help") {
            let mut help = Command::new("help").about("Show help for a command.");
            help.builtin = Builtin::Help;
            self.commands.push(help);
        }
        if !self.commands.iter().any(|c| c.name() == "completion") {
            let mut completion = Command::new("completion")
                .about("Generate shell completion script.")
                .usage("completion <bash|zsh|fish|powershell>");
            completion.builtin = Builtin::Completion;
            self.commands.push(completion);
        }

        Ok(App {
            name: self.name,
            description: self.description,
            commands: self.commands,
            global_flags: self.global_flags,
            allow_unknown_flags: self.allow_unknown_flags,
        })
    }
}

/// Reject empty names and duplicate sibling command names, recursively.
fn validate_commands(commands: &[Command]) -> Result<(), Error> {
    for (idx, cmd) in commands.iter().enumerate() {
        if cmd.name().is_empty() {
            return Err(Error::InvalidName("command name cannot be empty".to_string()));
        }
        for flag in cmd.flags() {
            if flag.name().is_empty() {
                return Err(Error::InvalidName(format!(
                    "flag name cannot be empty in command {:?}",
                    cmd.name()
                )));
            }
        }
        if commands[..idx].iter().any(|c| c.name() == cmd.name()) {
            return Err(Error::DuplicateCommand(cmd.name().to_string()));
        }
        validate_commands(cmd.subcommands())?;
    }
    Ok(())
}

impl App {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn global_flags(&self) -> &[Flag] {
        &self.global_flags
    }

    /// Parse `args` and execute the matching command, writing to stdout.
    /// Pass the process arguments without the program name.
    pub fn run(&self, args: &[String]) -> Result<(), Error> {
        let mut out = std::io::stdout().lock();
        self.run_with_output(args, &mut out)
    }

    /// Like [`App::run`], but writing all output to `out`.
    pub fn run_with_output(&self, args: &[String], out: &mut dyn Write) -> Result<(), Error> {
        if args.is_empty() {
            return self.print_command_list(out);
        }

        // Top-level --help / -h shows the command list.
        if args[0] == "--help" || args[0] == "-h" {
            return self.print_command_list(out);
        }

        let (cmd, rest) = resolver::resolve(&self.commands, args)?;

        // Any remaining --help / -h before a bare -- renders help for the
        // deepest command resolved so far instead of executing it.
        if resolver::wants_help(rest) {
            return self.print_command_help(cmd, out);
        }

        // A terminal command without a handler is a request for its own
        // help listing.
        if cmd.execute.is_none() && cmd.builtin == Builtin::None {
            return self.print_command_help(cmd, out);
        }

        let merged = self.effective_flags(cmd);
        let env: Vec<(String, String)> = std::env::vars().collect();
        let (positional, values) =
            parser::parse_with_env(&merged, rest, self.allow_unknown_flags, &env)?;

        match cmd.builtin {
            Builtin::Help => return self.run_help(&positional, out),
            Builtin::Completion => return self.run_completion(&positional, out),
            Builtin::None => {}
        }

        validate_positionals(cmd, &positional)?;

        tracing::debug!(command = cmd.name(), "executing command");
        let mut ctx = Context::new(cmd, positional, values, out);
        if let Some(execute) = &cmd.execute {
            execute(&mut ctx)?;
        }
        Ok(())
    }

    /// Generate a completion script for a shell identifier (one of `bash`,
    /// `zsh`, `fish`, `powershell`, case-sensitive).
    pub fn generate_completion(&self, ident: &str) -> Result<String, Error> {
        completion::generate(self, ident)
    }

    /// A command's own flags plus any global flags not shadowed by a
    /// same-named command flag.
    pub(crate) fn effective_flags(&self, cmd: &Command) -> Vec<Flag> {
        let mut merged = cmd.flags().to_vec();
        for global in &self.global_flags {
            if !cmd.flags().iter().any(|f| f.name() == global.name()) {
                merged.push(global.clone());
            }
        }
        merged
    }

    fn run_help(&self, positional: &[String], out: &mut dyn Write) -> Result<(), Error> {
        match positional.first() {
            Some(name) => {
                let cmd = self
                    .commands
                    .iter()
                    .find(|c| c.matches(name))
                    .ok_or_else(|| Error::CommandNotFound(name.clone()))?;
                self.print_command_help(cmd, out)
            }
            None => self.print_command_list(out),
        }
    }

    fn run_completion(&self, positional: &[String], out: &mut dyn Write) -> Result<(), Error> {
        match positional.first() {
            Some(ident) => {
                let script = completion::generate(self, ident)?;
                out.write_all(script.as_bytes())?;
                Ok(())
            }
            None => {
                writeln!(out, "Usage: {} completion <bash|zsh|fish|powershell>", self.name)?;
                Ok(())
            }
        }
    }

    /// Write the list of all commands to `out`.
    fn print_command_list(&self, out: &mut dyn Write) -> Result<(), Error> {
        write!(out, "Welcome to {}!", self.name)?;
        if !self.description.is_empty() {
            write!(out, " {}", self.description)?;
        }
        writeln!(out)?;
        writeln!(out, "Type 'help <command>' to get help with any command.")?;
        writeln!(out)?;
        for cmd in &self.commands {
            writeln!(out, "  {:<16} {}", cmd.name(), cmd.description())?;
        }

        if !self.global_flags.is_empty() {
            writeln!(out)?;
            writeln!(out, "Global Flags:")?;
            print_flag_list(&self.global_flags, out)?;
        }
        Ok(())
    }

    /// Write detailed help for a single command to `out`.
    fn print_command_help(&self, cmd: &Command, out: &mut dyn Write) -> Result<(), Error> {
        writeln!(out, "{} - {}", cmd.name(), cmd.description())?;

        if !cmd.usage.is_empty() {
            writeln!(out, "Usage: {}", cmd.usage)?;
        }

        if !cmd.aliases().is_empty() {
            writeln!(out, "Aliases: {}", cmd.aliases().join(", "))?;
        }

        if !cmd.subcommands().is_empty() {
            writeln!(out, "Commands:")?;
            for sub in cmd.subcommands() {
                writeln!(out, "  {:<16} {}", sub.name(), sub.description())?;
            }
        }

        if !cmd.flags().is_empty() {
            writeln!(out, "Flags:")?;
            print_flag_list(cmd.flags(), out)?;
        }

        if !self.global_flags.is_empty() {
            writeln!(out, "Global Flags:")?;
            print_flag_list(&self.global_flags, out)?;
        }

        if !cmd.example.is_empty() {
            writeln!(out, "Examples:")?;
            for line in cmd.example.lines() {
                writeln!(out, "  {line}")?;
            }
        }
        Ok(())
    }
}

/// Enforce the command's positional-argument constraints.
fn validate_positionals(cmd: &Command, positional: &[String]) -> Result<(), Error> {
    if let Some(validator) = &cmd.args_validator {
        return validator(positional).map_err(|e| Error::InvalidArgs(e.to_string()));
    }
    if let Some(min) = cmd.args_min {
        if positional.len() < min {
            return Err(Error::InvalidArgs(format!(
                "command {:?} expects at least {min} argument(s), got {}",
                cmd.name(),
                positional.len()
            )));
        }
    }
    if let Some(max) = cmd.args_max {
        if positional.len() > max {
            return Err(Error::InvalidArgs(format!(
                "command {:?} expects at most {max} argument(s), got {}",
                cmd.name(),
                positional.len()
            )));
        }
    }
    Ok(())
}

/// Write a formatted flag table to `out`.
fn print_flag_list(flags: &[Flag], out: &mut dyn Write) -> Result<(), Error> {
    for flag in flags {
        let label = match flag.short_char() {
            Some(short) => format!("-{short}, --{}", flag.name()),
            None => format!("--{}", flag.name()),
        };
        let required = if flag.is_required() { " (required)" } else { "" };
        let env = match flag.env_var() {
            Some(var) => format!(" [env: {var}]"),
            None => String::new(),
        };
        writeln!(
            out,
            "  {label} <{}>\t{}{required}{env}",
            flag.kind(),
            flag.description()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlagType;

    #[test]
    fn build_rejects_duplicate_commands() {
        let err = AppBuilder::new("myapp")
            .command(Command::new("test"))
            .command(Command::new("test"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand(ref n) if n == "test"));
    }

    #[test]
    fn build_rejects_empty_names() {
        let err = AppBuilder::new("myapp")
            .command(Command::new(""))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));

        let err = AppBuilder::new("myapp")
            .command(Command::new("test").flag(Flag::new("", FlagType::String)))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
    }

    #[test]
    fn build_validates_nested_siblings() {
        let err = AppBuilder::new("myapp")
            .command(
                Command::new("server")
                    .subcommand(Command::new("start"))
                    .subcommand(Command::new("start")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand(_)));
    }

    #[test]
    fn build_installs_builtins_once() {
        let app = AppBuilder::new("myapp")
            .command(Command::new("test"))
            .build()
            .unwrap();
        let help_count = app.commands().iter().filter(|c| c.name() == "help").count();
        let completion_count = app
            .commands()
            .iter()
            .filter(|c| c.name() == "completion")
            .count();
        assert_eq!(help_count, 1);
        assert_eq!(completion_count, 1);
    }

    #[test]
    fn user_help_command_shadows_builtin() {
        let app = AppBuilder::new("myapp")
            .command(Command::new("help").about("custom help"))
            .build()
            .unwrap();
        let helps: Vec<_> = app
            .commands()
            .iter()
            .filter(|c| c.name() == "help")
            .collect();
        assert_eq!(helps.len(), 1);
        assert_eq!(helps[0].description(), "custom help");
    }

    #[test]
    fn effective_flags_command_wins_ties() {
        let app = AppBuilder::new("myapp")
            .global_flag(Flag::new("verbose", FlagType::Bool).help("global"))
            .global_flag(Flag::new("config", FlagType::String))
            .command(Command::new("test").flag(Flag::new("verbose", FlagType::Count).help("local")))
            .build()
            .unwrap();

        let cmd = app.commands().iter().find(|c| c.name() == "test").unwrap();
        let merged = app.effective_flags(cmd);
        assert_eq!(merged.len(), 2);
        let verbose = merged.iter().find(|f| f.name() == "verbose").unwrap();
        assert_eq!(verbose.kind(), FlagType::Count);
        assert!(merged.iter().any(|f| f.name() == "config"));
    }
}
