//! Command tree nodes.
//!
//! Commands form a strict ownership tree: each node exclusively owns its
//! subcommand list. The tree is assembled fluently, validated and sealed by
//! [`AppBuilder::build`](crate::app::AppBuilder::build), and never mutated
//! afterwards; the parser, resolver and completion generators only read it.

use crate::context::Context;
use crate::flag::Flag;

/// Callback invoked when a command is dispatched.
pub type ExecuteFn = Box<dyn Fn(&mut Context<'_>) -> anyhow::Result<()>>;

/// Custom positional-argument validator, replacing the min/max bounds when
/// set.
pub type ArgsValidator = Box<dyn Fn(&[String]) -> anyhow::Result<()>>;

/// Marker for the commands installed by the application builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Builtin {
    #[default]
    None,
    Help,
    Completion,
}

/// A CLI command: metadata, flags, nested subcommands, and an optional
/// execution callback.
#[derive(Default)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) usage: String,
    pub(crate) example: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) flags: Vec<Flag>,
    pub(crate) subcommands: Vec<Command>,
    pub(crate) args_min: Option<usize>,
    pub(crate) args_max: Option<usize>,
    pub(crate) args_validator: Option<ArgsValidator>,
    pub(crate) execute: Option<ExecuteFn>,
    pub(crate) builtin: Builtin,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("flags", &self.flags)
            .field("subcommands", &self.subcommands)
            .field("has_execute", &self.execute.is_some())
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Create a command with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the one-line description shown in command listings.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set a custom usage line (e.g. `"greet [flags] <name>"`).
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Set an example block appended to the command's help.
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    /// Add an alternative name for the command.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Declare a flag on this command.
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Nest a subcommand under this command.
    pub fn subcommand(mut self, sub: Command) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Require at least `min` positional arguments.
    pub fn args_min(mut self, min: usize) -> Self {
        self.args_min = Some(min);
        self
    }

    /// Allow at most `max` positional arguments.
    pub fn args_max(mut self, max: usize) -> Self {
        self.args_max = Some(max);
        self
    }

    /// Install a custom positional-argument validator. When set, the
    /// min/max bounds are ignored.
    pub fn args_validator(
        mut self,
        validator: impl Fn(&[String]) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.args_validator = Some(Box::new(validator));
        self
    }

    /// Set the callback invoked when this command is dispatched. A command
    /// without one renders its own help when resolved.
    pub fn execute(
        mut self,
        callback: impl Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.execute = Some(Box::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    /// Whether `name` matches one of this command's aliases.
    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a == name)
    }

    /// Whether `name` matches the command name or an alias.
    pub(crate) fn matches(&self, name: &str) -> bool {
        self.name == name || self.has_alias(name)
    }

    /// Look up a direct subcommand by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_matching() {
        let cmd = Command::new("greet").alias("g").alias("hello");
        assert!(cmd.has_alias("g"));
        assert!(cmd.has_alias("hello"));
        assert!(!cmd.has_alias("nope"));
        assert!(cmd.matches("greet"));
        assert!(cmd.matches("g"));
    }

    #[test]
    fn subcommand_lookup_by_name_or_alias() {
        let cmd = Command::new("server")
            .subcommand(Command::new("start").alias("s"))
            .subcommand(Command::new("stop"));
        assert_eq!(cmd.find_subcommand("start").unwrap().name(), "start");
        assert_eq!(cmd.find_subcommand("s").unwrap().name(), "start");
        assert_eq!(cmd.find_subcommand("stop").unwrap().name(), "stop");
        assert!(cmd.find_subcommand("restart").is_none());
    }
}
