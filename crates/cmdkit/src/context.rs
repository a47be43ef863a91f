//! Execution context handed to command callbacks.

use std::io::Write;

use indexmap::IndexMap;

use crate::command::Command;
use crate::flag::FlagValue;

/// Parsed flags, positional arguments and the output sink for one command
/// invocation. Values are stored typed, so the accessors below are direct
/// reads: a flag parsed as `Int` is readable via [`Context::int`] without
/// any re-parsing or accessor-time errors.
pub struct Context<'a> {
    command: &'a Command,
    args: Vec<String>,
    flags: IndexMap<String, FlagValue>,
    output: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        command: &'a Command,
        args: Vec<String>,
        flags: IndexMap<String, FlagValue>,
        output: &'a mut dyn Write,
    ) -> Self {
        Self {
            command,
            args,
            flags,
            output,
        }
    }

    /// Positional arguments that were not consumed as flags.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The command being executed.
    pub fn command(&self) -> &Command {
        self.command
    }

    /// The application's output sink.
    pub fn output(&mut self) -> &mut dyn Write {
        self.output
    }

    /// Whether the named flag resolved to any value (CLI, env or default).
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Raw typed value of the named flag, if set.
    pub fn value(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// String value of the named flag. Unknown-but-permitted flags are
    /// always stored as strings and read through here.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.flags.get(name) {
            Some(FlagValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean value of the named flag; `None` when unset.
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.flags.get(name) {
            Some(FlagValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Integer value of the named flag; `None` when unset.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.flags.get(name) {
            Some(FlagValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Float value of the named flag; `None` when unset.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.flags.get(name) {
            Some(FlagValue::Float(x)) => Some(*x),
            _ => None,
        }
    }

    /// Accumulated elements of a slice flag, in encounter order.
    pub fn string_slice(&self, name: &str) -> Option<&[String]> {
        match self.flags.get(name) {
            Some(FlagValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Accumulated count of a counter flag; 0 when unset.
    pub fn count(&self, name: &str) -> u64 {
        match self.flags.get(name) {
            Some(FlagValue::Count(n)) => *n,
            _ => 0,
        }
    }
}
