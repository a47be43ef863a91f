//! Shell completion script generation.
//!
//! All four backends consume the same substrate: a pre-order walk of the
//! command tree where each node contributes its canonical path (rooted at
//! `ROOT`), its effective flag set (command flags merged with global flags,
//! command flags winning name ties), and its direct children's names and
//! aliases. The backends differ only in how the target shell's completion
//! machinery wants that data expressed.

mod bash;
mod fish;
mod powershell;
mod zsh;

use std::fmt;

use crate::app::App;
use crate::error::Error;
use crate::flag::Flag;

/// Shells with a completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

impl Shell {
    /// Parse a shell identifier. Matching is case-sensitive: anything other
    /// than `bash`, `zsh`, `fish` or `powershell` is rejected.
    pub fn from_ident(ident: &str) -> Result<Self, Error> {
        match ident {
            "bash" => Ok(Self::Bash),
            "zsh" => Ok(Self::Zsh),
            "fish" => Ok(Self::Fish),
            "powershell" => Ok(Self::PowerShell),
            other => Err(Error::UnsupportedShell(other.to_string())),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ident = match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
            Self::PowerShell => "powershell",
        };
        f.write_str(ident)
    }
}

/// Generate a completion script for a shell identifier.
pub fn generate(app: &App, ident: &str) -> Result<String, Error> {
    Ok(script(app, Shell::from_ident(ident)?))
}

/// Generate a completion script for a known shell.
pub fn script(app: &App, shell: Shell) -> String {
    tracing::debug!(%shell, "generating completion script");
    let mut out = Script::default();
    match shell {
        Shell::Bash => bash::write(app, &mut out),
        Shell::Zsh => zsh::write(app, &mut out),
        Shell::Fish => fish::write(app, &mut out),
        Shell::PowerShell => powershell::write(app, &mut out),
    }
    out.into_inner()
}

/// Accumulates script text. Writing into a `String` cannot fail, so the
/// backends stay free of error plumbing.
#[derive(Default)]
pub(crate) struct Script {
    buf: String,
}

impl Script {
    pub(crate) fn push(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn into_inner(self) -> String {
        self.buf
    }
}

/// Command flags merged with global flags, deduplicated by name. Command
/// flags take precedence.
pub(crate) fn merged_flags<'a>(cmd_flags: &'a [Flag], global: &'a [Flag]) -> Vec<&'a Flag> {
    let mut flags: Vec<&Flag> = cmd_flags.iter().collect();
    for gf in global {
        if !cmd_flags.iter().any(|f| f.name() == gf.name()) {
            flags.push(gf);
        }
    }
    flags
}

/// Flag option tokens (`--name`, `-x`) for a command's effective flag set.
pub(crate) fn flag_tokens(cmd_flags: &[Flag], global: &[Flag]) -> Vec<String> {
    let mut opts = Vec::new();
    for flag in merged_flags(cmd_flags, global) {
        opts.push(format!("--{}", flag.name()));
        if let Some(short) = flag.short_char() {
            opts.push(format!("-{short}"));
        }
    }
    opts
}
