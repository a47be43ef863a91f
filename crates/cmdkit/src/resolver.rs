//! Subcommand path resolution.
//!
//! Before any flag parsing happens, the raw token list is walked against
//! the command tree to find the deepest matching command. Aliases match at
//! every level; a token starting with `-` stops the descent; an unmatched
//! token is left for positional handling by the deepest command resolved
//! so far.

use crate::command::Command;
use crate::error::Error;

/// Resolve the deepest matching command for `tokens`.
///
/// The first token must name a top-level command (by name or alias);
/// otherwise [`Error::CommandNotFound`] is returned. Returns the target
/// command and the tokens remaining after the consumed command path.
pub fn resolve<'a>(
    commands: &'a [Command],
    tokens: &'a [String],
) -> Result<(&'a Command, &'a [String]), Error> {
    let Some(first) = tokens.first() else {
        return Err(Error::CommandNotFound(String::new()));
    };

    let mut current = commands
        .iter()
        .find(|c| c.matches(first))
        .ok_or_else(|| Error::CommandNotFound(first.clone()))?;
    let mut rest = &tokens[1..];

    // Descend while the next token names a child. Flags terminate
    // subcommand matching; unmatched tokens fall through as positionals.
    while !current.subcommands.is_empty() && !rest.is_empty() {
        let next = rest[0].as_str();
        if next.starts_with('-') {
            break;
        }
        match current.find_subcommand(next) {
            Some(child) => {
                current = child;
                rest = &rest[1..];
            }
            None => break,
        }
    }

    tracing::debug!(command = current.name(), remaining = rest.len(), "resolved command path");
    Ok((current, rest))
}

/// Whether any token before a bare `--` requests help.
///
/// Tokens after the separator are user data and never trigger help.
pub fn wants_help(tokens: &[String]) -> bool {
    for token in tokens {
        if token == "--" {
            return false;
        }
        if token == "--help" || token == "-h" {
            return true;
        }
    }
    false
}
