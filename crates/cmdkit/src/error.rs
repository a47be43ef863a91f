use thiserror::Error;

/// Errors returned by the framework.
///
/// Every failure in this crate is a normal, expected outcome of malformed
/// input or configuration; nothing here panics. Variants are matchable by
/// kind and carry the offending command/flag name or literal in the message.
#[derive(Debug, Error)]
pub enum Error {
    /// A command with the same name already exists at this tree level.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),

    /// A command or flag was registered with an empty name.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A flag marked required was absent after CLI, env and default
    /// resolution.
    #[error("required flag not provided: --{0}")]
    RequiredFlag(String),

    /// A flag value failed type validation, a token had three or more
    /// leading dashes, or a value-taking flag ran out of tokens.
    #[error("invalid flag value: {0}")]
    InvalidFlagValue(String),

    /// A flag not declared on the command's effective flag set, with
    /// unknown flags disallowed.
    #[error("unknown flag: --{0}")]
    UnknownFlag(String),

    /// No top-level command matched the first argument.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// Completion was requested for an unrecognized shell identifier.
    #[error("unsupported shell: {0}")]
    UnsupportedShell(String),

    /// Positional arguments failed the command's count bounds or custom
    /// validation.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// Writing to the output sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A command callback returned an error.
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

impl Error {
    /// Short helper for the common "flag expected T, got V" shape.
    pub(crate) fn bad_value(flag: &str, expected: &str, got: &str) -> Self {
        Self::InvalidFlagValue(format!(
            "flag --{flag}: expected {expected}, got {got:?}"
        ))
    }
}
