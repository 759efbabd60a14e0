use thiserror::Error;

use crate::model::OptionKind;

/// The error surfaced when a parse pass fails.
///
/// Parsing is fail-fast: the first error aborts the entire pass and propagates to
/// the caller of the top-level parse entry point.
/// Querying an *unregistered* name is not a `ParseError` - it is a programmer error
/// and panics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The token named an option that was never registered.
    /// `name` is rendered as written on the command line (ex: `--foo`, `-x`, `'x' in -abx`).
    #[error("{name} is not a recognised flag or option name")]
    UnrecognizedOption {
        /// The unrecognized name, as written.
        name: String,
    },

    /// The automatic `help` command was given a name that is not a registered command.
    #[error("'{name}' is not a recognised command name")]
    UnrecognizedCommand {
        /// The unrecognized command name.
        name: String,
    },

    /// A value-bearing option (or the `help` command) reached the end of the stream
    /// before its value.
    #[error("missing argument for {target}")]
    MissingArgument {
        /// What required the argument (ex: `option --foo`, `option 'f' in -bsf`,
        /// `the help command`).
        target: String,
    },

    /// A flag was given an inline value (`--flag=x`); flags never take values.
    #[error("invalid value assignment for flag {name}")]
    InvalidFlagAssignment {
        /// The flag name, as written.
        name: String,
    },

    /// An equals form ended without a value (`--opt=`).
    #[error("missing value after {name}=")]
    EmptyValueAssignment {
        /// The option name, as written.
        name: String,
    },

    /// A raw token could not be coerced to the option's registered kind.
    #[error("cannot parse '{value}' as {kind}")]
    InvalidValueFormat {
        /// The offending raw token.
        value: String,
        /// The kind the token was expected to coerce to.
        kind: OptionKind,
    },
}
