//! `argot` is a command line argument parser for Rust.
//!
//! `argot` follows the flag/option/command paradigm: a parser is configured with
//! valueless *flags*, typed value-bearing *options* (string, integer, float), and
//! named *commands* which delegate to their own nested parsers.
//! Parsing is a single left-to-right pass over the input tokens.
//!
//! Specifically, `argot` provides the following semantics:
//! * *Aliases*:
//! Every flag, option, and command accepts any number of space-separated aliases
//! (ex: `"verbose v"`).
//! All aliases refer to the same underlying record; activating one is visible via all.
//! * *Typed, repeatable options*:
//! Options collect every occurrence in order.
//! The "current" value is the final occurrence, or the registered fallback when absent.
//! * *Condensed short options*:
//! A single `-abc` token activates the shortcuts `a`, `b`, and `c` in sequence.
//! Value-bearing shortcuts consume subsequent tokens from the stream (ex: `-ab foo bar`).
//! * *Commands*:
//! A recognized command name hands the remainder of the stream to the command's parser.
//! Registering a command also activates an automatic `help <command>` command.
//! * *Terminal help/version*:
//! Help and version requests surface as a distinct [`ParseOutcome`] rather than an
//! unconditional process exit, so the engine stays callable from tests and embeddings.
//!
//! # Example
//! ```
//! use argot::Parser;
//!
//! let mut parser = Parser::new();
//! parser.add_flag("verbose v");
//! parser.add_string_option("out o", "a.out");
//! parser.parse_tokens(&["-v", "--out", "binary", "input.txt"]).unwrap();
//!
//! assert!(parser.found("verbose"));
//! assert_eq!(parser.string_value("out"), "binary");
//! assert_eq!(parser.args(), &["input.txt".to_string()]);
//! ```
#![deny(missing_docs)]
mod constant;
mod errors;
mod model;
mod parser;
mod store;
mod tokens;

pub use errors::ParseError;
pub use model::{OptionKind, ParseOutcome};
pub use parser::Parser;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
