use std::collections::HashMap;
use std::env;

use crate::constant::*;
use crate::errors::ParseError;
use crate::model::{OptionKind, ParseOutcome};
use crate::parser::interface::{ConsoleInterface, UserInterface};
use crate::store::{parse_float, parse_integer, OptionValue};
use crate::tokens::TokenStream;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

type CommandCallback = Box<dyn FnMut(&str, &Parser)>;

/// The command line parser.
///
/// A `Parser` owns its registered flags/options, its registered commands (each backed
/// by a nested `Parser`), and - after a parse pass - the accumulated positional
/// arguments and the matched command, if any.
///
/// ### Example
/// ```
/// use argot::Parser;
///
/// let mut parser = Parser::new();
/// parser.add_flag("verbose v");
/// parser.add_int_option("port p", 8080);
/// parser.parse_tokens(&["-vv", "--port", "9000"]).unwrap();
///
/// assert_eq!(parser.count("verbose"), 2);
/// assert_eq!(parser.int_value("p"), 9000);
/// ```
#[derive(Default)]
pub struct Parser {
    helptext: Option<String>,
    version: Option<String>,
    callback: Option<CommandCallback>,
    enable_help_command: bool,
    args: Vec<String>,
    matched_command: Option<(String, usize)>,
    options: Vec<OptionValue>,
    option_map: HashMap<String, usize>,
    commands: Vec<Parser>,
    command_map: HashMap<String, usize>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser{..}").finish()
    }
}

enum Flow {
    Continue,
    Exit(String),
}

impl Parser {
    /// Create an empty parser: no flags, no options, no commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document the help text for this parser.
    ///
    /// Setting a help text activates an automatic `--help` flag that terminates the
    /// parse with the text (also an automatic `-h` shortcut, unless `h` is registered
    /// by another flag/option).
    pub fn helptext(&mut self, text: impl Into<String>) -> &mut Self {
        self.helptext.replace(text.into());
        self
    }

    /// Document the version string for this parser.
    ///
    /// Setting a version string activates an automatic `--version` flag that terminates
    /// the parse with the string (also an automatic `-v` shortcut, unless `v` is
    /// registered by another flag/option).
    pub fn version(&mut self, text: impl Into<String>) -> &mut Self {
        self.version.replace(text.into());
        self
    }

    /// Enable or disable the automatic `help <command>` command.
    ///
    /// Defaults to false, but is forced to true whenever a command is registered.
    /// Call with `false` *after* registering commands to opt out.
    pub fn enable_help_command(&mut self, enabled: bool) -> &mut Self {
        self.enable_help_command = enabled;
        self
    }

    /// Install the command callback.
    ///
    /// Only meaningful on a parser registered via [`Parser::add_command`]: when the
    /// command is found by the parent parser, the callback fires with the command name
    /// and the command's parser, immediately after the command finishes parsing.
    ///
    /// ### Example
    /// ```
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use argot::Parser;
    ///
    /// let log: Rc<RefCell<Vec<String>>> = Rc::default();
    /// let sink = Rc::clone(&log);
    ///
    /// let mut parser = Parser::new();
    /// parser
    ///     .add_command("run")
    ///     .callback(move |name, _command| sink.borrow_mut().push(name.to_string()));
    /// parser.parse_tokens(&["run"]).unwrap();
    ///
    /// assert_eq!(log.borrow().as_slice(), &["run".to_string()]);
    /// ```
    pub fn callback(&mut self, callback: impl FnMut(&str, &Parser) + 'static) -> &mut Self {
        self.callback.replace(Box::new(callback));
        self
    }

    /// Register a flag, i.e. a valueless option that is either present or absent.
    /// Check for it with [`Parser::found`] or [`Parser::count`].
    ///
    /// `aliases` accepts any number of space-separated aliases and single-character
    /// shortcuts; all of them refer to the same underlying record.
    ///
    /// ### Example
    /// ```
    /// use argot::Parser;
    ///
    /// let mut parser = Parser::new();
    /// parser.add_flag("verbose v");
    /// parser.parse_tokens(&["--verbose", "-v"]).unwrap();
    ///
    /// assert_eq!(parser.count("verbose"), 2);
    /// ```
    pub fn add_flag(&mut self, aliases: &str) -> &mut Self {
        self.register(aliases, OptionValue::flag())
    }

    /// Register a string-valued option.
    ///
    /// `aliases` accepts any number of space-separated aliases and single-character
    /// shortcuts. `fallback` is the value reported when the option is never supplied.
    ///
    /// ### Example
    /// ```
    /// use argot::Parser;
    ///
    /// let mut parser = Parser::new();
    /// parser.add_string_option("out o", "a.out");
    ///
    /// parser.parse_tokens(&[]).unwrap();
    /// assert_eq!(parser.string_value("out"), "a.out");
    ///
    /// parser.parse_tokens(&["-o", "binary"]).unwrap();
    /// assert_eq!(parser.string_value("out"), "binary");
    /// ```
    pub fn add_string_option(&mut self, aliases: &str, fallback: impl Into<String>) -> &mut Self {
        self.register(aliases, OptionValue::string(fallback))
    }

    /// Register an integer-valued option; values are parsed as signed 64-bit integers,
    /// accepting decimal or `0x`/`0o`/`0b` notation.
    ///
    /// `aliases` accepts any number of space-separated aliases and single-character
    /// shortcuts. `fallback` is the value reported when the option is never supplied.
    pub fn add_int_option(&mut self, aliases: &str, fallback: i64) -> &mut Self {
        self.register(aliases, OptionValue::int(fallback))
    }

    /// Register a float-valued option; values are parsed as 64-bit floats.
    ///
    /// `aliases` accepts any number of space-separated aliases and single-character
    /// shortcuts. `fallback` is the value reported when the option is never supplied.
    pub fn add_float_option(&mut self, aliases: &str, fallback: f64) -> &mut Self {
        self.register(aliases, OptionValue::float(fallback))
    }

    fn register(&mut self, aliases: &str, option: OptionValue) -> &mut Self {
        let index = self.options.len();
        self.options.push(option);

        for alias in aliases.split_whitespace() {
            self.option_map.insert(alias.to_string(), index);
        }

        self
    }

    /// Register a command, returning the command's parser for configuration.
    ///
    /// `aliases` accepts any number of space-separated aliases, all referring to the
    /// same command parser. Registering a command also enables the automatic
    /// `help <command>` command.
    ///
    /// During a parse pass, a token matching a command alias (before any positional
    /// argument has been seen) hands the *remainder* of the stream to the command's
    /// parser; the parent records the match and stops.
    ///
    /// ### Example
    /// ```
    /// use argot::Parser;
    ///
    /// let mut parser = Parser::new();
    /// let command = parser.add_command("start st");
    /// command.add_flag("force f");
    ///
    /// parser.parse_tokens(&["st", "--force", "now"]).unwrap();
    ///
    /// assert_eq!(parser.matched_command_name(), Some("st"));
    /// let command = parser.matched_command_parser().unwrap();
    /// assert!(command.found("force"));
    /// assert_eq!(command.args(), &["now".to_string()]);
    /// ```
    pub fn add_command(&mut self, aliases: &str) -> &mut Parser {
        self.enable_help_command = true;
        let index = self.commands.len();
        self.commands.push(Parser::new());

        for alias in aliases.split_whitespace() {
            self.command_map.insert(alias.to_string(), index);
        }

        &mut self.commands[index]
    }

    /// Parse the given tokens.
    /// The token list excludes the program name; the caller strips it.
    ///
    /// Parsing is fail-fast: the first error aborts the whole pass.
    /// A help/version request surfaces as [`ParseOutcome::Exit`] so the caller decides
    /// whether to print-and-exit or print-and-return.
    ///
    /// ### Example
    /// ```
    /// use argot::{ParseOutcome, Parser};
    ///
    /// let mut parser = Parser::new();
    /// parser.helptext("Usage: example...");
    ///
    /// let outcome = parser.parse_tokens(&["--help"]).unwrap();
    /// assert_eq!(outcome, ParseOutcome::Exit("Usage: example...".to_string()));
    /// ```
    pub fn parse_tokens(&mut self, tokens: &[&str]) -> Result<ParseOutcome, ParseError> {
        let mut stream = TokenStream::new(tokens);
        self.parse_stream(&mut stream)
    }

    /// Parse the program's command line arguments ([`env::args`], program name
    /// stripped), printing and exiting as appropriate.
    ///
    /// On a help/version request, prints the text to stdout and exits with code `0`.
    /// On a parse error, prints the error to stderr and exits with code `1`.
    pub fn parse(&mut self) {
        let tokens: Vec<String> = env::args().skip(1).collect();
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();

        match self.run(tokens.as_slice(), &ConsoleInterface::default()) {
            Ok(()) => {}
            Err(exit_code) => {
                std::process::exit(exit_code);
            }
        };
    }

    fn run(&mut self, tokens: &[&str], user_interface: &dyn UserInterface) -> Result<(), i32> {
        match self.parse_tokens(tokens) {
            Ok(ParseOutcome::Complete) => Ok(()),
            Ok(ParseOutcome::Exit(message)) => {
                user_interface.print(message);
                Err(0)
            }
            Err(error) => {
                user_interface.print_error(error);
                Err(1)
            }
        }
    }

    fn parse_stream(&mut self, stream: &mut TokenStream) -> Result<ParseOutcome, ParseError> {
        while stream.has_next() {
            let token = stream.next();

            #[cfg(feature = "tracing_debug")]
            {
                debug!("dispatching token: {token}");
            }

            // A '--' terminator turns off all further option parsing.
            if token == TERMINATOR {
                while stream.has_next() {
                    self.args.push(stream.next().to_string());
                }
                break;
            }

            // A long-form option or flag, such as: --initial, --initial .., --initial=..
            if let Some(body) = token.strip_prefix("--") {
                if let Flow::Exit(message) = self.parse_long(body, stream)? {
                    return Ok(ParseOutcome::Exit(message));
                }
                continue;
            }

            // A short-form option or flag, such as: -i, -i .., -i=.., -iv ..
            // A bare '-' or a negative number is a positional argument, not an option.
            if let Some(body) = token.strip_prefix('-') {
                if body.is_empty() || body.starts_with(|c: char| c.is_ascii_digit()) {
                    self.args.push(token.to_string());
                } else if let Flow::Exit(message) = self.parse_short(body, stream)? {
                    return Ok(ParseOutcome::Exit(message));
                }
                continue;
            }

            // Commands are only eligible until the first positional argument.
            if self.args.is_empty() {
                if let Some(&index) = self.command_map.get(token) {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("matched command: {token}");
                    }

                    self.matched_command.replace((token.to_string(), index));
                    let command = &mut self.commands[index];

                    if let ParseOutcome::Exit(message) = command.parse_stream(stream)? {
                        return Ok(ParseOutcome::Exit(message));
                    }

                    if let Some(mut callback) = command.callback.take() {
                        callback(token, &*command);
                        self.commands[index].callback.replace(callback);
                    }

                    break;
                }

                if self.enable_help_command && token == HELP_NAME {
                    if !stream.has_next() {
                        return Err(ParseError::MissingArgument {
                            target: "the help command".to_string(),
                        });
                    }

                    let name = stream.next();
                    return match self.command_map.get(name) {
                        Some(&index) => {
                            Ok(ParseOutcome::Exit(self.commands[index].rendered_helptext()))
                        }
                        None => Err(ParseError::UnrecognizedCommand {
                            name: name.to_string(),
                        }),
                    };
                }
            }

            // Anything else is a positional argument.
            self.args.push(token.to_string());
        }

        Ok(ParseOutcome::Complete)
    }

    fn parse_long(&mut self, body: &str, stream: &mut TokenStream) -> Result<Flow, ParseError> {
        if let Some((name, value)) = body.split_once('=') {
            self.parse_equals("--", name, value)?;
            return Ok(Flow::Continue);
        }

        if let Some(&index) = self.option_map.get(body) {
            let option = &mut self.options[index];
            option.increment();

            if option.is_flag() {
                return Ok(Flow::Continue);
            }
            if !stream.has_next() {
                return Err(ParseError::MissingArgument {
                    target: format!("option --{body}"),
                });
            }

            option.try_set_value(stream.next())?;
            return Ok(Flow::Continue);
        }

        if body == HELP_NAME && self.helptext.is_some() {
            return Ok(Flow::Exit(self.rendered_helptext()));
        }
        if body == VERSION_NAME && self.version.is_some() {
            return Ok(Flow::Exit(self.rendered_version()));
        }

        Err(ParseError::UnrecognizedOption {
            name: format!("--{body}"),
        })
    }

    // Walk the characters individually to support condensed bundles with trailing
    // values, such as: -abc foo bar.
    fn parse_short(&mut self, body: &str, stream: &mut TokenStream) -> Result<Flow, ParseError> {
        if let Some((name, value)) = body.split_once('=') {
            self.parse_equals("-", name, value)?;
            return Ok(Flow::Continue);
        }

        for shortcut in body.chars() {
            let name = shortcut.to_string();

            if let Some(&index) = self.option_map.get(&name) {
                let option = &mut self.options[index];
                option.increment();

                if option.is_flag() {
                    continue;
                }
                if !stream.has_next() {
                    return Err(ParseError::MissingArgument {
                        target: format!("option {}", display_short(shortcut, body)),
                    });
                }

                option.try_set_value(stream.next())?;
                continue;
            }

            if shortcut == HELP_SHORT && self.helptext.is_some() {
                return Ok(Flow::Exit(self.rendered_helptext()));
            }
            if shortcut == VERSION_SHORT && self.version.is_some() {
                return Ok(Flow::Exit(self.rendered_version()));
            }

            return Err(ParseError::UnrecognizedOption {
                name: display_short(shortcut, body),
            });
        }

        Ok(Flow::Continue)
    }

    // Shared by the long and short equals forms: --name=value, -n=value.
    // Only this parser's registry is consulted, never a parent's or child's.
    fn parse_equals(&mut self, prefix: &str, name: &str, value: &str) -> Result<(), ParseError> {
        let index = match self.option_map.get(name) {
            Some(&index) => index,
            None => {
                return Err(ParseError::UnrecognizedOption {
                    name: format!("{prefix}{name}"),
                })
            }
        };

        let option = &mut self.options[index];

        if option.is_flag() {
            return Err(ParseError::InvalidFlagAssignment {
                name: format!("{prefix}{name}"),
            });
        }
        if value.is_empty() {
            return Err(ParseError::EmptyValueAssignment {
                name: format!("{prefix}{name}"),
            });
        }

        option.try_set_value(value)?;
        option.increment();
        Ok(())
    }

    fn rendered_helptext(&self) -> String {
        self.helptext.as_deref().unwrap_or("").trim().to_string()
    }

    fn rendered_version(&self) -> String {
        self.version.as_deref().unwrap_or("").trim().to_string()
    }

    fn option(&self, name: &str) -> &OptionValue {
        match self.option_map.get(name) {
            Some(&index) => &self.options[index],
            None => panic!("'{name}' is not a registered flag or option name"),
        }
    }

    /// The number of times the flag/option was found.
    /// Any registered alias can be used as `name`.
    ///
    /// Panics if `name` is not a registered flag or option name.
    pub fn count(&self, name: &str) -> usize {
        self.option(name).count()
    }

    /// Whether the flag/option was found at least once.
    /// Any registered alias can be used as `name`.
    ///
    /// Panics if `name` is not a registered flag or option name.
    pub fn found(&self, name: &str) -> bool {
        self.option(name).found()
    }

    /// The current value of a string-valued option: the final occurrence, or the
    /// fallback when the option was never supplied.
    ///
    /// Panics if `name` is not a registered string-valued option name.
    pub fn string_value(&self, name: &str) -> &str {
        match self.option(name).last_string() {
            Some(value) => value,
            None => panic!("'{name}' is not a string-valued option"),
        }
    }

    /// The current value of an integer-valued option: the final occurrence, or the
    /// fallback when the option was never supplied.
    ///
    /// Panics if `name` is not a registered integer-valued option name.
    pub fn int_value(&self, name: &str) -> i64 {
        match self.option(name).last_int() {
            Some(value) => value,
            None => panic!("'{name}' is not an integer-valued option"),
        }
    }

    /// The current value of a float-valued option: the final occurrence, or the
    /// fallback when the option was never supplied.
    ///
    /// Panics if `name` is not a registered float-valued option name.
    pub fn float_value(&self, name: &str) -> f64 {
        match self.option(name).last_float() {
            Some(value) => value,
            None => panic!("'{name}' is not a float-valued option"),
        }
    }

    /// Every value collected by a string-valued option, in occurrence order.
    ///
    /// Panics if `name` is not a registered string-valued option name.
    pub fn string_values(&self, name: &str) -> &[String] {
        match self.option(name).strings() {
            Some(values) => values,
            None => panic!("'{name}' is not a string-valued option"),
        }
    }

    /// Every value collected by an integer-valued option, in occurrence order.
    ///
    /// Panics if `name` is not a registered integer-valued option name.
    pub fn int_values(&self, name: &str) -> &[i64] {
        match self.option(name).ints() {
            Some(values) => values,
            None => panic!("'{name}' is not an integer-valued option"),
        }
    }

    /// Every value collected by a float-valued option, in occurrence order.
    ///
    /// Panics if `name` is not a registered float-valued option name.
    pub fn float_values(&self, name: &str) -> &[f64] {
        match self.option(name).floats() {
            Some(values) => values,
            None => panic!("'{name}' is not a float-valued option"),
        }
    }

    /// The positional arguments, in the order they were seen.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The positional arguments parsed as integers.
    /// Fails atomically on the first token that is not a well-formed integer.
    ///
    /// ### Example
    /// ```
    /// use argot::Parser;
    ///
    /// let mut parser = Parser::new();
    /// parser.parse_tokens(&["12", "-7"]).unwrap();
    ///
    /// assert_eq!(parser.args_as_ints().unwrap(), vec![12, -7]);
    /// ```
    pub fn args_as_ints(&self) -> Result<Vec<i64>, ParseError> {
        self.args
            .iter()
            .map(|arg| {
                parse_integer(arg).ok_or_else(|| ParseError::InvalidValueFormat {
                    value: arg.clone(),
                    kind: OptionKind::Int,
                })
            })
            .collect()
    }

    /// The positional arguments parsed as floats.
    /// Fails atomically on the first token that is not a well-formed float.
    pub fn args_as_floats(&self) -> Result<Vec<f64>, ParseError> {
        self.args
            .iter()
            .map(|arg| {
                parse_float(arg).ok_or_else(|| ParseError::InvalidValueFormat {
                    value: arg.clone(),
                    kind: OptionKind::Float,
                })
            })
            .collect()
    }

    /// The name of the matched command, if the parse pass found one.
    pub fn matched_command_name(&self) -> Option<&str> {
        self.matched_command.as_ref().map(|(name, _)| name.as_str())
    }

    /// The parser of the matched command, if the parse pass found one.
    pub fn matched_command_parser(&self) -> Option<&Parser> {
        self.matched_command
            .as_ref()
            .map(|(_, index)| &self.commands[*index])
    }
}

fn display_short(shortcut: char, bundle: &str) -> String {
    if bundle.chars().count() > 1 {
        format!("'{shortcut}' in -{bundle}")
    } else {
        format!("-{bundle}")
    }
}

impl std::fmt::Display for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = Vec::default();

        lines.push("Options:".to_string());
        if self.option_map.is_empty() {
            lines.push("  [none]".to_string());
        } else {
            let mut names: Vec<&String> = self.option_map.keys().collect();
            names.sort();

            for name in names {
                let option = &self.options[self.option_map[name.as_str()]];
                lines.push(format!(
                    "  {name} [{kind}]: {state}",
                    kind = option.kind(),
                    state = option.describe(),
                ));
            }
        }

        lines.push("\nArguments:".to_string());
        if self.args.is_empty() {
            lines.push("  [none]".to_string());
        } else {
            for arg in &self.args {
                lines.push(format!("  {arg}"));
            }
        }

        lines.push("\nCommand:".to_string());
        match &self.matched_command {
            Some((name, _)) => lines.push(format!("  {name}")),
            None => lines.push("  [none]".to_string()),
        }

        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::{thread_rng, Rng};
    use rstest::rstest;

    use super::*;
    use crate::parser::interface::util::InMemoryInterface;
    use crate::test::assert_contains;

    #[test]
    fn aliases_share_one_record() {
        // Setup
        let mut parser = Parser::new();
        parser.add_flag("verbose v");

        // Execute
        parser.parse_tokens(&["--verbose", "-v", "-v"]).unwrap();

        // Verify
        assert_eq!(parser.count("verbose"), 3);
        assert_eq!(parser.count("v"), 3);
    }

    #[test]
    fn reregistration_overwrites_per_alias() {
        // Re-registering 'b' leaves 'bar' pointing at the old record.
        let mut parser = Parser::new();
        parser.add_string_option("bar b", "old");
        parser.add_string_option("b", "new");

        parser.parse_tokens(&["-b", "value"]).unwrap();

        assert_eq!(parser.string_value("b"), "value");
        assert_eq!(parser.string_value("bar"), "old");
        assert!(!parser.found("bar"));
    }

    #[test]
    fn random_flag_occurrences() {
        for _ in 0..100 {
            let n: usize = thread_rng().gen_range(0..20);
            let mut parser = Parser::new();
            parser.add_flag("bool");
            let tokens: Vec<&str> = (0..n).map(|_| "--bool").collect();

            parser.parse_tokens(tokens.as_slice()).unwrap();

            assert_eq!(parser.count("bool"), n);
            assert_eq!(parser.found("bool"), n > 0);
        }
    }

    #[rstest]
    #[case(vec!["--opt", "a", "--opt", "c"])]
    #[case(vec!["-o", "a", "-o", "c"])]
    #[case(vec!["--opt=a", "-o=c"])]
    fn string_option_last_wins(#[case] tokens: Vec<&str>) {
        // Setup
        let mut parser = Parser::new();
        parser.add_string_option("opt o", "default");

        // Execute
        parser.parse_tokens(tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(parser.count("opt"), 2);
        assert_eq!(parser.string_value("opt"), "c");
        assert_eq!(
            parser.string_values("opt"),
            &["a".to_string(), "c".to_string()]
        );
    }

    #[rstest]
    #[case("--opt", "-202", -202)]
    #[case("--opt", "0x1A", 26)]
    #[case("--opt", "0o17", 15)]
    #[case("--opt", "0b101", 5)]
    #[case("--opt", "+101", 101)]
    fn int_option_grammar(#[case] option: &str, #[case] value: &str, #[case] expected: i64) {
        let mut parser = Parser::new();
        parser.add_int_option("opt o", 101);

        parser.parse_tokens(&[option, value]).unwrap();

        assert_eq!(parser.int_value("opt"), expected);
    }

    #[test]
    fn int_option_malformed() {
        let mut parser = Parser::new();
        parser.add_int_option("opt", 101);

        let error = parser.parse_tokens(&["--opt", "202x"]).unwrap_err();

        assert_eq!(
            error,
            ParseError::InvalidValueFormat {
                value: "202x".to_string(),
                kind: OptionKind::Int,
            }
        );
    }

    #[test]
    fn float_option_fallback_and_value() {
        let mut parser = Parser::new();
        parser.add_float_option("opt o", 1.1);

        assert_eq!(parser.float_value("opt"), 1.1);

        parser.parse_tokens(&["-o", "2.2", "-o", "-3.3"]).unwrap();

        assert_eq!(parser.float_value("opt"), -3.3);
        assert_eq!(parser.float_values("opt"), &[2.2, -3.3]);
    }

    #[test]
    fn condensed_bundle_consumes_stream_tokens() {
        // Setup
        let mut parser = Parser::new();
        parser.add_flag("bool b");
        parser.add_string_option("string s", "default");
        parser.add_int_option("int i", 101);
        parser.add_float_option("float f", 1.1);

        // Execute
        parser
            .parse_tokens(&["-bsif", "value", "202", "2.2"])
            .unwrap();

        // Verify
        assert!(parser.found("bool"));
        assert_eq!(parser.string_value("string"), "value");
        assert_eq!(parser.int_value("int"), 202);
        assert_eq!(parser.float_value("float"), 2.2);
        assert!(parser.args().is_empty());
    }

    #[test]
    fn condensed_bundle_repeated_flags() {
        let mut parser = Parser::new();
        parser.add_flag("a");
        parser.add_flag("b");

        parser.parse_tokens(&["-aaba"]).unwrap();

        assert_eq!(parser.count("a"), 3);
        assert_eq!(parser.count("b"), 1);
    }

    #[rstest]
    #[case(vec!["-"], vec!["-"])]
    #[case(vec!["-123"], vec!["-123"])]
    #[case(vec!["-1.5"], vec!["-1.5"])]
    #[case(vec!["foo", "-7", "bar"], vec!["foo", "-7", "bar"])]
    fn dash_and_negative_numbers_are_positional(
        #[case] tokens: Vec<&str>,
        #[case] expected: Vec<&str>,
    ) {
        let mut parser = Parser::new();

        parser.parse_tokens(tokens.as_slice()).unwrap();

        let expected: Vec<String> = expected.into_iter().map(|s| s.to_string()).collect();
        assert_eq!(parser.args(), expected.as_slice());
    }

    #[test]
    fn terminator_stops_option_parsing() {
        let mut parser = Parser::new();
        parser.add_flag("bool");

        parser
            .parse_tokens(&["--bool", "--", "--bool", "-x", "help"])
            .unwrap();

        assert_eq!(parser.count("bool"), 1);
        assert_eq!(
            parser.args(),
            &[
                "--bool".to_string(),
                "-x".to_string(),
                "help".to_string()
            ]
        );
    }

    #[rstest]
    #[case(vec!["--nope"], "--nope")]
    #[case(vec!["-x"], "-x")]
    #[case(vec!["-ax"], "'x' in -ax")]
    #[case(vec!["--nope=1"], "--nope")]
    #[case(vec!["-x=1"], "-x")]
    fn unrecognized_option(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        let mut parser = Parser::new();
        parser.add_flag("a");

        let error = parser.parse_tokens(tokens.as_slice()).unwrap_err();

        assert_eq!(
            error,
            ParseError::UnrecognizedOption {
                name: expected.to_string()
            }
        );
    }

    #[rstest]
    #[case(vec!["--opt"], "option --opt")]
    #[case(vec!["-o"], "option -o")]
    #[case(vec!["-ao"], "option 'o' in -ao")]
    fn missing_argument(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        let mut parser = Parser::new();
        parser.add_flag("a");
        parser.add_string_option("opt o", "default");

        let error = parser.parse_tokens(tokens.as_slice()).unwrap_err();

        assert_eq!(
            error,
            ParseError::MissingArgument {
                target: expected.to_string()
            }
        );
    }

    #[test]
    fn equals_form_rejects_flags_and_empty_values() {
        let mut parser = Parser::new();
        parser.add_flag("bool b");
        parser.add_string_option("opt o", "default");

        assert_matches!(
            parser.parse_tokens(&["--bool=1"]).unwrap_err(),
            ParseError::InvalidFlagAssignment { name } if name == "--bool"
        );
        assert_matches!(
            parser.parse_tokens(&["-b=1"]).unwrap_err(),
            ParseError::InvalidFlagAssignment { name } if name == "-b"
        );
        assert_matches!(
            parser.parse_tokens(&["--opt="]).unwrap_err(),
            ParseError::EmptyValueAssignment { name } if name == "--opt"
        );
    }

    #[test]
    fn equals_form_splits_on_first_delimiter() {
        let mut parser = Parser::new();
        parser.add_string_option("opt", "default");

        parser.parse_tokens(&["--opt=a=b"]).unwrap();

        assert_eq!(parser.string_value("opt"), "a=b");
    }

    #[rstest]
    #[case(vec!["--help"])]
    #[case(vec!["-h"])]
    fn automatic_help(#[case] tokens: Vec<&str>) {
        let mut parser = Parser::new();
        parser.helptext("  Usage: example...  ");

        let outcome = parser.parse_tokens(tokens.as_slice()).unwrap();

        assert_eq!(outcome, ParseOutcome::Exit("Usage: example...".to_string()));
    }

    #[rstest]
    #[case(vec!["--version"])]
    #[case(vec!["-v"])]
    fn automatic_version(#[case] tokens: Vec<&str>) {
        let mut parser = Parser::new();
        parser.version("1.2.3");

        let outcome = parser.parse_tokens(tokens.as_slice()).unwrap();

        assert_eq!(outcome, ParseOutcome::Exit("1.2.3".to_string()));
    }

    #[test]
    fn automatic_help_requires_configuration() {
        let mut parser = Parser::new();

        assert_matches!(
            parser.parse_tokens(&["--help"]).unwrap_err(),
            ParseError::UnrecognizedOption { name } if name == "--help"
        );
    }

    #[test]
    fn registered_options_shadow_automatic_shortcuts() {
        // A registered 'v' flag wins over the automatic version shortcut.
        let mut parser = Parser::new();
        parser.version("1.2.3");
        parser.add_flag("v");

        let outcome = parser.parse_tokens(&["-v"]).unwrap();

        assert_eq!(outcome, ParseOutcome::Complete);
        assert_eq!(parser.count("v"), 1);
    }

    #[test]
    fn command_matching() {
        // Setup
        let mut parser = Parser::new();
        let command = parser.add_command("cmd c");
        command.add_string_option("opt", "default");

        // Execute
        parser
            .parse_tokens(&["cmd", "foo", "--opt", "value"])
            .unwrap();

        // Verify
        assert_eq!(parser.matched_command_name(), Some("cmd"));
        assert!(parser.args().is_empty());

        let command = parser.matched_command_parser().unwrap();
        assert_eq!(command.string_value("opt"), "value");
        assert_eq!(command.args(), &["foo".to_string()]);
    }

    #[test]
    fn command_aliases_share_one_parser() {
        let mut parser = Parser::new();
        parser.add_command("cmd c").add_flag("bool");

        parser.parse_tokens(&["c", "--bool"]).unwrap();

        assert_eq!(parser.matched_command_name(), Some("c"));
        assert!(parser.matched_command_parser().unwrap().found("bool"));
    }

    #[test]
    fn command_blocked_by_positional() {
        let mut parser = Parser::new();
        parser.add_command("cmd");

        parser.parse_tokens(&["arg", "cmd"]).unwrap();

        assert_eq!(parser.matched_command_name(), None);
        assert_eq!(parser.args(), &["arg".to_string(), "cmd".to_string()]);
    }

    #[test]
    fn command_callback_fires_after_parse() {
        // Setup
        let log: Rc<RefCell<Vec<(String, usize)>>> = Rc::default();
        let sink = Rc::clone(&log);
        let mut parser = Parser::new();
        let command = parser.add_command("cmd");
        command.add_flag("bool");
        command.callback(move |name, command| {
            sink.borrow_mut()
                .push((name.to_string(), command.count("bool")));
        });

        // Execute
        parser.parse_tokens(&["cmd", "--bool"]).unwrap();

        // Verify: the callback observed the fully parsed command.
        assert_eq!(log.borrow().as_slice(), &[("cmd".to_string(), 1)]);
    }

    #[test]
    fn help_command_enabled_by_registration() {
        let mut parser = Parser::new();
        parser.add_command("cmd").helptext("Usage: cmd...");

        let outcome = parser.parse_tokens(&["help", "cmd"]).unwrap();

        assert_eq!(outcome, ParseOutcome::Exit("Usage: cmd...".to_string()));
    }

    #[test]
    fn help_command_missing_name() {
        let mut parser = Parser::new();
        parser.add_command("cmd");

        assert_matches!(
            parser.parse_tokens(&["help"]).unwrap_err(),
            ParseError::MissingArgument { target } if target == "the help command"
        );
    }

    #[test]
    fn help_command_unknown_name() {
        let mut parser = Parser::new();
        parser.add_command("cmd");

        assert_matches!(
            parser.parse_tokens(&["help", "nope"]).unwrap_err(),
            ParseError::UnrecognizedCommand { name } if name == "nope"
        );
    }

    #[test]
    fn help_command_opt_out() {
        let mut parser = Parser::new();
        parser.add_command("cmd");
        parser.enable_help_command(false);

        parser.parse_tokens(&["help", "cmd"]).unwrap();

        // Without the automatic command, 'help' is an ordinary positional argument
        // (which also blocks the 'cmd' command).
        assert_eq!(parser.args(), &["help".to_string(), "cmd".to_string()]);
    }

    #[test]
    fn args_as_ints_atomic() {
        let mut parser = Parser::new();
        parser.parse_tokens(&["12", "x", "-7"]).unwrap();

        assert_matches!(
            parser.args_as_ints().unwrap_err(),
            ParseError::InvalidValueFormat { value, kind: OptionKind::Int } if value == "x"
        );
    }

    #[test]
    fn run_complete() {
        let mut parser = Parser::new();
        let interface = InMemoryInterface::default();

        parser.run(&[], &interface).unwrap();

        let (message, error) = interface.consume();
        assert_eq!(message, None);
        assert_eq!(error, None);
    }

    #[test]
    fn run_help() {
        let mut parser = Parser::new();
        parser.helptext("Usage: example...");
        let interface = InMemoryInterface::default();

        let exit_code = parser.run(&["--help"], &interface).unwrap_err();

        assert_eq!(exit_code, 0);
        let (message, error) = interface.consume();
        assert_eq!(message, Some("Usage: example...".to_string()));
        assert_eq!(error, None);
    }

    #[test]
    fn run_error() {
        let mut parser = Parser::new();
        let interface = InMemoryInterface::default();

        let exit_code = parser.run(&["--nope"], &interface).unwrap_err();

        assert_eq!(exit_code, 1);
        let (message, error) = interface.consume();
        assert_eq!(message, None);
        let error = error.unwrap();
        assert_contains!(
            error,
            "--nope is not a recognised flag or option name"
        );
    }

    #[test]
    fn display_render() {
        let mut parser = Parser::new();
        parser.add_flag("bool b");
        parser.add_int_option("int", 101);
        parser.parse_tokens(&["-b", "--int", "202", "foo"]).unwrap();

        let rendered = parser.to_string();

        assert_contains!(rendered, "Options:");
        assert_contains!(rendered, "  b [flag]: 1");
        assert_contains!(rendered, "  bool [flag]: 1");
        assert_contains!(rendered, "  int [integer]: (101) [202]");
        assert_contains!(rendered, "Arguments:");
        assert_contains!(rendered, "  foo");
        assert_contains!(rendered, "Command:");
        assert_contains!(rendered, "  [none]");
    }

    #[test]
    fn display_render_empty() {
        let parser = Parser::new();

        let rendered = parser.to_string();

        assert_eq!(
            rendered,
            "Options:\n  [none]\n\nArguments:\n  [none]\n\nCommand:\n  [none]"
        );
    }

    #[test]
    #[should_panic]
    fn unregistered_query_panics() {
        let parser = Parser::new();
        parser.count("nope");
    }

    #[test]
    #[should_panic]
    fn kind_mismatch_query_panics() {
        let mut parser = Parser::new();
        parser.add_int_option("opt", 101);
        parser.string_value("opt");
    }
}
