//! Option registration and command-line parsing.

use crate::global::{GlobalValidator, RawOptions};
use crate::help::{format_usage, HELP_OPTION};
use crate::validator::{RawValueSink, Validator};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

/// Every option name starts with this character.
pub const OPTION_PREFIX: char = '-';

const DEFAULT_USAGE_LINE: &str = "Usage: program [-help] [OPTIONS...] [ARGS...]";

/// Errors raised while registering options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Option already defined: {0}")]
    DuplicateOption(String),

    #[error("invalid option name '{0}': must be '-' followed by at least one character")]
    InvalidName(String),

    #[error("option name {0} is reserved for the built-in help")]
    ReservedName(String),
}

/// Errors detected while parsing a command line.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Option {0} was already specified")]
    AlreadySpecified(String),

    #[error("Option {0} requires a parameter")]
    MissingParameter(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unexpected arguments: {}", .0.join(", "))]
    UnexpectedArguments(Vec<String>),

    /// A global validator rejected the combination of options.
    #[error("{0}")]
    Constraint(String),

    /// An option validator rejected its value.
    #[error("{0}")]
    InvalidValue(String),
}

/// Outcome of [`ArgumentsParser::parse_args`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// `-help` appeared somewhere in the arguments; nothing was validated.
    Help,
    /// Parsing stopped at this problem; later checks did not run.
    Invalid(ParseError),
    /// Every check passed and every supplied option's validator was used.
    Valid,
}

impl ParseOutcome {
    pub fn is_help_requested(&self) -> bool {
        matches!(self, ParseOutcome::Help)
    }

    /// # Panics
    ///
    /// Panics when help was requested, since validation was skipped.
    pub fn is_valid(&self) -> bool {
        match self {
            ParseOutcome::Help => {
                panic!("Unexpected call: validation is skipped when help is requested")
            }
            ParseOutcome::Invalid(_) => false,
            ParseOutcome::Valid => true,
        }
    }

    /// The reported errors; a single entry when invalid, empty otherwise.
    pub fn errors(&self) -> &[ParseError] {
        match self {
            ParseOutcome::Invalid(error) => std::slice::from_ref(error),
            _ => &[],
        }
    }

    /// # Panics
    ///
    /// Panics when help was requested or the outcome is valid.
    pub fn error_string(&self) -> String {
        match self {
            ParseOutcome::Invalid(error) => error.to_string(),
            ParseOutcome::Help => {
                panic!("Unexpected call: validation is skipped when help is requested")
            }
            ParseOutcome::Valid => panic!(
                "Unexpected call: there should not be any errors when the parse result is valid"
            ),
        }
    }
}

/// A registered option: name, help description, and the validator that
/// receives its value.
pub(crate) struct OptionSpec {
    pub(crate) name: String,
    pub(crate) description: String,
    validator: Rc<dyn RawValueSink>,
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

fn check_name(name: &str) -> Result<(), BuildError> {
    if name == HELP_OPTION {
        return Err(BuildError::ReservedName(name.to_string()));
    }
    if !name.starts_with(OPTION_PREFIX) || name.len() == OPTION_PREFIX.len_utf8() {
        return Err(BuildError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Collects options and global validators, then freezes them into an
/// [`ArgumentsParser`].
pub struct ArgumentsParserBuilder {
    usage_line: String,
    options: Vec<OptionSpec>,
    global_validators: Vec<Box<dyn GlobalValidator>>,
}

impl fmt::Debug for ArgumentsParserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentsParserBuilder")
            .field("usage_line", &self.usage_line)
            .field("options", &self.options)
            .field("global_validators", &self.global_validators.len())
            .finish()
    }
}

impl Default for ArgumentsParserBuilder {
    fn default() -> Self {
        Self {
            usage_line: DEFAULT_USAGE_LINE.to_string(),
            options: Vec::new(),
            global_validators: Vec::new(),
        }
    }
}

impl ArgumentsParserBuilder {
    /// First line of the usage text.
    pub fn usage_line(mut self, usage_line: impl Into<String>) -> Self {
        self.usage_line = usage_line.into();
        self
    }

    /// Register an option that takes exactly one value.
    ///
    /// The parser keeps a clone of `validator`; read the converted value from
    /// the caller's handle after a successful parse.
    pub fn add_option<T: 'static>(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        validator: &Validator<T>,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        check_name(&name)?;
        if self.options.iter().any(|o| o.name == name) {
            return Err(BuildError::DuplicateOption(name));
        }

        self.options.push(OptionSpec {
            name,
            description: description.into(),
            validator: validator.sink(),
        });
        Ok(self)
    }

    /// Register a cross-option rule. Rules run in registration order.
    pub fn add_global_validator<G>(mut self, validator: G) -> Self
    where
        G: GlobalValidator + 'static,
    {
        self.global_validators.push(Box::new(validator));
        self
    }

    pub fn build(self) -> ArgumentsParser {
        let usage = format_usage(
            &self.usage_line,
            self.options
                .iter()
                .map(|o| (o.name.as_str(), o.description.as_str())),
        );

        ArgumentsParser {
            usage,
            options: self.options,
            global_validators: self.global_validators,
        }
    }
}

/// An immutable set of options with their validators.
pub struct ArgumentsParser {
    usage: String,
    options: Vec<OptionSpec>,
    global_validators: Vec<Box<dyn GlobalValidator>>,
}

impl fmt::Debug for ArgumentsParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentsParser")
            .field("options", &self.options)
            .field("global_validators", &self.global_validators.len())
            .finish()
    }
}

impl ArgumentsParser {
    pub fn builder() -> ArgumentsParserBuilder {
        ArgumentsParserBuilder::default()
    }

    /// Usage text, computed once when the parser was built.
    pub fn usage_string(&self) -> &str {
        &self.usage
    }

    /// Parse command-line arguments (without the program name).
    ///
    /// Returns [`ParseOutcome::Help`] if `-help` is found anywhere in `args`.
    /// Otherwise the first problem found ends the parse and is the only error
    /// reported. Global validators run before any option validator.
    pub fn parse_args<S: AsRef<str>>(&self, args: &[S]) -> ParseOutcome {
        if args.iter().any(|arg| arg.as_ref() == HELP_OPTION) {
            debug!("help requested, skipping validation");
            return ParseOutcome::Help;
        }

        match self.capture(args).and_then(|raw| self.validate(&raw)) {
            Ok(()) => ParseOutcome::Valid,
            Err(err) => {
                debug!(error = %err, "argument parsing failed");
                ParseOutcome::Invalid(err)
            }
        }
    }

    fn find_option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Split `args` into option values, rejecting anything unexpected.
    fn capture<S: AsRef<str>>(&self, args: &[S]) -> Result<RawOptions, ParseError> {
        let mut raw = RawOptions::new();
        let mut rest = Vec::new();
        let mut args_iter = args.iter().map(AsRef::as_ref);

        while let Some(arg) = args_iter.next() {
            if let Some(option) = self.find_option(arg) {
                if raw.contains(arg) {
                    return Err(ParseError::AlreadySpecified(arg.to_string()));
                }
                let value = args_iter
                    .next()
                    .ok_or_else(|| ParseError::MissingParameter(arg.to_string()))?;
                trace!(option = %option.name, "captured option");
                raw.insert(option.name.as_str(), value);
            } else if arg.starts_with(OPTION_PREFIX) {
                return Err(ParseError::UnknownOption(arg.to_string()));
            } else {
                rest.push(arg.to_string());
            }
        }

        if !rest.is_empty() {
            return Err(ParseError::UnexpectedArguments(rest));
        }
        Ok(raw)
    }

    fn validate(&self, raw: &RawOptions) -> Result<(), ParseError> {
        for validator in &self.global_validators {
            validator.validate(raw).map_err(ParseError::Constraint)?;
        }

        for (name, value) in raw.iter() {
            if let Some(option) = self.find_option(name) {
                option
                    .validator
                    .accept(value)
                    .map_err(ParseError::InvalidValue)?;
            }
        }
        Ok(())
    }
}
