//! jdbcshell - declarative command-line option parsing with typed validators.
//!
//! The library registers named options, each with a description and a
//! [`Validator`] that converts its raw value, plus cross-option
//! [`GlobalValidator`] rules. [`ArgumentsParser::parse_args`] turns the
//! process arguments into a [`ParseOutcome`]: help requested, invalid with a
//! single error, or valid with every supplied validator holding its value.
//!
//! The `jdbcshell` binary built on top of it resolves JDBC connection
//! settings from `-url` or a `-config` properties file.

pub mod app;
pub mod config;
pub mod global;
pub mod help;
pub mod output;
pub mod parser;
pub mod validator;

pub use app::{CliApplication, ConnectionConsumer, DescribeConnection};
pub use config::{ConfigError, ConnectionConfig};
pub use global::{either_is_present, EitherIsPresent, GlobalValidator, RawOptions};
pub use output::{BufferConsole, Console, StdConsole};
pub use parser::{ArgumentsParser, ArgumentsParserBuilder, BuildError, ParseError, ParseOutcome};
pub use validator::{Validator, ValidatorState};
