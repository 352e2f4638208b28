//! The `jdbcshell` command: read connection settings from `-url` or
//! `-config` and hand them to a [`ConnectionConsumer`].

use crate::config::{redact_url, supported_drivers, ConnectionConfig};
use crate::global::either_is_present;
use crate::output::Console;
use crate::parser::{ArgumentsParser, BuildError};
use crate::validator::{Validator, ValidatorState};
use tracing::{debug, info};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

pub const USAGE_LINE: &str = "Usage: jdbcshell [-help] [OPTIONS...]";

const URL_OPTION: &str = "-url";
const CONFIG_OPTION: &str = "-config";

/// Does something with validated connection settings.
pub trait ConnectionConsumer {
    fn execute(
        &mut self,
        console: &mut dyn Console,
        config: &ConnectionConfig,
    ) -> anyhow::Result<()>;
}

impl<K: ConnectionConsumer + ?Sized> ConnectionConsumer for &mut K {
    fn execute(
        &mut self,
        console: &mut dyn Console,
        config: &ConnectionConfig,
    ) -> anyhow::Result<()> {
        (**self).execute(console, config)
    }
}

/// Prints the resolved settings. The password is never shown, and
/// credentials inside the URL are masked.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescribeConnection;

impl ConnectionConsumer for DescribeConnection {
    fn execute(
        &mut self,
        console: &mut dyn Console,
        config: &ConnectionConfig,
    ) -> anyhow::Result<()> {
        console.println_out(&format!("Driver: {}", config.driver));
        console.println_out(&format!("URL: {}", redact_url(&config.url)));
        if let Some(ref username) = config.username {
            console.println_out(&format!("User: {}", username));
        }
        Ok(())
    }
}

fn build_parser(
    url: &Validator<ConnectionConfig>,
    config: &Validator<ConnectionConfig>,
) -> Result<ArgumentsParser, BuildError> {
    Ok(ArgumentsParser::builder()
        .usage_line(USAGE_LINE)
        .add_option(
            URL_OPTION,
            format!("Jdbc Url; supported drivers: {}", supported_drivers()),
            url,
        )?
        .add_option(CONFIG_OPTION, "Path to config.properties file", config)?
        .add_global_validator(either_is_present(CONFIG_OPTION, URL_OPTION))
        .build())
}

/// Ties argument parsing, output and the connection step together.
pub struct CliApplication<C, K> {
    console: C,
    consumer: K,
}

impl<C: Console, K: ConnectionConsumer> CliApplication<C, K> {
    pub fn new(console: C, consumer: K) -> Self {
        Self { console, consumer }
    }

    /// Run with the process arguments (without the program name) and return
    /// the exit code.
    pub fn run<S: AsRef<str>>(&mut self, args: &[S]) -> u8 {
        let url = Validator::new(ConnectionConfig::from_url);
        let config = Validator::new(|raw: &str| ConnectionConfig::from_properties_file(raw));

        let parser = match build_parser(&url, &config) {
            Ok(parser) => parser,
            Err(err) => {
                self.console.println_err(&err.to_string());
                return EXIT_FAILURE;
            }
        };

        let outcome = parser.parse_args(args);
        if outcome.is_help_requested() {
            self.console.println_out(parser.usage_string());
            return EXIT_SUCCESS;
        }
        if !outcome.is_valid() {
            self.console.println_err(&outcome.error_string());
            return EXIT_FAILURE;
        }

        let connection = match (url.state(), config.state()) {
            (ValidatorState::Used(connection), _) => {
                debug!("connection settings taken from {}", URL_OPTION);
                connection
            }
            (ValidatorState::Unset, ValidatorState::Used(connection)) => {
                debug!("connection settings taken from {}", CONFIG_OPTION);
                connection
            }
            (ValidatorState::Unset, ValidatorState::Unset) => {
                unreachable!(
                    "the parser requires one of {} or {}",
                    URL_OPTION, CONFIG_OPTION
                )
            }
        };
        info!(
            driver = %connection.driver,
            url = %redact_url(&connection.url),
            "resolved connection settings"
        );

        match self.consumer.execute(&mut self.console, &connection) {
            Ok(()) => EXIT_SUCCESS,
            Err(err) => {
                self.console.println_err(&format!("{:#}", err));
                EXIT_FAILURE
            }
        }
    }
}
