//! jdbcshell - check JDBC connection settings given on the command line.

use jdbcshell::{CliApplication, DescribeConnection, StdConsole};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut app = CliApplication::new(StdConsole, DescribeConnection);
    ExitCode::from(app.run(&args))
}
