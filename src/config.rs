//! JDBC connection settings, from a URL or a properties file.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Property holding the JDBC URL in a configuration file.
pub const JDBC_URL_PROPERTY: &str = "jdbc.url";
/// Property holding the user name in a configuration file.
pub const JDBC_USERNAME_PROPERTY: &str = "jdbc.username";
/// Property holding the password in a configuration file.
pub const JDBC_PASSWORD_PROPERTY: &str = "jdbc.password";

/// Supported driver names and the driver each one maps to.
pub const DRIVERS: &[(&str, &str)] = &[
    ("mysql", "com.mysql.jdbc.Driver"),
    ("postgresql", "org.postgresql.Driver"),
    ("oracle", "oracle.jdbc.OracleDriver"),
    ("sqlserver", "com.microsoft.sqlserver.jdbc.SQLServerDriver"),
    ("h2", "org.h2.Driver"),
    ("derby", "org.apache.derby.jdbc.EmbeddedDriver"),
];

/// Errors that can occur while resolving connection settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Expected JDBC URL to start with 'jdbc:', got: {0}")]
    NotJdbcUrl(String),

    #[error("Expected JDBC URL in the form 'jdbc:driverClassName:url', got: {0}")]
    MalformedUrl(String),

    #[error("Unsupported driver: {}; supported drivers: {}", .0, supported_drivers())]
    UnsupportedDriver(String),

    #[error("Could not read configuration file: {path} ({reason})")]
    Unreadable {
        path: String,
        reason: String,
        #[source]
        source: io::Error,
    },

    #[error("Missing required configuration: {0}")]
    MissingProperty(&'static str),
}

/// Supported driver names, rendered as `[mysql, postgresql, ...]`.
pub fn supported_drivers() -> String {
    let names: Vec<&str> = DRIVERS.iter().map(|(name, _)| *name).collect();
    format!("[{}]", names.join(", "))
}

/// Find the driver for a URL of the form `jdbc:<driver>:<rest>`.
pub fn resolve_driver(url: &str) -> Result<&'static str, ConfigError> {
    if !url.starts_with("jdbc:") {
        return Err(ConfigError::NotJdbcUrl(url.to_string()));
    }

    let mut parts: Vec<&str> = url.split(':').collect();
    while parts.last() == Some(&"") {
        parts.pop();
    }
    if parts.len() < 3 {
        return Err(ConfigError::MalformedUrl(url.to_string()));
    }

    let name = parts[1];
    DRIVERS
        .iter()
        .find(|(driver_name, _)| *driver_name == name)
        .map(|(_, driver)| *driver)
        .ok_or_else(|| ConfigError::UnsupportedDriver(name.to_string()))
}

/// Everything needed to open a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: String,
    pub driver: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// Settings from a bare JDBC URL, without credentials.
    pub fn from_url(url: &str) -> Result<ConnectionConfig, ConfigError> {
        let driver = resolve_driver(url)?;
        Ok(ConnectionConfig {
            url: url.to_string(),
            driver: driver.to_string(),
            username: None,
            password: None,
        })
    }

    /// Settings from a properties file with `jdbc.url` and optional
    /// `jdbc.username` / `jdbc.password` entries.
    pub fn from_properties_file(path: impl AsRef<Path>) -> Result<ConnectionConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: io_reason(&source),
            source,
        })?;
        Self::from_properties(&parse_properties(&text))
    }

    fn from_properties(properties: &HashMap<String, String>) -> Result<ConnectionConfig, ConfigError> {
        let url = properties
            .get(JDBC_URL_PROPERTY)
            .ok_or(ConfigError::MissingProperty(JDBC_URL_PROPERTY))?;
        let driver = resolve_driver(url)?;

        Ok(ConnectionConfig {
            url: url.clone(),
            driver: driver.to_string(),
            username: properties.get(JDBC_USERNAME_PROPERTY).cloned(),
            password: properties.get(JDBC_PASSWORD_PROPERTY).cloned(),
        })
    }
}

/// The OS message of an I/O error without Rust's ` (os error N)` suffix.
fn io_reason(err: &io::Error) -> String {
    let text = err.to_string();
    match text.rfind(" (os error ") {
        Some(at) if text.ends_with(')') => text[..at].to_string(),
        _ => text,
    }
}

/// Hide credentials in a JDBC URL: the user-info before `@` in the
/// authority, and `password`/`pwd` parameters after `?`, `&` or `;`.
pub fn redact_url(url: &str) -> String {
    redact_secret_params(&redact_user_info(url))
}

const SECRET_PARAMS: &[&str] = &["password", "pwd"];
const REDACTED: &str = "***";

fn is_param_separator(c: char) -> bool {
    matches!(c, '?' | '&' | ';')
}

fn redact_user_info(url: &str) -> String {
    let authority_end = url.find(is_param_separator).unwrap_or(url.len());
    let Some(at) = url[..authority_end].find('@') else {
        return url.to_string();
    };

    let head = &url[..at];
    let start = match head.rfind("//") {
        Some(slashes) => slashes + 2,
        None => head.rfind(':').map_or(0, |colon| colon + 1),
    };
    if start == at {
        return url.to_string();
    }
    format!("{}{}{}", &url[..start], REDACTED, &url[at..])
}

fn redact_secret_params(url: &str) -> String {
    let mut redacted = String::with_capacity(url.len());
    for segment in url.split_inclusive(is_param_separator) {
        let (body, separator) = match segment.char_indices().last() {
            Some((at, c)) if is_param_separator(c) => segment.split_at(at),
            _ => (segment, ""),
        };
        match body.split_once('=') {
            Some((key, _))
                if SECRET_PARAMS
                    .iter()
                    .any(|secret| key.trim().eq_ignore_ascii_case(secret)) =>
            {
                redacted.push_str(key);
                redacted.push('=');
                redacted.push_str(REDACTED);
            }
            _ => redacted.push_str(body),
        }
        redacted.push_str(separator);
    }
    redacted
}

/// Parse a `.properties` file the way `java.util.Properties.load` reads it.
///
/// Lines whose first non-blank character is `#` or `!` are comments. A line
/// ending in an odd number of backslashes continues on the next line, whose
/// leading blanks are dropped. The key ends at the first unescaped `=`, `:`
/// or blank; blanks and one separator after it are skipped, and the value
/// runs to the end of the line, trailing blanks included. Backslash escapes
/// (`\t`, `\n`, `\r`, `\f`, `\uXXXX`, `\<char>`) are decoded in keys and
/// values. Later keys win.
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    logical_lines(text)
        .iter()
        .map(|line| {
            let (key, value) = split_entry(line);
            (unescape(key), unescape(value))
        })
        .collect()
}

/// Whitespace as the properties format defines it.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for natural in text.lines() {
        let trimmed = natural.trim_start_matches(is_blank);
        let mut line = match pending.take() {
            Some(mut line) => {
                line.push_str(trimmed);
                line
            }
            None if trimmed.is_empty() || trimmed.starts_with(|c: char| c == '#' || c == '!') => {
                continue
            }
            None => trimmed.to_string(),
        };

        if continues(&line) {
            line.pop();
            pending = Some(line);
        } else {
            lines.push(line);
        }
    }
    lines.extend(pending);
    lines
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (at, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = at;
            break;
        }
    }

    let (key, rest) = line.split_at(key_end);
    let rest = rest.trim_start_matches(is_blank);
    let rest = rest.strip_prefix(|c: char| c == '=' || c == ':').unwrap_or(rest);
    (key, rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => decoded.push('\t'),
            Some('n') => decoded.push('\n'),
            Some('r') => decoded.push('\r'),
            Some('f') => decoded.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let unicode = Some(&hex)
                    .filter(|hex| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32);
                match unicode {
                    Some(unicode) => decoded.push(unicode),
                    // Malformed escapes are kept as written.
                    _ => {
                        decoded.push_str("\\u");
                        decoded.push_str(&hex);
                    }
                }
            }
            Some(other) => decoded.push(other),
            None => {}
        }
    }
    decoded
}
