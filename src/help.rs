//! Usage text generation for an [`ArgumentsParser`](crate::ArgumentsParser).

/// Name of the built-in help option.
pub const HELP_OPTION: &str = "-help";

const HELP_DESCRIPTION: &str = "Print this help";

/// Placeholder shown after an option name: the name without its leading
/// prefix character, upper-cased (`-config` becomes `CONFIG`).
fn placeholder(name: &str) -> String {
    let mut chars = name.chars();
    chars.next();
    chars.as_str().to_uppercase()
}

/// Render the full usage text.
///
/// `options` yields `(name, description)` pairs in registration order; the
/// `-help` entry is always appended last.
pub(crate) fn format_usage<'a, I>(usage_line: &str, options: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut usage = String::from(usage_line);
    usage.push_str("\n\nOptions:\n\n");

    for (name, description) in options {
        usage.push_str(&format!("{} {}\n  {}\n", name, placeholder(name), description));
    }

    usage.push_str(&format!("{}\n  {}\n", HELP_OPTION, HELP_DESCRIPTION));
    usage
}
