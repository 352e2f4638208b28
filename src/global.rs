//! Cross-option validation over the raw command line.

/// Raw option values captured from the command line, in command-line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    entries: Vec<(String, String)>,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one if `name` was present.
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        if let Some(index) = self.entries.iter().position(|(n, _)| *n == name) {
            return Some(std::mem::replace(&mut self.entries[index].1, value));
        }
        self.entries.push((name, value));
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = RawOptions::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

/// A constraint over the full set of supplied options, for example that two
/// options conflict.
///
/// Runs once per parse, before any option value is converted. The error
/// message is reported to the user as is.
pub trait GlobalValidator {
    fn validate(&self, raw_options: &RawOptions) -> Result<(), String>;
}

impl<F> GlobalValidator for F
where
    F: Fn(&RawOptions) -> Result<(), String>,
{
    fn validate(&self, raw_options: &RawOptions) -> Result<(), String> {
        self(raw_options)
    }
}

/// Requires exactly one of two options to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EitherIsPresent {
    first: String,
    second: String,
}

impl GlobalValidator for EitherIsPresent {
    fn validate(&self, raw_options: &RawOptions) -> Result<(), String> {
        if raw_options.contains(&self.first) == raw_options.contains(&self.second) {
            return Err(format!(
                "One (and only one) of these options is required: {}, {}",
                self.first, self.second
            ));
        }
        Ok(())
    }
}

/// Fails when both or neither of `first` and `second` were supplied.
pub fn either_is_present(first: impl Into<String>, second: impl Into<String>) -> EitherIsPresent {
    EitherIsPresent {
        first: first.into(),
        second: second.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::first_only(&[("name1", "foo")])]
    #[case::second_only(&[("name2", "bar")])]
    #[case::with_unrelated(&[("other", "x"), ("name2", "bar")])]
    fn test_either_is_present_passes_when_either_is_present(#[case] pairs: &[(&str, &str)]) {
        let raw: RawOptions = pairs.iter().copied().collect();
        assert!(either_is_present("name1", "name2").validate(&raw).is_ok());
    }

    #[rstest]
    #[case::neither(&[])]
    #[case::both(&[("name1", "foo"), ("name2", "bar")])]
    #[case::only_unrelated(&[("other", "x")])]
    fn test_either_is_present_fails_when_neither_or_both_present(
        #[case] pairs: &[(&str, &str)],
    ) {
        let raw: RawOptions = pairs.iter().copied().collect();
        let err = either_is_present("name1", "name2")
            .validate(&raw)
            .unwrap_err();
        assert_eq!(
            err,
            "One (and only one) of these options is required: name1, name2"
        );
    }

    #[test]
    fn test_closure_is_a_global_validator() {
        let forbid_debug = |raw: &RawOptions| {
            if raw.get("-level") == Some("debug") {
                Err("debug level is disabled".to_string())
            } else {
                Ok(())
            }
        };
        let raw: RawOptions = [("-level", "debug")].into_iter().collect();
        assert_eq!(
            forbid_debug.validate(&raw),
            Err("debug level is disabled".to_string())
        );
        assert!(forbid_debug.validate(&RawOptions::new()).is_ok());
    }

    #[test]
    fn test_raw_options_keep_insertion_order() {
        let raw: RawOptions = [("-b", "2"), ("-a", "1"), ("-c", "3")]
            .into_iter()
            .collect();
        let names: Vec<&str> = raw.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["-b", "-a", "-c"]);
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_raw_options_insert_replaces_in_place() {
        let mut raw = RawOptions::new();
        assert!(raw.is_empty());
        assert_eq!(raw.insert("-a", "1"), None);
        raw.insert("-b", "2");
        assert_eq!(raw.insert("-a", "3"), Some("1".to_string()));
        assert_eq!(raw.get("-a"), Some("3"));
        assert_eq!(raw.iter().next(), Some(("-a", "3")));
        assert!(!raw.contains("-c"));
    }
}
