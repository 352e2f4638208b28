//! Deferred, typed conversion of a single option value.
//!
//! A [`Validator`] is registered with the parser before anyone knows whether
//! its option will appear on the command line. The parser feeds it the raw
//! value only after every cross-option check has passed; the caller keeps a
//! clone of the handle and reads the converted value afterwards.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Conversion state of a [`Validator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorState<T> {
    /// The option was not supplied, or its value has not been converted yet.
    Unset,
    /// The raw value was converted successfully.
    Used(T),
}

type Convert<T> = Box<dyn Fn(&str) -> Result<T, String>>;

struct Slot<T> {
    convert: Convert<T>,
    state: RefCell<ValidatorState<T>>,
}

/// Type-erased view the parser uses to feed raw values to a validator.
pub(crate) trait RawValueSink {
    fn accept(&self, raw: &str) -> Result<(), String>;
}

impl<T> RawValueSink for Slot<T> {
    fn accept(&self, raw: &str) -> Result<(), String> {
        match (self.convert)(raw) {
            Ok(value) => {
                *self.state.borrow_mut() = ValidatorState::Used(value);
                Ok(())
            }
            Err(message) => {
                *self.state.borrow_mut() = ValidatorState::Unset;
                Err(message)
            }
        }
    }
}

/// Shared handle to an option value converter.
///
/// Cloning is cheap and every clone observes the same state, so the caller
/// can hand one clone to the parser builder and keep another to read the
/// result.
pub struct Validator<T> {
    slot: Rc<Slot<T>>,
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: 'static> Validator<T> {
    /// Create a validator from a conversion function.
    ///
    /// The `Display` output of a conversion error is reported unchanged as
    /// the parse error.
    pub fn new<F, E>(convert: F) -> Self
    where
        F: Fn(&str) -> Result<T, E> + 'static,
        E: fmt::Display,
    {
        let convert: Convert<T> = Box::new(move |raw| convert(raw).map_err(|e| e.to_string()));
        Self {
            slot: Rc::new(Slot {
                convert,
                state: RefCell::new(ValidatorState::Unset),
            }),
        }
    }

    pub(crate) fn sink(&self) -> Rc<dyn RawValueSink> {
        self.slot.clone()
    }
}

impl<T> Validator<T>
where
    T: FromStr + 'static,
    T::Err: fmt::Display,
{
    /// Create a validator that parses the raw value with [`FromStr`].
    pub fn parsed() -> Self {
        Self::new(|raw: &str| {
            raw.parse::<T>()
                .map_err(|e| format!("Invalid value '{}': {}", raw, e))
        })
    }
}

impl<T> Validator<T> {
    /// Whether a raw value has been converted successfully.
    pub fn used(&self) -> bool {
        matches!(*self.slot.state.borrow(), ValidatorState::Used(_))
    }

    /// Snapshot of the current state, for exhaustive matching.
    pub fn state(&self) -> ValidatorState<T>
    where
        T: Clone,
    {
        self.slot.state.borrow().clone()
    }

    /// The converted value.
    ///
    /// # Panics
    ///
    /// Panics if the validator was not used. Check [`Validator::used`] or
    /// match on [`Validator::state`] when the option is optional.
    pub fn value(&self) -> T
    where
        T: Clone,
    {
        match &*self.slot.state.borrow() {
            ValidatorState::Used(value) => value.clone(),
            ValidatorState::Unset => panic!("Validator was not used"),
        }
    }

    /// Convert `raw` and remember the result.
    pub fn validate(&self, raw: &str) -> Result<(), String> {
        self.slot.accept(raw)
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("used", &self.used())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validator_is_unset() {
        let validator = Validator::<i64>::parsed();
        assert!(!validator.used());
        assert_eq!(validator.state(), ValidatorState::Unset);
    }

    #[test]
    #[should_panic(expected = "Validator was not used")]
    fn test_value_before_use_panics() {
        let validator = Validator::<i64>::parsed();
        validator.value();
    }

    #[test]
    fn test_parsed_converts_value() {
        let validator = Validator::<i64>::parsed();
        validator.validate("42").unwrap();
        assert!(validator.used());
        assert_eq!(validator.value(), 42);
    }

    #[test]
    fn test_parsed_reports_raw_value_on_failure() {
        let validator = Validator::<i64>::parsed();
        let err = validator.validate("forty-two").unwrap_err();
        assert!(err.starts_with("Invalid value 'forty-two':"), "{}", err);
        assert!(!validator.used());
    }

    #[test]
    fn test_custom_error_message_passes_through() {
        let validator = Validator::new(|raw: &str| {
            if raw.is_empty() {
                Err("value must not be empty")
            } else {
                Ok(raw.to_uppercase())
            }
        });
        assert_eq!(validator.validate("").unwrap_err(), "value must not be empty");
        validator.validate("abc").unwrap();
        assert_eq!(validator.value(), "ABC");
    }

    #[test]
    fn test_clones_share_state() {
        let validator = Validator::<u16>::parsed();
        let registered = validator.clone();
        registered.validate("8080").unwrap();
        assert_eq!(validator.state(), ValidatorState::Used(8080));
    }

    #[test]
    fn test_failed_conversion_resets_state() {
        let validator = Validator::<u8>::parsed();
        validator.validate("7").unwrap();
        assert!(validator.validate("300").is_err());
        assert_eq!(validator.state(), ValidatorState::Unset);
    }

    #[test]
    fn test_sink_feeds_shared_state() {
        let validator = Validator::<i32>::parsed();
        let sink = validator.sink();
        sink.accept("-3").unwrap();
        assert_eq!(validator.value(), -3);
    }

    #[test]
    fn test_debug_shows_usage() {
        let validator = Validator::<i32>::parsed();
        assert_eq!(format!("{:?}", validator), "Validator { used: false }");
    }
}
