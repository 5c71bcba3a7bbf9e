use thiserror::Error;

/// Error returned when a backend selection string is not recognised.
///
/// Only the selection parser reports errors. Resolution itself never fails:
/// a value rejected here while reading the environment is logged and treated
/// as `auto`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown SIMD backend selection {value:?} (expected one of: {expected})")]
pub struct SelectionParseError {
    value: String,
    expected: &'static str,
}

impl SelectionParseError {
    pub(crate) fn new(value: &str, expected: &'static str) -> Self {
        Self {
            value: value.to_owned(),
            expected,
        }
    }

    /// The rejected input, as supplied.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
