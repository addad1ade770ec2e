//! Error types shared across the crate.
//!
//! Validation failures are not errors: a validator reports them as `false`
//! plus its error message. The types here cover composition mistakes and
//! console failures.

use std::io;

/// Failure while building a validator.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The supplied pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure while composing a menu.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// Keys must be unique within one menu.
    #[error("key `{0}` is already bound in this menu")]
    DuplicateKey(char),
}

/// Failure while talking to the console.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Input stream reached its end.
    #[error("input closed")]
    Closed,
    /// The user interrupted input (Ctrl-C).
    #[error("input interrupted")]
    Interrupted,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ConsoleError {
    /// `true` when the error means the user is done rather than something broke.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, ConsoleError::Closed | ConsoleError::Interrupted)
    }
}

impl From<rustyline::error::ReadlineError> for ConsoleError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        use rustyline::error::ReadlineError;
        match err {
            ReadlineError::Eof => ConsoleError::Closed,
            ReadlineError::Interrupted => ConsoleError::Interrupted,
            ReadlineError::Io(e) => ConsoleError::Io(e),
            other => ConsoleError::Io(io::Error::other(other.to_string())),
        }
    }
}

/// A form refused a value handed to it by a prompt.
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    #[error("form has no field named `{0}`")]
    UnknownField(String),
    #[error("field `{field}` expects {expected}, got {got}")]
    Mismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },
}
