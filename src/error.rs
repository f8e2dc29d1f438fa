use std::fmt;

use thiserror::Error;

use crate::accessor::{NotFound, Role};
use crate::binder::Direction;
use crate::value::ValueType;

/// Raised by a formatter that only supports one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{direction} is not supported by this one-way binding")]
pub struct OneWayBindingError {
    pub direction: Direction,
}

impl OneWayBindingError {
    pub fn new(direction: Direction) -> Self {
        OneWayBindingError { direction }
    }
}

/// Aggregated wiring mistakes reported by `resolve()` / `associate()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ConfigurationError {
    reasons: Vec<String>,
}

impl ConfigurationError {
    pub fn new(reasons: Vec<String>) -> Self {
        ConfigurationError { reasons }
    }

    pub fn single(reason: impl Into<String>) -> Self {
        ConfigurationError {
            reasons: vec![reason.into()],
        }
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Append every reason of `other`.
    pub fn merge(&mut self, other: ConfigurationError) {
        self.reasons.extend(other.reasons);
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ConfigurationError> {
        if self.reasons.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reasons.len() {
            0 => write!(f, "binding configuration error"),
            1 => write!(f, "binding configuration error: {}", self.reasons[0]),
            n => {
                write!(f, "binding configuration error ({} problems)", n)?;
                for reason in &self.reasons {
                    write!(f, "\n  - {}", reason)?;
                }
                Ok(())
            }
        }
    }
}

/// Failure while running a resolved accessor against a receiver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("receiver is not a `{expected}`")]
    ReceiverMismatch { expected: &'static str },
    #[error("expected {expected} argument(s), got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("argument {index} is not convertible to {expected}")]
    ArgumentMismatch { index: usize, expected: ValueType },
    #[error("receiver lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("{0}")]
    Failed(String),
}

/// Why a single `Property` get/set did not go through.
///
/// Normal exchange swallows these (default value / `false`); `resolve()`
/// collects their messages into a [`ConfigurationError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error("{role} `{name}` failed: {source}")]
    Invoke {
        role: Role,
        name: String,
        #[source]
        source: InvokeError,
    },
    #[error("{0} is declared absent")]
    Absent(Role),
    #[error("selector has no runtime instance")]
    NoInstance,
    #[error("getter `{name}` produced {found} where {expected} was expected")]
    Conversion {
        name: String,
        expected: ValueType,
        found: ValueType,
    },
}

/// Top-level error for manager operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("{} exchange(s) rejected by one-way formatters", .0.len())]
    OneWay(Vec<OneWayBindingError>),
    #[error("invalid binding config: {0}")]
    Config(String),
}

impl From<OneWayBindingError> for BindingError {
    fn from(err: OneWayBindingError) -> Self {
        BindingError::OneWay(vec![err])
    }
}
