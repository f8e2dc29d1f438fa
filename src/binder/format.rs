use std::marker::PhantomData;

use thiserror::Error;

use crate::error::OneWayBindingError;
use crate::value::{BindValue, Value};

use super::direction::Direction;

/// Why a formatter produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The direction is intentionally unsupported. Propagates out of the exchange.
    #[error(transparent)]
    OneWay(#[from] OneWayBindingError),
    /// The value could not be converted. Handled like a validation failure.
    #[error("format rejected: {0}")]
    Rejected(String),
}

/// Converter between the view domain `V` and the model domain `M`.
pub trait Formatter<V, M>: Send + Sync {
    fn to_view(&self, model: &M) -> Result<V, FormatError>;
    fn to_model(&self, view: &V) -> Result<M, FormatError>;
}

/// Default formatter: converts through [`Value`].
///
/// Same-type bindings pass straight through; differing types succeed when
/// the dynamic value is acceptable to the other side (`Option<i64>` to `i64`
/// with a value present, `i64` to `f64`, anything to `Value`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCast;

impl<V: BindValue, M: BindValue> Formatter<V, M> for ValueCast {
    fn to_view(&self, model: &M) -> Result<V, FormatError> {
        cast(model.clone().into_value())
    }

    fn to_model(&self, view: &V) -> Result<M, FormatError> {
        cast(view.clone().into_value())
    }
}

fn cast<T: BindValue>(value: Value) -> Result<T, FormatError> {
    let found = value.value_type();
    T::from_value(value)
        .ok_or_else(|| FormatError::Rejected(format!("cannot convert {} to {}", found, T::value_type())))
}

/// Pass-through for bindings whose sides share one type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T: Clone> Formatter<T, T> for Identity
where
    T: Send + Sync,
{
    fn to_view(&self, model: &T) -> Result<T, FormatError> {
        Ok(model.clone())
    }

    fn to_model(&self, view: &T) -> Result<T, FormatError> {
        Ok(view.clone())
    }
}

/// Formatter built from a pair of closures.
pub struct FnFormatter<V, M, TV, TM> {
    to_view: TV,
    to_model: TM,
    _marker: PhantomData<fn(V, M)>,
}

impl<V, M, TV, TM> FnFormatter<V, M, TV, TM>
where
    TV: Fn(&M) -> Result<V, FormatError> + Send + Sync,
    TM: Fn(&V) -> Result<M, FormatError> + Send + Sync,
{
    pub fn new(to_view: TV, to_model: TM) -> Self {
        FnFormatter {
            to_view,
            to_model,
            _marker: PhantomData,
        }
    }
}

impl<V, M, TV, TM> Formatter<V, M> for FnFormatter<V, M, TV, TM>
where
    TV: Fn(&M) -> Result<V, FormatError> + Send + Sync,
    TM: Fn(&V) -> Result<M, FormatError> + Send + Sync,
{
    fn to_view(&self, model: &M) -> Result<V, FormatError> {
        (self.to_view)(model)
    }

    fn to_model(&self, view: &V) -> Result<M, FormatError> {
        (self.to_model)(view)
    }
}

/// Supports push only; `to_view` raises [`OneWayBindingError`].
pub struct PushOnly<F>(pub F);

impl<V, M, F: Formatter<V, M>> Formatter<V, M> for PushOnly<F> {
    fn to_view(&self, _model: &M) -> Result<V, FormatError> {
        Err(OneWayBindingError::new(Direction::Pop).into())
    }

    fn to_model(&self, view: &V) -> Result<M, FormatError> {
        self.0.to_model(view)
    }
}

/// Supports pop only; `to_model` raises [`OneWayBindingError`].
pub struct PopOnly<F>(pub F);

impl<V, M, F: Formatter<V, M>> Formatter<V, M> for PopOnly<F> {
    fn to_view(&self, model: &M) -> Result<V, FormatError> {
        self.0.to_view(model)
    }

    fn to_model(&self, _view: &V) -> Result<M, FormatError> {
        Err(OneWayBindingError::new(Direction::Push).into())
    }
}

pub trait FormatterExt: Sized {
    fn push_only(self) -> PushOnly<Self> {
        PushOnly(self)
    }

    fn pop_only(self) -> PopOnly<Self> {
        PopOnly(self)
    }
}

impl<F> FormatterExt for F {}
