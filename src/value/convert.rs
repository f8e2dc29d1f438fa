use super::{Handle, Value, ValueType};

/// Conversion between a Rust type and the boxed [`Value`] representation.
pub trait ValueConvert: Sized {
    /// The declared type used for overload matching.
    fn value_type() -> ValueType;

    fn into_value(self) -> Value;

    /// `None` when `value` does not hold this type.
    fn from_value(value: Value) -> Option<Self>;
}

/// A type that can sit on either side of a binder.
///
/// `Default` is the structural fallback returned when an accessor is missing.
pub trait BindValue: ValueConvert + Clone + PartialEq + Default + Send + Sync + 'static {}

impl<T> BindValue for T where T: ValueConvert + Clone + PartialEq + Default + Send + Sync + 'static {}

impl ValueConvert for Value {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl ValueConvert for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }
}

impl ValueConvert for String {
    fn value_type() -> ValueType {
        ValueType::Text
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }
}

macro_rules! int_convert {
    ($($ty:ty),*) => {
        $(
            impl ValueConvert for $ty {
                fn value_type() -> ValueType {
                    ValueType::Int
                }

                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(value) => <$ty>::try_from(value).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

int_convert!(i8, i16, i32, i64, isize, u8, u16, u32, usize);

impl ValueConvert for u64 {
    fn value_type() -> ValueType {
        ValueType::Int
    }

    fn into_value(self) -> Value {
        // Values above i64::MAX saturate rather than wrap.
        Value::Int(i64::try_from(self).unwrap_or(i64::MAX))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(value) => u64::try_from(value).ok(),
            _ => None,
        }
    }
}

impl ValueConvert for f64 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(value) => Some(value),
            Value::Int(value) => Some(value as f64),
            _ => None,
        }
    }
}

impl ValueConvert for f32 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }

    fn from_value(value: Value) -> Option<Self> {
        f64::from_value(value).map(|value| value as f32)
    }
}

impl ValueConvert for Handle {
    fn value_type() -> ValueType {
        ValueType::Object
    }

    fn into_value(self) -> Value {
        Value::Object(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(handle) => Some(handle),
            _ => None,
        }
    }
}

impl<T: ValueConvert> ValueConvert for Option<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: ValueConvert> ValueConvert for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(ValueConvert::into_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}
