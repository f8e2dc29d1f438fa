//! Dynamic value model shared by accessors, properties and selectors.
//!
//! [`Value`] is what flows through an accessor invocation, [`ValueType`] is
//! what overload matching compares, and [`Handle`] is a shared reference to a
//! bindable receiver (usually the thing a [`Selector`](crate::Selector)
//! reads from or writes to).

mod convert;
mod handle;
mod value;

pub use convert::{BindValue, ValueConvert};
pub use handle::Handle;
pub use value::{Value, ValueType};
