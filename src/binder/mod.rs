//! The two-way rule between a view selector and a model selector.

mod binder;
mod direction;
mod exchange;
mod format;
mod report;

pub use binder::Binder;
pub use direction::Direction;
pub use exchange::{AsBinderRef, BinderId, BinderRef, Exchange};
pub use format::{FnFormatter, FormatError, Formatter, FormatterExt, Identity, PopOnly, PushOnly, ValueCast};
pub use report::BinderReport;
