//! Two-way data binding between "view-side" and "model-side" objects.
//!
//! ```text
//! trigger ─▶ BindingManager::push/pop ─▶ (frozen? queue : run) ─▶ Binder::push/pop
//!         ─▶ Selector::get/set ─▶ Property::get/set ─▶ AccessorResolver ─▶ receiver
//! ```
//!
//! Receivers are plain Rust structs that implement [`Bindable`], usually via
//! `#[derive(Bindable)]`. Accessors are found by name (with `get_`/`set_`
//! style fallbacks and overload matching) and cached per type.

extern crate self as bound_rust;

pub mod accessor;
pub mod binder;
pub mod dispatch;
mod error;
pub mod manager;
pub mod property;
pub mod selector;
pub mod value;

pub use accessor::{
    argument, AccessorEntry, AccessorResolver, Bindable, Lookup, MemberKind, Members, NotFound,
    Role, TypeRegistry,
};
pub use binder::{
    AsBinderRef, Binder, BinderId, BinderRef, BinderReport, Direction, Exchange, FnFormatter,
    FormatError, Formatter, FormatterExt, Identity, PopOnly, PushOnly, ValueCast,
};
pub use dispatch::{ui_channel, ChannelDispatcher, UiDispatcher, UiQueue, UiStats, UiTask, UiThread};
pub use error::{AccessError, BindingError, ConfigurationError, InvokeError, OneWayBindingError};
pub use manager::{
    BindingConfig, BindingLifecycle, BindingManager, Dispatch, ExchangeRecord, ListenerKey,
    ReplaySummary,
};
pub use property::Property;
pub use selector::{
    InstanceProvider, ListenerId, NotificationSource, Notifier, NotifyCallback, Selector,
    Subscription, Target,
};
pub use value::{BindValue, Handle, Value, ValueConvert, ValueType};

/// `#[derive(Bindable)]` for structs with named fields.
pub use bound_rust_macros::Bindable;
