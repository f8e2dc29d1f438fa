use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigurationError, OneWayBindingError};
use crate::selector::{NotifyCallback, Subscription};
use crate::value::{BindValue, Handle, Value};

use super::binder::Binder;
use super::direction::Direction;
use super::report::BinderReport;

/// Manager-assigned identity of a binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinderId(u64);

impl BinderId {
    pub fn new(raw: u64) -> Self {
        BinderId(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BinderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type-erased binder, as the manager stores and replays it.
pub trait Exchange: Send + Sync {
    fn id(&self) -> BinderId;
    fn push(&self) -> Result<(), OneWayBindingError>;
    fn pop(&self) -> Result<(), OneWayBindingError>;

    fn exchange(&self, direction: Direction) -> Result<(), OneWayBindingError> {
        match direction {
            Direction::Push => self.push(),
            Direction::Pop => self.pop(),
        }
    }

    fn resolve(&self) -> Result<(), ConfigurationError>;
    fn is_push_ok(&self) -> bool;
    fn is_pop_ok(&self) -> bool;
    fn is_ui_confined(&self) -> bool;

    /// Current receiver of the view selector.
    fn view_instance(&self) -> Option<Handle>;
    /// Current receiver of the model selector.
    fn model_instance(&self) -> Option<Handle>;

    fn has_tag(&self, key: i32) -> bool;
    fn tag(&self, key: i32) -> Option<Value>;

    /// Listen on the side a `direction` exchange reads from.
    fn listen(&self, direction: Direction, callback: NotifyCallback) -> Option<Subscription>;

    fn report(&self) -> BinderReport;
}

pub type BinderRef = Arc<dyn Exchange>;

/// Anything the manager can address as a binder.
pub trait AsBinderRef {
    fn binder_ref(&self) -> BinderRef;
}

impl<V: BindValue, M: BindValue> AsBinderRef for Arc<Binder<V, M>> {
    fn binder_ref(&self) -> BinderRef {
        Arc::clone(self) as BinderRef
    }
}

impl AsBinderRef for BinderRef {
    fn binder_ref(&self) -> BinderRef {
        Arc::clone(self)
    }
}
