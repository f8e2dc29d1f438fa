use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::accessor::{AccessorEntry, Bindable, Invoker, Members};
use crate::error::InvokeError;
use crate::selector::{ListenerId, NotifyCallback};

use super::Value;

/// Type-erased view of an `RwLock<T: Bindable>`.
pub(crate) trait ErasedCell: Send + Sync {
    fn type_key(&self) -> TypeId;
    fn type_name(&self) -> &'static str;
    /// Member table of the concrete type, built from `Bindable::members`.
    fn describe(&self) -> Vec<AccessorEntry>;
    fn with_read(&self, f: &mut dyn FnMut(&dyn Any)) -> Result<(), InvokeError>;
    fn with_write(&self, f: &mut dyn FnMut(&mut dyn Any)) -> Result<(), InvokeError>;
    fn listen(&self, callback: NotifyCallback) -> Result<Option<ListenerId>, InvokeError>;
    fn unlisten(&self, id: ListenerId) -> Result<bool, InvokeError>;
}

impl<T: Bindable> ErasedCell for RwLock<T> {
    fn type_key(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn describe(&self) -> Vec<AccessorEntry> {
        T::members(Members::new()).into_entries()
    }

    fn with_read(&self, f: &mut dyn FnMut(&dyn Any)) -> Result<(), InvokeError> {
        let guard = self
            .read()
            .map_err(|_| InvokeError::LockPoisoned("read"))?;
        f(&*guard);
        Ok(())
    }

    fn with_write(&self, f: &mut dyn FnMut(&mut dyn Any)) -> Result<(), InvokeError> {
        let mut guard = self
            .write()
            .map_err(|_| InvokeError::LockPoisoned("write"))?;
        f(&mut *guard);
        Ok(())
    }

    fn listen(&self, callback: NotifyCallback) -> Result<Option<ListenerId>, InvokeError> {
        let guard = self
            .read()
            .map_err(|_| InvokeError::LockPoisoned("listen"))?;
        Ok(guard
            .notification_source()
            .map(|source| source.listen(callback)))
    }

    fn unlisten(&self, id: ListenerId) -> Result<bool, InvokeError> {
        let guard = self
            .read()
            .map_err(|_| InvokeError::LockPoisoned("unlisten"))?;
        Ok(guard
            .notification_source()
            .map(|source| source.unlisten(id))
            .unwrap_or(false))
    }
}

/// Shared, thread-safe reference to a bindable receiver.
///
/// Cloning is cheap. Two handles are equal when they point at the same
/// object, which is what `getBindingsByModel`-style queries compare.
///
/// ```
/// use bound_rust::{Bindable, Handle};
///
/// #[derive(Default, Bindable)]
/// struct Label {
///     text: String,
/// }
///
/// let label = Handle::new(Label::default());
/// label.write(|l: &mut Label| l.text = "hi".into());
/// assert_eq!(label.read(|l: &Label| l.text.clone()), Some("hi".to_string()));
/// ```
#[derive(Clone)]
pub struct Handle {
    cell: Arc<dyn ErasedCell>,
}

impl Handle {
    pub fn new<T: Bindable>(value: T) -> Self {
        Handle {
            cell: Arc::new(RwLock::new(value)),
        }
    }

    /// Wrap an existing shared object; the caller keeps direct access through `shared`.
    pub fn from_shared<T: Bindable>(shared: Arc<RwLock<T>>) -> Self {
        Handle { cell: shared }
    }

    pub fn type_name(&self) -> &'static str {
        self.cell.type_name()
    }

    pub fn type_key(&self) -> TypeId {
        self.cell.type_key()
    }

    pub fn is<T: Bindable>(&self) -> bool {
        self.cell.type_key() == TypeId::of::<T>()
    }

    pub fn ptr_eq(&self, other: &Handle) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.cell) as *const u8,
            Arc::as_ptr(&other.cell) as *const u8,
        )
    }

    /// Run `f` against the receiver if it is a `T`.
    ///
    /// Returns `None` on type mismatch or a poisoned lock.
    pub fn read<T: Bindable, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        self.cell
            .with_read(&mut |any| {
                if let (Some(target), Some(f)) = (any.downcast_ref::<T>(), f.take()) {
                    out = Some(f(target));
                }
            })
            .ok()?;
        out
    }

    /// Mutable counterpart of [`Handle::read`].
    pub fn write<T: Bindable, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        self.cell
            .with_write(&mut |any| {
                if let (Some(target), Some(f)) = (any.downcast_mut::<T>(), f.take()) {
                    out = Some(f(target));
                }
            })
            .ok()?;
        out
    }

    pub(crate) fn cell(&self) -> &dyn ErasedCell {
        self.cell.as_ref()
    }

    /// Invoke `entry` with `args`, taking a read or write lock as the entry requires.
    pub(crate) fn invoke(&self, entry: &AccessorEntry, args: &[Value]) -> Result<Value, InvokeError> {
        let mut out = None;
        match entry.invoker() {
            Invoker::Read(f) => self.cell.with_read(&mut |any| out = Some(f(any, args)))?,
            Invoker::Write(f) => self.cell.with_write(&mut |any| out = Some(f(any, args)))?,
        }
        out.unwrap_or_else(|| Err(InvokeError::Failed("receiver was not visited".into())))
    }

    pub(crate) fn listen(&self, callback: NotifyCallback) -> Option<ListenerId> {
        self.cell.listen(callback).ok().flatten()
    }

    pub(crate) fn unlisten(&self, id: ListenerId) -> bool {
        self.cell.unlisten(id).unwrap_or(false)
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Handle<{}>@{:p}",
            self.type_name(),
            Arc::as_ptr(&self.cell) as *const u8
        )
    }
}

impl<T: Bindable> From<Arc<RwLock<T>>> for Handle {
    fn from(shared: Arc<RwLock<T>>) -> Self {
        Handle::from_shared(shared)
    }
}
