use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::InvokeError;
use crate::selector::NotificationSource;
use crate::value::{Value, ValueConvert, ValueType};

use super::entry::{AccessorEntry, Invoker, MemberKind};

/// A receiver type that can take part in a binding.
///
/// Usually derived:
///
/// ```
/// use bound_rust::{Bindable, Handle, Property};
///
/// #[derive(Default, Bindable)]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// let person = Handle::new(Person::default());
/// let age = Property::<i64>::named("Age");
/// assert!(age.set(&person, 41));
/// assert_eq!(age.get(&person), 41);
/// ```
pub trait Bindable: Any + Send + Sync {
    /// Describe the readable and writable members of this type.
    ///
    /// Called once per type; the result is cached for the process lifetime.
    fn members(members: Members<Self>) -> Members<Self>
    where
        Self: Sized;

    /// The change-notification source of this object, if it has one.
    fn notification_source(&self) -> Option<&dyn NotificationSource> {
        None
    }
}

/// Builder for the member table of a `T`.
pub struct Members<T> {
    entries: Vec<AccessorEntry>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Bindable> Default for Members<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Bindable> Members<T> {
    pub fn new() -> Self {
        Members {
            entries: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// A plain field: one zero-argument read entry and one single-argument write entry.
    pub fn field<V>(mut self, name: &str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self
    where
        V: ValueConvert + Clone + Send + Sync + 'static,
    {
        let read: Invoker = Invoker::Read(Arc::new(move |any: &dyn Any, args: &[Value]| {
            expect_arity(args, 0)?;
            Ok(get(receiver::<T>(any)?).clone().into_value())
        }));
        let write: Invoker = Invoker::Write(Arc::new(move |any: &mut dyn Any, args: &[Value]| {
            expect_arity(args, 1)?;
            let value = argument::<V>(args, 0)?;
            *get_mut(receiver_mut::<T>(any)?) = value;
            Ok(Value::Null)
        }));
        self.entries.push(AccessorEntry::new(
            name,
            MemberKind::Field,
            Vec::new(),
            Some(V::value_type()),
            read,
        ));
        self.entries.push(AccessorEntry::new(
            name,
            MemberKind::Field,
            vec![V::value_type()],
            None,
            write,
        ));
        self
    }

    /// A zero-argument method producing a value.
    pub fn getter<V, F>(mut self, name: &str, f: F) -> Self
    where
        V: ValueConvert + 'static,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let read = Invoker::Read(Arc::new(move |any: &dyn Any, args: &[Value]| {
            expect_arity(args, 0)?;
            Ok(f(receiver::<T>(any)?).into_value())
        }));
        self.entries.push(AccessorEntry::new(
            name,
            MemberKind::Method,
            Vec::new(),
            Some(V::value_type()),
            read,
        ));
        self
    }

    /// A single-argument method consuming a value.
    pub fn setter<V, F>(mut self, name: &str, f: F) -> Self
    where
        V: ValueConvert + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let write = Invoker::Write(Arc::new(move |any: &mut dyn Any, args: &[Value]| {
            expect_arity(args, 1)?;
            let value = argument::<V>(args, 0)?;
            f(receiver_mut::<T>(any)?, value);
            Ok(Value::Null)
        }));
        self.entries.push(AccessorEntry::new(
            name,
            MemberKind::Method,
            vec![V::value_type()],
            None,
            write,
        ));
        self
    }

    /// A read-only method of any arity, e.g. `get(key)` for map emulation.
    pub fn query<F>(mut self, name: &str, params: &[ValueType], returns: ValueType, f: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        let arity = params.len();
        let read = Invoker::Read(Arc::new(move |any: &dyn Any, args: &[Value]| {
            expect_arity(args, arity)?;
            f(receiver::<T>(any)?, args)
        }));
        self.entries.push(AccessorEntry::new(
            name,
            MemberKind::Method,
            params.to_vec(),
            Some(returns),
            read,
        ));
        self
    }

    /// A mutating method of any arity, e.g. `set_text(text, buffer_type)`.
    pub fn method<F>(mut self, name: &str, params: &[ValueType], f: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        let arity = params.len();
        let write = Invoker::Write(Arc::new(move |any: &mut dyn Any, args: &[Value]| {
            expect_arity(args, arity)?;
            f(receiver_mut::<T>(any)?, args)?;
            Ok(Value::Null)
        }));
        self.entries.push(AccessorEntry::new(
            name,
            MemberKind::Method,
            params.to_vec(),
            None,
            write,
        ));
        self
    }

    /// Take over every member of an embedded base object.
    pub fn inherit<B: Bindable>(mut self, get: fn(&T) -> &B, get_mut: fn(&mut T) -> &mut B) -> Self {
        for entry in B::members(Members::new()).into_entries() {
            let lifted = match entry.invoker().clone() {
                Invoker::Read(inner) => Invoker::Read(Arc::new(move |any: &dyn Any, args: &[Value]| {
                    let base: &dyn Any = get(receiver::<T>(any)?);
                    inner(base, args)
                })),
                Invoker::Write(inner) => {
                    Invoker::Write(Arc::new(move |any: &mut dyn Any, args: &[Value]| {
                        let base: &mut dyn Any = get_mut(receiver_mut::<T>(any)?);
                        inner(base, args)
                    }))
                }
            };
            self.entries.push(entry.with_invoker(lifted));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<AccessorEntry> {
        self.entries
    }
}

/// Convert positional argument `index` for use inside `query`/`method` bodies.
pub fn argument<V: ValueConvert>(args: &[Value], index: usize) -> Result<V, InvokeError> {
    let value = args.get(index).cloned().ok_or(InvokeError::Arity {
        expected: index + 1,
        actual: args.len(),
    })?;
    V::from_value(value).ok_or(InvokeError::ArgumentMismatch {
        index,
        expected: V::value_type(),
    })
}

fn expect_arity(args: &[Value], expected: usize) -> Result<(), InvokeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(InvokeError::Arity {
            expected,
            actual: args.len(),
        })
    }
}

fn receiver<T: Any>(any: &dyn Any) -> Result<&T, InvokeError> {
    any.downcast_ref::<T>().ok_or(InvokeError::ReceiverMismatch {
        expected: std::any::type_name::<T>(),
    })
}

fn receiver_mut<T: Any>(any: &mut dyn Any) -> Result<&mut T, InvokeError> {
    any.downcast_mut::<T>().ok_or(InvokeError::ReceiverMismatch {
        expected: std::any::type_name::<T>(),
    })
}
