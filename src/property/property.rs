use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};

use tracing::trace;

use crate::accessor::{AccessorEntry, AccessorResolver, Lookup, Role};
use crate::error::AccessError;
use crate::value::{BindValue, Handle, Value, ValueType};

/// How one side of a property finds its accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AccessorName {
    /// Search by the property's pattern and the naming convention.
    Convention,
    Explicit(String),
    /// Declared as not existing (an explicit empty name).
    Absent,
}

impl AccessorName {
    fn from_explicit(name: &str) -> Self {
        if name.is_empty() {
            AccessorName::Absent
        } else {
            AccessorName::Explicit(name.to_string())
        }
    }
}

/// Accessor confirmed for one receiver type and argument list.
struct Slot {
    type_id: TypeId,
    generation: u64,
    args: Vec<ValueType>,
    entry: AccessorEntry,
}

/// A named, typed accessor descriptor.
///
/// Resolution happens lazily on the first get/set against a receiver and is
/// cached in this instance for that receiver type. Missing accessors degrade:
/// `get` yields `T::default()` and `set` yields `false`. Use
/// [`resolve_getter`](Self::resolve_getter) / [`resolve_setter`](Self::resolve_setter)
/// (or `Binder::resolve`) to surface the reason instead.
pub struct Property<T> {
    pattern: Option<String>,
    getter: AccessorName,
    setter: AccessorName,
    getter_args: Vec<Value>,
    setter_args: Vec<Value>,
    getter_slot: Mutex<Option<Slot>>,
    setter_slot: Mutex<Option<Slot>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: BindValue> Property<T> {
    /// Search both accessors by naming convention: `named("Text")` finds
    /// `get_text`/`set_text`, a `text` field, or `text` methods.
    pub fn named(pattern: impl Into<String>) -> Self {
        Self::build(
            Some(pattern.into()),
            AccessorName::Convention,
            AccessorName::Convention,
        )
    }

    /// Exact accessor names. An empty string declares that side absent.
    pub fn explicit(getter: &str, setter: &str) -> Self {
        Self::build(
            None,
            AccessorName::from_explicit(getter),
            AccessorName::from_explicit(setter),
        )
    }

    /// Map emulation: reads `getter(key)` and writes `setter(key, value)`.
    pub fn keyed(getter: &str, setter: &str, key: impl Into<String>) -> Self {
        let key = Value::Text(key.into());
        Self::explicit(getter, setter)
            .with_getter_args(vec![key.clone()])
            .with_setter_args(vec![key])
    }

    /// List emulation: reads `getter(index)` and writes `setter(index, value)`.
    pub fn indexed(getter: &str, setter: &str, index: i64) -> Self {
        Self::explicit(getter, setter)
            .with_getter_args(vec![Value::Int(index)])
            .with_setter_args(vec![Value::Int(index)])
    }

    /// Fixed arguments passed to the getter.
    pub fn with_getter_args(mut self, args: Vec<Value>) -> Self {
        self.getter_args = args;
        self
    }

    /// Fixed arguments passed to the setter ahead of the value.
    pub fn with_setter_args(mut self, args: Vec<Value>) -> Self {
        self.setter_args = args;
        self
    }

    /// Drop the setter side.
    pub fn read_only(mut self) -> Self {
        self.setter = AccessorName::Absent;
        self
    }

    fn build(pattern: Option<String>, getter: AccessorName, setter: AccessorName) -> Self {
        Property {
            pattern,
            getter,
            setter,
            getter_args: Vec::new(),
            setter_args: Vec::new(),
            getter_slot: Mutex::new(None),
            setter_slot: Mutex::new(None),
            _marker: PhantomData,
        }
    }

    pub fn has_getter(&self) -> bool {
        self.getter != AccessorName::Absent
    }

    pub fn has_setter(&self) -> bool {
        self.setter != AccessorName::Absent
    }

    /// Read the value, or `T::default()` if that is not possible.
    pub fn get(&self, instance: &Handle) -> T {
        match self.try_get(instance) {
            Ok(value) => value,
            Err(err) => {
                trace!(property = %self, error = %err, "get degraded to default");
                T::default()
            }
        }
    }

    /// Write the value; `false` if that is not possible.
    pub fn set(&self, instance: &Handle, value: T) -> bool {
        match self.try_set(instance, value) {
            Ok(()) => true,
            Err(err) => {
                trace!(property = %self, error = %err, "set failed");
                false
            }
        }
    }

    pub fn try_get(&self, instance: &Handle) -> Result<T, AccessError> {
        let entry = self.getter_for(instance)?;
        let raw = instance
            .invoke(&entry, &self.getter_args)
            .map_err(|source| AccessError::Invoke {
                role: Role::Getter,
                name: entry.name().to_string(),
                source,
            })?;
        let found = raw.value_type();
        T::from_value(raw).ok_or_else(|| AccessError::Conversion {
            name: entry.name().to_string(),
            expected: T::value_type(),
            found,
        })
    }

    pub fn try_set(&self, instance: &Handle, value: T) -> Result<(), AccessError> {
        let value = value.into_value();
        // A dynamic `Value` is matched by what it holds, not by `Any`.
        let declared = match T::value_type() {
            ValueType::Any => value.value_type(),
            declared => declared,
        };
        let entry = self.setter_for(instance, declared)?;
        let mut args = self.setter_args.clone();
        args.push(value);
        instance
            .invoke(&entry, &args)
            .map(|_| ())
            .map_err(|source| AccessError::Invoke {
                role: Role::Setter,
                name: entry.name().to_string(),
                source,
            })
    }

    /// Force getter discovery against `instance` without reading.
    pub fn resolve_getter(&self, instance: &Handle) -> Result<AccessorEntry, AccessError> {
        self.getter_for(instance)
    }

    /// Force setter discovery against `instance` without writing.
    pub fn resolve_setter(&self, instance: &Handle) -> Result<AccessorEntry, AccessError> {
        self.setter_for(instance, T::value_type())
    }

    fn getter_for(&self, instance: &Handle) -> Result<AccessorEntry, AccessError> {
        let arg_types: Vec<ValueType> = self.getter_args.iter().map(Value::value_type).collect();
        self.cached(Role::Getter, &self.getter, &self.getter_slot, instance, &arg_types)
    }

    fn setter_for(
        &self,
        instance: &Handle,
        value_type: ValueType,
    ) -> Result<AccessorEntry, AccessError> {
        let mut arg_types: Vec<ValueType> =
            self.setter_args.iter().map(Value::value_type).collect();
        arg_types.push(value_type);
        self.cached(Role::Setter, &self.setter, &self.setter_slot, instance, &arg_types)
    }

    fn cached(
        &self,
        role: Role,
        name: &AccessorName,
        slot: &Mutex<Option<Slot>>,
        instance: &Handle,
        arg_types: &[ValueType],
    ) -> Result<AccessorEntry, AccessError> {
        let explicit = match name {
            AccessorName::Absent => return Err(AccessError::Absent(role)),
            AccessorName::Explicit(name) => Some(name.as_str()),
            AccessorName::Convention => None,
        };

        let resolver = AccessorResolver::global();
        let generation = resolver.generation();
        let type_id = instance.type_key();
        {
            let slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = slot.as_ref() {
                if hit.type_id == type_id
                    && hit.generation == generation
                    && hit.args == arg_types
                {
                    return Ok(hit.entry.clone());
                }
            }
        }

        let lookup = Lookup {
            role,
            explicit,
            pattern: self.pattern.as_deref(),
            args: arg_types,
        };
        let entry = resolver.resolve(instance, &lookup)?;
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Slot {
            type_id,
            generation,
            args: arg_types.to_vec(),
            entry: entry.clone(),
        });
        Ok(entry)
    }

    fn describe_side(&self, name: &AccessorName, slot: &Mutex<Option<Slot>>) -> String {
        if let Some(hit) = slot.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return hit.entry.name().to_string();
        }
        match name {
            AccessorName::Absent => "none".to_string(),
            AccessorName::Explicit(name) => format!("{}?", name),
            AccessorName::Convention => "?".to_string(),
        }
    }
}

impl<T: BindValue> Clone for Property<T> {
    /// The clone resolves on its own; caches are not shared.
    fn clone(&self) -> Self {
        Property {
            pattern: self.pattern.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
            getter_args: self.getter_args.clone(),
            setter_args: self.setter_args.clone(),
            getter_slot: Mutex::new(None),
            setter_slot: Mutex::new(None),
            _marker: PhantomData,
        }
    }
}

/// `Property<text>(name) [get: get_text, set: ?]`
///
/// Resolved sides show the matched member name, explicit but unresolved
/// sides end in `?`, convention sides not yet searched show `?`.
impl<T: BindValue> fmt::Display for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property<{}>", T::value_type())?;
        if let Some(pattern) = &self.pattern {
            write!(f, "({})", pattern)?;
        }
        write!(
            f,
            " [get: {}, set: {}]",
            self.describe_side(&self.getter, &self.getter_slot),
            self.describe_side(&self.setter, &self.setter_slot)
        )
    }
}

impl<T: BindValue> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("pattern", &self.pattern)
            .field("getter", &self.getter)
            .field("setter", &self.setter)
            .field("getter_args", &self.getter_args)
            .field("setter_args", &self.setter_args)
            .finish()
    }
}
