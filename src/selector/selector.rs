use std::fmt;
use std::sync::Arc;

use crate::error::AccessError;
use crate::property::Property;
use crate::value::{BindValue, Handle};

use super::notify::{NotifyCallback, Subscription};

/// Supplies the root receiver of a binding scope, e.g. the current list row.
pub trait InstanceProvider: Send + Sync {
    fn instance(&self) -> Option<Handle>;
}

impl<F> InstanceProvider for F
where
    F: Fn() -> Option<Handle> + Send + Sync,
{
    fn instance(&self) -> Option<Handle> {
        self()
    }
}

/// Where a selector finds its receiver.
#[derive(Clone)]
pub enum Target {
    Direct(Handle),
    /// The value another selector reads is the receiver.
    Chained(Arc<Selector<Option<Handle>>>),
    Provided(Arc<dyn InstanceProvider>),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Direct(handle) => f.debug_tuple("Direct").field(handle).finish(),
            Target::Chained(inner) => write!(f, "Chained({})", inner),
            Target::Provided(_) => f.write_str("Provided"),
        }
    }
}

/// A property paired with the receiver it applies to.
///
/// The receiver is computed on every call, walking chained selectors from
/// the leaf up, so a chain always reflects the current state of its parents.
pub struct Selector<V> {
    target: Target,
    property: Arc<Property<V>>,
}

impl<V: BindValue> Selector<V> {
    pub fn new(instance: Handle, property: Property<V>) -> Self {
        Selector {
            target: Target::Direct(instance),
            property: Arc::new(property),
        }
    }

    /// Use the object read through `parent` as the receiver.
    pub fn chained(parent: Selector<Option<Handle>>, property: Property<V>) -> Self {
        Selector {
            target: Target::Chained(Arc::new(parent)),
            property: Arc::new(property),
        }
    }

    pub fn provided(provider: impl InstanceProvider + 'static, property: Property<V>) -> Self {
        Selector {
            target: Target::Provided(Arc::new(provider)),
            property: Arc::new(property),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn property(&self) -> &Property<V> {
        &self.property
    }

    /// The receiver right now; `None` when a link in the chain is empty.
    pub fn runtime_instance(&self) -> Option<Handle> {
        match &self.target {
            Target::Direct(handle) => Some(handle.clone()),
            Target::Chained(parent) => parent.get(),
            Target::Provided(provider) => provider.instance(),
        }
    }

    pub fn get(&self) -> V {
        match self.runtime_instance() {
            Some(instance) => self.property.get(&instance),
            None => V::default(),
        }
    }

    pub fn set(&self, value: V) -> bool {
        match self.runtime_instance() {
            Some(instance) => self.property.set(&instance, value),
            None => false,
        }
    }

    pub fn try_get(&self) -> Result<V, AccessError> {
        let instance = self.runtime_instance().ok_or(AccessError::NoInstance)?;
        self.property.try_get(&instance)
    }

    pub fn try_set(&self, value: V) -> Result<(), AccessError> {
        let instance = self.runtime_instance().ok_or(AccessError::NoInstance)?;
        self.property.try_set(&instance, value)
    }

    /// Resolve both accessors against the current receiver; one message per problem.
    ///
    /// Sides the property declares absent are not checked.
    pub fn check(&self) -> Vec<String> {
        let Some(instance) = self.runtime_instance() else {
            return vec![AccessError::NoInstance.to_string()];
        };
        let mut reasons = Vec::new();
        if self.property.has_getter() {
            if let Err(err) = self.property.resolve_getter(&instance) {
                reasons.push(err.to_string());
            }
        }
        if self.property.has_setter() {
            if let Err(err) = self.property.resolve_setter(&instance) {
                reasons.push(err.to_string());
            }
        }
        reasons
    }

    /// Forward a change listener to the current leaf receiver.
    ///
    /// `None` when there is no receiver or it exposes no notification source.
    pub fn listen(&self, callback: NotifyCallback) -> Option<Subscription> {
        let instance = self.runtime_instance()?;
        let id = instance.listen(callback)?;
        Some(Subscription::new(instance, id))
    }
}

impl Selector<Option<Handle>> {
    /// Extend the chain by one link: `row.then(Property::named("Address"))`.
    pub fn then<V: BindValue>(self, property: Property<V>) -> Selector<V> {
        Selector::chained(self, property)
    }
}

impl<V> Clone for Selector<V> {
    fn clone(&self) -> Self {
        Selector {
            target: self.target.clone(),
            property: Arc::clone(&self.property),
        }
    }
}

impl<V: BindValue> fmt::Display for Selector<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Direct(handle) => write!(f, "{}.", short_name(handle.type_name()))?,
            Target::Chained(parent) => write!(f, "{} -> ", parent)?,
            Target::Provided(_) => f.write_str("<provided>.")?,
        }
        write!(f, "{}", self.property)
    }
}

impl<V: BindValue> fmt::Debug for Selector<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("target", &self.target)
            .field("property", &self.property)
            .finish()
    }
}

fn short_name(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}
