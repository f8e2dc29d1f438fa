use std::sync::{Arc, Weak};

use crate::binder::BinderRef;
use crate::error::ConfigurationError;

/// Observer of a manager's binding scope.
///
/// The manager keeps listeners weakly; registration never extends a
/// listener's lifetime.
pub trait BindingLifecycle: Send + Sync {
    /// A binder was created by `bind`.
    fn on_bound(&self, _binder: &BinderRef) {}

    /// `associate` finished validating every binder.
    fn on_associated(&self, _result: &Result<(), ConfigurationError>) {}

    /// A binder was removed by `detach` or `teardown`.
    fn on_detached(&self, _binder: &BinderRef) {}
}

/// Generational handle to a registered listener.
///
/// A key whose slot has been reused by a later registration no longer
/// matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    listener: Option<Weak<dyn BindingLifecycle>>,
}

#[derive(Default)]
pub(crate) struct ListenerArena {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
}

impl ListenerArena {
    pub(crate) fn insert(&mut self, listener: Weak<dyn BindingLifecycle>) -> ListenerKey {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.saturating_add(1);
            slot.listener = Some(listener);
            ListenerKey {
                index: index as u32,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 1,
                listener: Some(listener),
            });
            ListenerKey {
                index: (self.slots.len() - 1) as u32,
                generation: 1,
            }
        }
    }

    pub(crate) fn remove(&mut self, key: ListenerKey) -> bool {
        let index = key.index as usize;
        match self.slots.get_mut(index) {
            Some(slot) if slot.generation == key.generation && slot.listener.is_some() => {
                slot.listener = None;
                self.free_list.push(index);
                true
            }
            _ => false,
        }
    }

    /// Upgrade every live listener, freeing slots whose owner is gone.
    pub(crate) fn live(&mut self) -> Vec<Arc<dyn BindingLifecycle>> {
        let mut live = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(weak) = &slot.listener else {
                continue;
            };
            match weak.upgrade() {
                Some(listener) => live.push(listener),
                None => {
                    slot.listener = None;
                    self.free_list.push(index);
                }
            }
        }
        live
    }

    pub(crate) fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.listener.is_some())
            .count()
    }
}
