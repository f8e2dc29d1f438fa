//! BindingManager integration tests.
//!
//! Covers the binding scope as a whole: freeze/replay, cross-thread
//! requests, UI-confined dispatch, lifecycle listeners and queries.

#[path = "../support/mod.rs"]
mod support;

mod freeze;
mod listeners;
mod queries;
mod threaded;
#[cfg(feature = "emitter")]
mod events;

use bound_rust::{Binder, BindingManager, Handle, Property, Selector};
use std::sync::Arc;

use support::{Person, TextView};

/// A text field bound to a person's name, with fresh receivers.
pub fn name_binding(manager: &BindingManager) -> (Arc<Binder<String, String>>, Handle, Handle) {
    let view = Handle::new(TextView::default());
    let person = Handle::new(Person::new("Ada", 36));
    let binder = manager.bind_with(
        Selector::new(view.clone(), Property::named("Text")),
        Selector::new(person.clone(), Property::named("Name")),
    );
    (binder, view, person)
}
