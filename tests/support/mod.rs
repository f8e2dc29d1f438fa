//! Fixture receivers shared by the integration tests.
//!
//! `widgets` plays the toolkit side (text fields, radio groups), `models`
//! the domain side.

#![allow(dead_code)]

pub mod models;
pub mod widgets;

pub use models::{rename, Address, Person, Roster, Settings};
pub use widgets::{type_text, Form, RadioGroup, TextView, Widget};

use bound_rust::Handle;

/// Read `text` off a `TextView` handle.
pub fn text_of(view: &Handle) -> String {
    view.read(|v: &TextView| v.text.clone()).unwrap_or_default()
}

pub fn name_of(person: &Handle) -> String {
    person.read(|p: &Person| p.name.clone()).unwrap_or_default()
}

pub fn age_of(person: &Handle) -> i64 {
    person.read(|p: &Person| p.age).unwrap_or_default()
}
