//! Accessor discovery.
//!
//! A receiver type describes its members once through [`Bindable::members`];
//! the [`AccessorResolver`] turns that description into a sorted
//! [`TypeRegistry`] cached per type, and resolves symbolic names to concrete
//! [`AccessorEntry`] values:
//!
//! ```text
//! Bindable::members ──▶ TypeRegistry (sorted by name, arity) ──▶ resolve(Lookup)
//!                              ▲ cached per TypeId                 │
//!                              └───────────────────────────────────┘
//! ```
//!
//! Field-style and method-style members share one entry type, so nothing
//! above this module cares which kind backs a property.

mod entry;
mod members;
mod naming;
mod resolver;

pub use entry::{AccessorEntry, MemberKind};
pub(crate) use entry::Invoker;
pub use members::{argument, Bindable, Members};
pub use naming::to_snake_case;
pub use resolver::{AccessorResolver, Lookup, NotFound, Role, TypeRegistry};
