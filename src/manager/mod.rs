//! The binding scope: binder ownership, freeze/replay, queries and lifecycle fan-out.

mod config;
mod events;
mod listeners;
mod manager;

pub use config::BindingConfig;
pub use events::ExchangeRecord;
pub use listeners::{BindingLifecycle, ListenerKey};
pub use manager::{BindingManager, Dispatch, ReplaySummary};
