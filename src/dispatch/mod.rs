//! Running work on the single UI-confined execution context.
//!
//! The manager only needs a [`UiDispatcher`]. [`ui_channel`] gives a
//! channel-backed one whose [`UiQueue`] is drained by whichever thread owns
//! the UI, either by hand or through a [`UiThread`].

mod dispatcher;
mod thread;

pub use dispatcher::{ui_channel, ChannelDispatcher, UiDispatcher, UiQueue, UiTask};
pub use thread::{UiStats, UiThread};
