mod notify;
mod selector;

pub use notify::{ListenerId, NotificationSource, Notifier, NotifyCallback, Subscription};
pub use selector::{InstanceProvider, Selector, Target};
