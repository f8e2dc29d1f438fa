use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::value::Handle;

/// Identifies one registered notification callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        ListenerId(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// "The underlying value might have changed."
pub type NotifyCallback = Arc<dyn Fn() + Send + Sync>;

/// Something a selector chain can ask to be told about changes.
///
/// Text watchers, focus loss and timers live outside this crate; they only
/// need to implement this trait (or hold a [`Notifier`]).
pub trait NotificationSource: Send + Sync {
    fn listen(&self, callback: NotifyCallback) -> ListenerId;

    /// Returns `false` when `id` was not registered.
    fn unlisten(&self, id: ListenerId) -> bool;
}

#[derive(Default)]
struct NotifierInner {
    next: AtomicU64,
    callbacks: Mutex<Vec<(ListenerId, NotifyCallback)>>,
}

/// Ready-made [`NotificationSource`].
///
/// Clones share the same listener list, so a notifier can be cloned out of
/// its owner and fired after the owner's lock is released.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call every listener, in registration order. Returns how many ran.
    pub fn notify(&self) -> usize {
        let callbacks: Vec<NotifyCallback> = self
            .inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl NotificationSource for Notifier {
    fn listen(&self, callback: NotifyCallback) -> ListenerId {
        let id = ListenerId(self.inner.next.fetch_add(1, Ordering::Relaxed));
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, callback));
        id
    }

    fn unlisten(&self, id: ListenerId) -> bool {
        let mut callbacks = self
            .inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(registered, _)| *registered != id);
        callbacks.len() != before
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Listener registration on a leaf instance; unlistens when dropped.
#[must_use = "dropping a Subscription unlistens immediately"]
pub struct Subscription {
    instance: Handle,
    id: ListenerId,
    active: bool,
}

impl Subscription {
    pub(crate) fn new(instance: Handle, id: ListenerId) -> Self {
        Subscription {
            instance,
            id,
            active: true,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn instance(&self) -> &Handle {
        &self.instance
    }

    /// Unlisten now instead of on drop.
    pub fn cancel(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        if self.active {
            self.active = false;
            self.instance.unlisten(self.id)
        } else {
            false
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("instance", &self.instance)
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
